use axum::response::Html;

pub(super) fn home() -> Html<&'static str> {
    Html(
        r#"<h1>Home Page</h1>
<p><a href="/auth/facebook">Login with Facebook</a></p>
<p><a href="/post">Create a Post on Facebook and Twitter</a></p>
<p><a href="/auth/youtube">Authenticate with YouTube</a></p>
<p><a href="/upload">Upload a Video to YouTube</a></p>
"#,
    )
}

pub(super) fn profile(display_name: &str) -> Html<String> {
    Html(format!(
        r#"<h1>Hello, {}</h1>
<p><a href="/post">Create a Post on Facebook and Twitter</a></p>
<p><a href="/logout">Logout</a></p>
"#,
        html_escape::encode_text(display_name)
    ))
}

pub(super) fn post_form() -> Html<&'static str> {
    Html(
        r#"<h1>Create a Post on Facebook and Twitter</h1>
<form action="/post" method="post">
  <textarea name="content" rows="4" cols="50" placeholder="What's on your mind?"></textarea><br>
  <input type="submit" value="Post to Facebook and Twitter">
</form>
"#,
    )
}

pub(super) fn upload_form() -> Html<&'static str> {
    Html(
        r#"<h1>Upload a Video to YouTube</h1>
<form action="/upload/youtube" method="post" enctype="multipart/form-data">
  <input type="file" name="video" accept="video/*"><br>
  <input type="text" name="title" placeholder="Title" required><br>
  <textarea name="description" rows="3" cols="50" placeholder="Description"></textarea><br>
  <input type="number" name="categoryId" value="22" min="1"><br>
  <select name="privacyStatus">
    <option value="private" selected>Private</option>
    <option value="unlisted">Unlisted</option>
    <option value="public">Public</option>
  </select><br>
  <input type="text" name="language" placeholder="Language (e.g. en)"><br>
  <input type="submit" value="Upload to YouTube">
</form>
"#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_escapes_display_name() {
        let Html(body) = profile("<script>alert(1)</script>");
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }
}

use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::pkce::LoginChallenge;
use crate::types::Provider;

/// Login cookies are only sent back to the auth routes.
const AUTH_PATH: &str = "/auth";

fn state_cookie_name(provider: Provider) -> &'static str {
    match provider {
        Provider::Facebook => "__crosspost_state_facebook",
        Provider::Google => "__crosspost_state_google",
        Provider::Twitter => "__crosspost_state_twitter",
    }
}

fn verifier_cookie_name(provider: Provider) -> &'static str {
    match provider {
        Provider::Facebook => "__crosspost_pkce_facebook",
        Provider::Google => "__crosspost_pkce_google",
        Provider::Twitter => "__crosspost_pkce_twitter",
    }
}

fn short_lived(name: &'static str, value: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(AUTH_PATH)
        .max_age(Duration::minutes(5))
        .build()
}

fn removal(name: &'static str, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path(path).max_age(Duration::ZERO).build()
}

/// Remember this attempt's state and PKCE verifier until the callback.
pub(super) fn remember_login(
    jar: PrivateCookieJar,
    provider: Provider,
    challenge: &LoginChallenge,
    secure: bool,
) -> PrivateCookieJar {
    jar.add(short_lived(state_cookie_name(provider), &challenge.state, secure))
        .add(short_lived(
            verifier_cookie_name(provider),
            &challenge.code_verifier,
            secure,
        ))
}

/// Forget the attempt. After this the callback cannot be replayed.
pub(super) fn forget_login(jar: PrivateCookieJar, provider: Provider) -> PrivateCookieJar {
    jar.remove(removal(state_cookie_name(provider), AUTH_PATH))
        .remove(removal(verifier_cookie_name(provider), AUTH_PATH))
}

pub(super) fn stored_state(jar: &PrivateCookieJar, provider: Provider) -> Option<String> {
    jar.get(state_cookie_name(provider))
        .map(|c| c.value().to_string())
}

pub(super) fn stored_verifier(jar: &PrivateCookieJar, provider: Provider) -> Option<String> {
    jar.get(verifier_cookie_name(provider))
        .map(|c| c.value().to_string())
}

pub(super) fn session_cookie(
    name: &str,
    session_id: &str,
    ttl: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), session_id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(ttl)
        .build()
}

pub(super) fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

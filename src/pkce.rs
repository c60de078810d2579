use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Per-attempt secrets for one OAuth login: the CSRF `state` echoed back by
/// the provider and a PKCE code verifier.
#[derive(Clone)]
pub struct LoginChallenge {
    pub state: String,
    pub code_verifier: String,
}

impl LoginChallenge {
    /// Fresh random state (22 chars) and verifier (64 chars, RFC 7636 range 43-128).
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let state: [u8; 16] = rng.random();
        let verifier: [u8; 48] = rng.random();
        Self {
            state: URL_SAFE_NO_PAD.encode(state),
            code_verifier: URL_SAFE_NO_PAD.encode(verifier),
        }
    }

    /// S256 challenge: `BASE64URL(SHA256(verifier))`.
    #[must_use]
    pub fn code_challenge(&self) -> String {
        code_challenge_for(&self.code_verifier)
    }
}

pub(crate) fn code_challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Random OAuth 1.0a nonce (32 alphanumeric chars).
#[must_use]
pub(crate) fn nonce() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

//! Password hashing and signed caller cookies

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::{STANDARD as B64, URL_SAFE_NO_PAD as B64URL};
use base64::Engine;
use hmac::{Hmac, Mac};
use mindline_agent::Identity;
use mindline_core::{Error, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

const HASH_SCHEME: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// PBKDF2 rounds used for stored passwords
pub const DEFAULT_PASSWORD_ROUNDS: u32 = 100_000;

/// Hashes and verifies passwords as `pbkdf2_sha256$rounds$salt$hash`
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    rounds: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_ROUNDS)
    }
}

impl PasswordHasher {
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let derived = derive(password, &salt, self.rounds)?;
        Ok(format!(
            "{}${}${}${}",
            HASH_SCHEME,
            self.rounds,
            B64.encode(salt),
            B64.encode(derived)
        ))
    }

    /// Check `password` against a stored hash. Malformed hashes never match.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.split('$');
        let (Some(scheme), Some(rounds), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        if scheme != HASH_SCHEME {
            return false;
        }
        let (Ok(rounds), Ok(salt), Ok(expected)) =
            (rounds.parse::<u32>(), B64.decode(salt), B64.decode(expected))
        else {
            return false;
        };

        match derive(password, &salt, rounds) {
            Ok(derived) => constant_time_eq(&derived, &expected),
            Err(_) => false,
        }
    }
}

fn derive(password: &str, salt: &[u8], rounds: u32) -> Result<[u8; HASH_LEN]> {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2::<HmacSha256>(password.as_bytes(), salt, rounds, &mut out)
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;
    Ok(out)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// What the signed cookie carries between requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerState {
    pub user_id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_chat_id: Option<String>,
}

impl CallerState {
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            active_chat_id: None,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.user_id, self.username.clone())
    }

    pub fn with_active_chat(mut self, session_id: impl Into<String>) -> Self {
        self.active_chat_id = Some(session_id.into());
        self
    }
}

/// Signs and reads the caller cookie.
///
/// Cookie value: `base64url(json).base64url(hmac_sha256(json))`.
#[derive(Clone)]
pub struct CookieCodec {
    key: Vec<u8>,
    cookie_name: String,
}

impl std::fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieCodec")
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl CookieCodec {
    /// Build a codec from the configured secret.
    ///
    /// A blank secret is replaced by random bytes, so cookies issued by this
    /// process stop validating after a restart.
    pub fn new(secret: &str, cookie_name: impl Into<String>) -> Self {
        let key = if secret.trim().is_empty() {
            warn!("No session secret configured; using a random per-process secret");
            let mut key = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut key);
            key
        } else {
            secret.as_bytes().to_vec()
        };
        Self {
            key,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| Error::Internal(format!("invalid cookie key: {}", e)))
    }

    pub fn encode(&self, state: &CallerState) -> Result<String> {
        let payload = serde_json::to_vec(state)?;
        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();
        Ok(format!("{}.{}", B64URL.encode(&payload), B64URL.encode(signature)))
    }

    /// Decode a cookie value; anything unsigned or tampered yields `None`
    pub fn decode(&self, value: &str) -> Option<CallerState> {
        let (payload, signature) = value.split_once('.')?;
        let payload = B64URL.decode(payload).ok()?;
        let signature = B64URL.decode(signature).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(&payload);
        mac.verify_slice(&signature).ok()?;

        serde_json::from_slice(&payload).ok()
    }

    /// The caller state from the request's `Cookie` headers, if valid
    pub fn read(&self, headers: &HeaderMap) -> Option<CallerState> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == self.cookie_name)
            .find_map(|(_, value)| self.decode(value))
    }

    /// A `Set-Cookie` header value carrying `state`
    pub fn set_cookie(&self, state: &CallerState) -> Result<String> {
        Ok(format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            self.cookie_name,
            self.encode(state)?
        ))
    }

    /// A `Set-Cookie` header value that removes the cookie
    pub fn clear_cookie(&self) -> String {
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            self.cookie_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(10)
    }

    #[test]
    fn test_password_hash_verifies() {
        let hasher = fast_hasher();
        let stored = hasher.hash("correct horse").unwrap();

        assert!(stored.starts_with("pbkdf2_sha256$10$"));
        assert!(hasher.verify("correct horse", &stored));
        assert!(!hasher.verify("wrong horse", &stored));
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let hasher = fast_hasher();
        assert_ne!(hasher.hash("pw").unwrap(), hasher.hash("pw").unwrap());
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "plaintext"));
        assert!(!hasher.verify("pw", "md5$1$AAAA$AAAA"));
        assert!(!hasher.verify("pw", "pbkdf2_sha256$x$AAAA$AAAA"));
    }

    #[test]
    fn test_cookie_roundtrip_and_tamper() {
        let codec = CookieCodec::new("secret", "mindline_session");
        let state = CallerState::new(7, "alice").with_active_chat("abc");

        let value = codec.encode(&state).unwrap();
        assert_eq!(codec.decode(&value), Some(state.clone()));

        let (payload, _) = value.split_once('.').unwrap();
        let forged = CallerState::new(8, "mallory");
        let forged_payload = B64URL.encode(serde_json::to_vec(&forged).unwrap());
        let (_, signature) = value.split_once('.').unwrap();
        assert_eq!(codec.decode(&format!("{}.{}", forged_payload, signature)), None);
        assert_eq!(codec.decode(payload), None);
    }

    #[test]
    fn test_cookie_from_other_secret_is_rejected() {
        let issuer = CookieCodec::new("one", "c");
        let reader = CookieCodec::new("two", "c");
        let value = issuer.encode(&CallerState::new(1, "a")).unwrap();
        assert_eq!(reader.decode(&value), None);
    }

    #[test]
    fn test_read_finds_named_cookie_among_others() {
        let codec = CookieCodec::new("secret", "mindline_session");
        let state = CallerState::new(3, "bob");
        let value = codec.encode(&state).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; mindline_session={}", value)).unwrap(),
        );

        assert_eq!(codec.read(&headers), Some(state));
    }

    #[test]
    fn test_set_and_clear_cookie_attributes() {
        let codec = CookieCodec::new("secret", "sid");
        let set = codec.set_cookie(&CallerState::new(1, "a")).unwrap();
        assert!(set.starts_with("sid="));
        assert!(set.ends_with("; Path=/; HttpOnly; SameSite=Lax"));
        assert!(codec.clear_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_blank_secret_uses_random_key() {
        let a = CookieCodec::new("", "c");
        let b = CookieCodec::new("  ", "c");
        let value = a.encode(&CallerState::new(1, "a")).unwrap();
        assert!(a.decode(&value).is_some());
        assert!(b.decode(&value).is_none());
    }
}

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::{error::AuthError, types::SessionClaims};

/// Lifetime of a dashboard session.
pub const SESSION_TTL_SECS: u64 = 3600;

/// Random token for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn signature(secret: &str, payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Encodes claims as `payload.signature`, both URL-safe base64.
pub fn sign_session(claims: &SessionClaims, secret: &str) -> String {
    // SessionClaims only holds strings and integers.
    let json = serde_json::to_vec(claims).unwrap_or_default();
    let payload = URL_SAFE_NO_PAD.encode(json);
    let signature = signature(secret, &payload);
    format!("{payload}.{signature}")
}

/// Checks the signature and expiry of a session token.
pub fn verify_session(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let (payload, sig) = token
        .split_once('.')
        .ok_or(AuthError::InvalidSession("malformed token"))?;

    if signature(secret, payload) != sig {
        return Err(AuthError::InvalidSession("bad signature"));
    }

    let json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::InvalidSession("bad encoding"))?;
    let claims: SessionClaims =
        serde_json::from_slice(&json).map_err(|_| AuthError::InvalidSession("bad claims"))?;

    if now() >= claims.exp {
        return Err(AuthError::Expired);
    }

    Ok(claims)
}

pub fn now() -> u64 {
    Utc::now().timestamp() as u64
}

/// `mm:ss` display form of a duration in seconds; `Unknown` for zero.
pub fn format_duration(secs: u64) -> String {
    if secs == 0 {
        return "Unknown".to_string();
    }
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn format_duration_ms(ms: u64) -> String {
    format_duration(ms / 1000)
}

/// Cuts `s` to at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Splits `Artist - Title` video titles when the uploader says nothing
/// useful about the artist.
pub fn split_artist_title(title: &str, uploader: &str) -> (String, String) {
    let generic = matches!(uploader, "" | "Various Artists" | "Unknown Artist") || uploader == title;
    if generic {
        if let Some((artist, rest)) = title.split_once(" - ") {
            let (artist, rest) = (artist.trim(), rest.trim());
            if !artist.is_empty() && !rest.is_empty() {
                return (artist.to_string(), rest.to_string());
            }
        }
    }

    (uploader.to_string(), title.to_string())
}

/// Whether `uri` is an absolute `http`/`https` URL with a host.
pub fn is_web_url(uri: &str) -> bool {
    reqwest::Url::parse(uri)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
}

/// Reads a cookie value out of a `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// The size of the per-session CSRF secret in bytes.
pub const CSRF_SECRET_SIZE: usize = 32;

/// The name of the hidden form field carrying the token.
pub const CSRF_FIELD: &str = "csrf_token";

/// The header a script may use instead of the form field.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Generates a new random per-session CSRF secret.
///
/// # Returns
///
/// A URL-safe base64-encoded secret.
pub fn generate_csrf_secret() -> String {
    let mut secret = [0u8; CSRF_SECRET_SIZE];
    OsRng.fill_bytes(&mut secret);

    general_purpose::URL_SAFE_NO_PAD.encode(secret)
}

/// Produces the token exposed in a rendered form.
///
/// The token is `pad || (pad ^ secret)` with a fresh pad on every call, so
/// two renders never show the same value while both verify against the
/// same secret.
///
/// # Arguments
///
/// * `secret` - The session's encoded CSRF secret.
///
/// # Returns
///
/// The masked token, or `None` if the secret is malformed.
pub fn mask_token(secret: &str) -> Option<String> {
    let secret = decode_secret(secret)?;

    let mut pad = [0u8; CSRF_SECRET_SIZE];
    OsRng.fill_bytes(&mut pad);

    let mut token = Vec::with_capacity(CSRF_SECRET_SIZE * 2);
    token.extend_from_slice(&pad);
    token.extend(pad.iter().zip(secret.iter()).map(|(p, s)| p ^ s));

    Some(general_purpose::URL_SAFE_NO_PAD.encode(token))
}

/// Checks a submitted token against the session's secret.
///
/// # Arguments
///
/// * `secret` - The session's encoded CSRF secret.
/// * `submitted` - The token sent by the client.
///
/// # Returns
///
/// `true` if the token unmasks to the secret.
pub fn verify_token(secret: &str, submitted: &str) -> bool {
    let Some(secret) = decode_secret(secret) else {
        return false;
    };

    let Ok(token) = general_purpose::URL_SAFE_NO_PAD.decode(submitted.trim()) else {
        return false;
    };

    if token.len() != CSRF_SECRET_SIZE * 2 {
        return false;
    }

    let (pad, masked) = token.split_at(CSRF_SECRET_SIZE);
    let unmasked: Vec<u8> = pad.iter().zip(masked.iter()).map(|(p, m)| p ^ m).collect();

    unmasked.ct_eq(&secret).into()
}

fn decode_secret(secret: &str) -> Option<[u8; CSRF_SECRET_SIZE]> {
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(secret).ok()?;
    bytes.try_into().ok()
}

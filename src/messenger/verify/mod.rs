use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::hash::BuildHasher;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const MODE_PARAM: &str = "hub.mode";
pub const VERIFY_TOKEN_PARAM: &str = "hub.verify_token";
pub const CHALLENGE_PARAM: &str = "hub.challenge";
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Header carrying the app-secret signature of an event delivery.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Check a subscription handshake and return the challenge to echo back.
///
/// Accepts iff `hub.mode` is `subscribe` and `hub.verify_token` equals `secret`.
/// An empty configured secret never matches. A missing challenge echoes as "".
pub fn verify_subscription<'a, S: BuildHasher>(
    params: &'a HashMap<String, String, S>,
    secret: &str,
) -> Option<&'a str> {
    let mode = params.get(MODE_PARAM).map_or("", String::as_str);
    let token = params.get(VERIFY_TOKEN_PARAM).map_or("", String::as_str);

    if mode != SUBSCRIBE_MODE || secret.is_empty() {
        return None;
    }
    if !bool::from(token.as_bytes().ct_eq(secret.as_bytes())) {
        return None;
    }
    Some(params.get(CHALLENGE_PARAM).map_or("", String::as_str))
}

/// Validate an `X-Hub-Signature-256` value (`sha256=<hex>`) against the raw body.
pub fn validate_payload_signature(app_secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let expected = hex::encode(mac.finalize().into_bytes());

    let Some(sig) = signature.strip_prefix("sha256=") else {
        return false;
    };
    expected.as_bytes().ct_eq(sig.as_bytes()).into()
}

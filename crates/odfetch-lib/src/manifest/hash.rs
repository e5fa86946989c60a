use crate::constants::media_console::{CLIENT_ID, HASH_SECRET, OMC, OS};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use digest::Digest;
use sha1::Sha1;

/// Device authentication hash expected by the license endpoint: SHA-1 over the
/// UTF-16LE encoding of `client|omc|os|secret`, base64 encoded.
pub fn license_hash(client_id: &str, omc: &str, os: &str, secret: &str) -> String {
    let value = format!("{client_id}|{omc}|{os}|{secret}");

    let mut hasher = Sha1::new();
    for unit in value.encode_utf16() {
        hasher.update(unit.to_le_bytes());
    }

    STANDARD.encode(hasher.finalize())
}

pub fn media_console_hash() -> String {
    license_hash(CLIENT_ID, OMC, OS, HASH_SECRET)
}

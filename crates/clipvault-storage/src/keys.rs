//! Storage key derivation shared by every backend.
//!
//! Key format: `{scope}/{random}{ext}`. The random component is 32 bytes from the
//! thread-local CSPRNG, encoded as unpadded base64url, so keys are unguessable and
//! safe as both object names and URL path segments.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Length of the random component before encoding.
pub const RANDOM_BYTES: usize = 32;

/// File extension (with leading dot) for a media type, or `""` if unknown.
pub fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "video/quicktime" => ".mov",
        _ => "",
    }
}

/// Derive a fresh key for an asset of `media_type` under `scope`.
pub fn derive_key(media_type: &str, scope: &str) -> String {
    let mut random = [0u8; RANDOM_BYTES];
    rand::rng().fill_bytes(&mut random);
    derive_key_with(media_type, scope, &random)
}

/// Derive the key for a given random component.
pub fn derive_key_with(media_type: &str, scope: &str, random: &[u8; RANDOM_BYTES]) -> String {
    let name = URL_SAFE_NO_PAD.encode(random);
    let scope = scope.trim_matches('/');
    if scope.is_empty() {
        format!("{}{}", name, extension_for(media_type))
    } else {
        format!("{}/{}{}", scope, name, extension_for(media_type))
    }
}

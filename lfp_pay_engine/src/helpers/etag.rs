use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha512_224};

/// A fresh, opaque etag. A new one is generated on every write.
///
/// The tag is the hex-encoded SHA-512/224 digest of a random number and the current time.
pub fn generate_etag() -> String {
    let now = Utc::now();
    let random = rand::thread_rng().gen_range(0..9_999_999u32);
    let seed = format!("{random:07}{}{}", now.timestamp_millis(), now.timestamp());
    let digest = Sha512_224::digest(seed.as_bytes());
    format!("{digest:x}")
}

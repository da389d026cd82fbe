//! Payable resource references are two upper-case letters followed by eight digits, e.g. `QF01234567`.
use rand::Rng;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn generate_reference() -> String {
    let mut rng = rand::thread_rng();
    let prefix = (0..2).map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char).collect::<String>();
    let number = rng.gen_range(0..99_999_999u32);
    format!("{prefix}{number:08}")
}

pub fn is_valid_reference(reference: &str) -> bool {
    let bytes = reference.as_bytes();
    bytes.len() == 10 && bytes[..2].iter().all(u8::is_ascii_uppercase) && bytes[2..].iter().all(u8::is_ascii_digit)
}

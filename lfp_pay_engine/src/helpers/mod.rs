mod etag;
mod reference;

pub use etag::generate_etag;
pub use reference::{generate_reference, is_valid_reference};

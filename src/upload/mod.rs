mod types;
mod validate;

pub use types::{UploadSelection, Validity};
pub use validate::{is_card_file, strip_fake_path};

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Validity {
    #[default]
    Unchecked,
    Valid,
    Invalid,
}

/// The file currently chosen in the upload form.
#[derive(Debug, Clone, Default)]
pub struct UploadSelection {
    /// Local file to post; `None` until the picker returns one.
    pub path: Option<PathBuf>,
    /// Text shown in the upload field.
    pub display: String,
    pub size: Option<u64>,
    pub validity: Validity,
    pub in_flight: bool,
}

impl UploadSelection {
    pub fn can_upload(&self) -> bool {
        self.validity == Validity::Valid && self.path.is_some() && !self.in_flight
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

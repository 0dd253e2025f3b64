/// Accumulating, newline-terminated log of user actions. The page shows it
/// in two panels; both read this one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLog {
    text: String,
}

pub const INVALID_EXTENSION_MESSAGE: &str = "Invalid file extension in upload form";

impl StatusLog {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn push_line(&mut self, message: &str) {
        self.text.push_str(message);
        self.text.push('\n');
    }

    pub fn uploaded(&mut self, field_value: &str) {
        self.push_line(&format!("Uploaded {}", field_value));
    }

    pub fn downloaded(&mut self, file: &str) {
        self.push_line(&format!("Downloaded {}", file));
    }

    pub fn invalid_extension(&mut self) {
        self.push_line(INVALID_EXTENSION_MESSAGE);
    }

    /// Replaces the contents verbatim with persisted text.
    pub fn restore(&mut self, text: String) {
        self.text = text;
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

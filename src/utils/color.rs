use eframe::egui::Color32;

const VALID_HEX: &str = "#28a745";
const INVALID_HEX: &str = "#dc3545";
const ACCENT_HEX: &str = "#a159e1";

pub trait ColorExt {
    fn parse_hex(hex: &str) -> Option<Self>
    where
        Self: Sized;
}

impl ColorExt for Color32 {
    fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Border and message colour of an accepted upload selection.
pub fn valid() -> Color32 {
    Color32::parse_hex(VALID_HEX).unwrap_or(Color32::GREEN)
}

pub fn invalid() -> Color32 {
    Color32::parse_hex(INVALID_HEX).unwrap_or(Color32::RED)
}

pub fn accent() -> Color32 {
    Color32::parse_hex(ACCENT_HEX).unwrap_or(Color32::LIGHT_BLUE)
}

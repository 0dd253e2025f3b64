const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable size of a file picked for upload.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    match unit {
        0 => format!("{} {}", bytes, UNITS[0]),
        _ => format!("{:.1} {}", size, UNITS[unit]),
    }
}

//! Table rows built from server records. The UI draws these as plain text
//! cells; nothing here is ever interpreted as markup.

use url::Url;

use crate::server::{download_url, CardProperty, FileLogEntry, FileLogResult};

pub const NO_FILES: &str = "No Files";
pub const SELECT_CARD_PLACEHOLDER: &str = "- Select Card -";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogRow {
    pub link: DownloadLink,
    pub individual_name: String,
    pub additional_properties: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileLogTable {
    /// Listing not received yet.
    #[default]
    Loading,
    /// Server holds no files; drawn as a single "No Files" row.
    Empty,
    /// Listing request failed; drawn as a header without rows.
    Unavailable,
    Rows(Vec<FileLogRow>),
}

impl FileLogTable {
    pub fn row_count(&self) -> usize {
        match self {
            FileLogTable::Loading | FileLogTable::Unavailable => 0,
            FileLogTable::Empty => 1,
            FileLogTable::Rows(rows) => rows.len(),
        }
    }

    /// Cell text per row, three cells each.
    pub fn cells(&self) -> Vec<[&str; 3]> {
        match self {
            FileLogTable::Loading | FileLogTable::Unavailable => Vec::new(),
            FileLogTable::Empty => vec![[NO_FILES; 3]],
            FileLogTable::Rows(rows) => rows
                .iter()
                .map(|row| {
                    [
                        row.link.label.as_str(),
                        row.individual_name.as_str(),
                        row.additional_properties.as_str(),
                    ]
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    /// 1-based, in server response order.
    pub number: usize,
    pub name: String,
    pub values: String,
}

/// One option of the card dropdown: label is the file name, value its
/// index in the directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardOption {
    pub label: String,
    pub value: usize,
}

pub fn download_link(base: &Url, file: &str) -> DownloadLink {
    let href = match download_url(base, file) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::warn!(file, error = %e, "cannot build download url");
            format!("uploads/{}", file)
        }
    };
    DownloadLink {
        label: file.to_string(),
        href,
    }
}

pub fn file_log_row(base: &Url, file: &str, entry: &FileLogEntry) -> FileLogRow {
    FileLogRow {
        link: download_link(base, file),
        individual_name: entry.individual_name.clone(),
        additional_properties: entry.additional_properties.clone(),
    }
}

/// Builds table rows and dropdown options from settled per-file fetches,
/// ordered by listing index. Failed fetches produce neither.
pub fn file_log_view(base: &Url, results: &[FileLogResult]) -> (Vec<FileLogRow>, Vec<CardOption>) {
    let mut settled: Vec<_> = results
        .iter()
        .filter_map(|r| r.entry.as_ref().map(|entry| (r.index, &r.name, entry)))
        .collect();
    settled.sort_by_key(|(index, _, _)| *index);

    settled
        .into_iter()
        .map(|(index, name, entry)| {
            (
                file_log_row(base, name, entry),
                CardOption {
                    label: name.clone(),
                    value: index,
                },
            )
        })
        .unzip()
}

pub fn card_rows(properties: &[CardProperty]) -> Vec<CardRow> {
    properties
        .iter()
        .enumerate()
        .map(|(i, prop)| CardRow {
            number: i + 1,
            name: prop.property_name.clone(),
            values: prop.property_values.clone(),
        })
        .collect()
}

pub fn copyright(year: i32) -> String {
    format!("\u{a9} {}", year)
}

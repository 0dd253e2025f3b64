use serde::{Deserialize, Deserializer};

/// Name of an uploaded card file as listed by `/uploadDirectory`.
pub type FileName = String;

/// Per-file summary returned by `/fileLog`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileLogEntry {
    #[serde(rename = "indiname", alias = "individualName")]
    pub individual_name: String,
    #[serde(
        rename = "addiprops",
        alias = "additionalProperties",
        deserialize_with = "string_or_number"
    )]
    pub additional_properties: String,
}

/// One parsed vCard field returned by `/cardView`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CardProperty {
    #[serde(rename = "propname", alias = "propertyName")]
    pub property_name: String,
    #[serde(rename = "propvalues", alias = "propertyValues")]
    pub property_values: String,
}

/// Outcome of one per-file summary fetch, keyed by its listing index.
#[derive(Debug, Clone)]
pub struct FileLogResult {
    pub index: usize,
    pub name: FileName,
    pub entry: Option<FileLogEntry>,
}

// The server writes the property count as a quoted number, but a bare
// number is accepted as well.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

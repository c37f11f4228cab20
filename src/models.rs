use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Literal written wherever a MAC address could not be resolved.
pub const MAC_SENTINEL: &str = "N/A";

/// One row of a source dataset. Fields missing from the row read as "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(|s| s.as_str()).unwrap_or("")
    }

    /// Trimmed value of `field`, empty when absent.
    pub fn get_trimmed(&self, field: &str) -> &str {
        self.get(field).trim()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A parsed dataset: header row in file order plus the data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Record>) -> Self {
        Self { headers, rows }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Old id, MAC (or sentinel), new id and username for one migrated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub old_user_id: String,
    pub mac_address: String,
    pub new_user_id: String,
    pub username: String,
}

impl Association {
    pub fn has_mac(&self) -> bool {
        self.mac_address != MAC_SENTINEL
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    /// old_user_id, mac_address, new_user_id, username
    #[default]
    Flat,
    /// MAC dataset rows with user_id replaced by the new id
    Template,
}

impl OutputShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Template => "template",
        }
    }
}

impl std::fmt::Display for OutputShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How values in the MAC column are stored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MacDecoding {
    /// Use the value as written
    #[default]
    Passthrough,
    /// Base64 of the six raw address bytes
    Base64,
}

impl MacDecoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Base64 => "base64",
        }
    }
}

impl std::fmt::Display for MacDecoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Column mapping for flexible schemas; map source column names to expected aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub old_id: String,
    pub old_username: String,
    pub mac_user_id: String,
    pub mac: String,
    pub new_id: String,
    pub new_username: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            old_id: "id".into(),
            old_username: "username".into(),
            mac_user_id: "user_id".into(),
            mac: "mac".into(),
            new_id: "id".into(),
            new_username: "username".into(),
        }
    }
}

impl ColumnMapping {
    /// (field, value) pairs, used for validation messages.
    pub fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("columns.old_id", self.old_id.as_str()),
            ("columns.old_username", self.old_username.as_str()),
            ("columns.mac_user_id", self.mac_user_id.as_str()),
            ("columns.mac", self.mac.as_str()),
            ("columns.new_id", self.new_id.as_str()),
            ("columns.new_username", self.new_username.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reads_empty() {
        let r: Record = [("id", " 7 ")].into_iter().collect();
        assert_eq!(r.get("id"), " 7 ");
        assert_eq!(r.get_trimmed("id"), "7");
        assert_eq!(r.get("username"), "");
        assert!(!r.contains("username"));
    }

    #[test]
    fn sentinel_means_no_mac() {
        let a = Association {
            old_user_id: "1".into(),
            mac_address: MAC_SENTINEL.into(),
            new_user_id: "9".into(),
            username: "bob".into(),
        };
        assert!(!a.has_mac());
    }
}

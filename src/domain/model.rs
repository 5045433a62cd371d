use serde::{Deserialize, Serialize};

/// One parsed row of contact data from the upstream results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub mobile: Option<String>,
    pub name: Option<String>,
    pub id_number: Option<String>,
    pub address: Option<String>,
    pub country: String,
}

impl Record {
    /// Identity used when merging passes within one request.
    pub fn dedupe_key(&self) -> (Option<&str>, Option<&str>) {
        (self.mobile.as_deref(), self.id_number.as_deref())
    }
}

/// Result of scanning one HTML document for the results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(Vec<Record>),
    NotFound,
}

impl Extraction {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Extraction::Found(records) => records,
            Extraction::NotFound => Vec::new(),
        }
    }
}

/// Merged result of the primary and secondary passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupOutcome {
    pub phone: String,
    pub records: Vec<Record>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_key_ignores_name_and_address() {
        let a = Record {
            mobile: Some("0300".to_string()),
            name: Some("A".to_string()),
            id_number: Some("12345".to_string()),
            address: None,
            country: "Pakistan".to_string(),
        };
        let b = Record {
            name: Some("B".to_string()),
            address: Some("Street".to_string()),
            ..a.clone()
        };
        assert_eq!(a.dedupe_key(), b.dedupe_key());
        assert_eq!(a.dedupe_key(), (Some("0300"), Some("12345")));
    }
}

use crate::domain::model::{LookupOutcome, Record};
use crate::utils::error::{LookupError, Result};
use serde::Serialize;

#[derive(Serialize)]
struct JsonOutput<'a> {
    success: bool,
    #[serde(flatten)]
    outcome: &'a LookupOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Csv,
    Tsv,
}

const HEADER: [&str; 5] = ["mobile", "name", "id_number", "address", "country"];

fn delimited(records: &[Record], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record([
            record.mobile.as_deref().unwrap_or_default(),
            record.name.as_deref().unwrap_or_default(),
            record.id_number.as_deref().unwrap_or_default(),
            record.address.as_deref().unwrap_or_default(),
            record.country.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| LookupError::ParseError {
        message: format!("failed to flush {} output: {}", if delimiter == b'\t' { "TSV" } else { "CSV" }, e),
    })?;
    String::from_utf8(bytes).map_err(|e| LookupError::ParseError {
        message: e.to_string(),
    })
}

/// Renders a lookup outcome. JSON keeps the HTTP response shape; CSV/TSV list records only.
pub fn render(outcome: &LookupOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let payload = JsonOutput {
                success: true,
                outcome,
            };
            Ok(serde_json::to_string_pretty(&payload)?)
        }
        OutputFormat::Csv => delimited(&outcome.records, b','),
        OutputFormat::Tsv => delimited(&outcome.records, b'\t'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> LookupOutcome {
        LookupOutcome {
            phone: "0300".to_string(),
            records: vec![
                Record {
                    mobile: Some("0300".to_string()),
                    name: Some("Ali, Khan".to_string()),
                    id_number: Some("12345".to_string()),
                    address: None,
                    country: "Pakistan".to_string(),
                },
            ],
            warnings: vec![],
        }
    }

    #[test]
    fn test_render_csv_quotes_and_blanks() {
        let csv = render(&outcome(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "mobile,name,id_number,address,country");
        assert_eq!(lines[1], "0300,\"Ali, Khan\",12345,,Pakistan");
    }

    #[test]
    fn test_render_tsv() {
        let tsv = render(&outcome(), OutputFormat::Tsv).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines[0], "mobile\tname\tid_number\taddress\tcountry");
        assert_eq!(lines[1], "0300\tAli, Khan\t12345\t\tPakistan");
    }

    #[test]
    fn test_render_json() {
        let json = render(&outcome(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["phone"], "0300");
        assert_eq!(value["records"][0]["address"], serde_json::Value::Null);
        assert_eq!(value["records"][0]["country"], "Pakistan");
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn test_render_json_includes_warnings_when_present() {
        let mut outcome = outcome();
        outcome.warnings.push("secondary lookup failed".to_string());
        let value: serde_json::Value =
            serde_json::from_str(&render(&outcome, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(value["warnings"][0], "secondary lookup failed");
    }
}

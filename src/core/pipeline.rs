use crate::adapters::HttpFetcher;
use crate::config::{SecondaryFailurePolicy, ServiceConfig};
use crate::core::extract::TableExtractor;
use crate::domain::model::{Extraction, LookupOutcome, Record};
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use crate::utils::validation::normalize_search_value;
use std::collections::HashMap;
use std::sync::Arc;

/// Primary pass, optional secondary pass on the first record's ID number, then merge.
pub struct LookupPipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: TableExtractor,
    secondary_failure: SecondaryFailurePolicy,
}

impl LookupPipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: TableExtractor,
        secondary_failure: SecondaryFailurePolicy,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            secondary_failure,
        }
    }

    pub fn from_config(config: Arc<ServiceConfig>) -> Result<Self> {
        let extractor = TableExtractor::new(&config.header_keywords, config.country.clone())?;
        let policy = config.secondary_failure;
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher), extractor, policy))
    }

    async fn pass(&self, search_value: &str) -> Result<Vec<Record>> {
        let html = self.fetcher.fetch(search_value).await?;
        match self.extractor.extract(&html) {
            Extraction::Found(records) => Ok(records),
            Extraction::NotFound => {
                tracing::debug!("No results table for '{}'", search_value);
                Ok(Vec::new())
            }
        }
    }

    pub async fn run(&self, phone: &str) -> Result<LookupOutcome> {
        let phone = normalize_search_value(phone)?;

        tracing::debug!("🔍 Primary lookup for '{}'", phone);
        let primary = self.pass(phone).await?;
        tracing::info!("Primary pass returned {} records", primary.len());

        let mut warnings = Vec::new();
        let secondary = match primary.first().and_then(|r| r.id_number.clone()) {
            None => {
                tracing::debug!("Skipping secondary lookup: no ID number in first record");
                Vec::new()
            }
            Some(id_number) => {
                tracing::debug!("🔍 Secondary lookup for '{}'", id_number);
                match self.pass(&id_number).await {
                    Ok(records) => {
                        tracing::info!("Secondary pass returned {} records", records.len());
                        records
                    }
                    Err(e) if self.secondary_failure == SecondaryFailurePolicy::Degrade => {
                        tracing::warn!("⚠️ Secondary lookup failed, returning primary records: {}", e);
                        warnings.push(format!("secondary lookup failed: {}", e));
                        Vec::new()
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let mut merged = primary;
        merged.extend(secondary);
        let records = dedupe_records(merged);

        tracing::info!("✅ Lookup produced {} unique records", records.len());
        Ok(LookupOutcome {
            phone: phone.to_string(),
            records,
            warnings,
        })
    }
}

/// Keeps the first record for each `(mobile, id_number)` pair, preserving order.
///
/// Later records with the same pair are dropped even when their name or address
/// differ; such collapses are logged.
pub fn dedupe_records(records: Vec<Record>) -> Vec<Record> {
    let mut unique: Vec<Record> = Vec::with_capacity(records.len());
    let mut seen: HashMap<(Option<String>, Option<String>), usize> = HashMap::new();

    for record in records {
        let (mobile, id_number) = record.dedupe_key();
        let key = (mobile.map(str::to_string), id_number.map(str::to_string));
        match seen.get(&key) {
            Some(&idx) => {
                let kept = &unique[idx];
                if kept.name != record.name || kept.address != record.address {
                    tracing::warn!("Duplicate record with different name or address dropped");
                    tracing::debug!(
                        "Dropped ({:?}, {:?}): name={:?} address={:?}",
                        record.mobile,
                        record.id_number,
                        record.name,
                        record.address
                    );
                }
            }
            None => {
                seen.insert(key, unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::LookupError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct MockFetcher {
        pages: HashMap<String, std::result::Result<String, u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn new(pages: &[(&str, std::result::Result<String, u16>)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        async fn calls(&self) -> Vec<String> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, search_value: &str) -> Result<String> {
            self.calls.lock().await.push(search_value.to_string());
            match self.pages.get(search_value) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(status)) => Err(LookupError::upstream("upstream failed", Some(*status))),
                None => Ok("<html><body>No record</body></html>".to_string()),
            }
        }
    }

    fn page(rows: &[[&str; 4]]) -> String {
        let body: String = rows
            .iter()
            .map(|r| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    r[0], r[1], r[2], r[3]
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Mobile</th><th>Name</th><th>CNIC</th><th>Address</th></tr></thead><tbody>{}</tbody></table>",
            body
        )
    }

    fn record(mobile: &str, name: &str, id: &str, address: &str) -> Record {
        Record {
            mobile: Some(mobile.to_string()),
            name: Some(name.to_string()),
            id_number: Some(id.to_string()),
            address: Some(address.to_string()),
            country: "Pakistan".to_string(),
        }
    }

    fn pipeline(fetcher: Arc<MockFetcher>, policy: SecondaryFailurePolicy) -> LookupPipeline {
        let extractor = TableExtractor::new(&["Mobile", "Name", "CNIC"], "Pakistan").unwrap();
        LookupPipeline::new(fetcher, extractor, policy)
    }

    #[tokio::test]
    async fn test_run_merges_primary_and_secondary() {
        let fetcher = MockFetcher::new(&[
            (
                "03027665767",
                Ok(page(&[["03027665767", "X", "12345-6789012-3", "Y"]])),
            ),
            (
                "12345-6789012-3",
                Ok(page(&[
                    ["03027665767", "X", "12345-6789012-3", "Y"],
                    ["03001234567", "X", "12345-6789012-3", "Y"],
                ])),
            ),
        ]);

        let outcome = tokio_test::assert_ok!(
            pipeline(fetcher.clone(), SecondaryFailurePolicy::Fail)
                .run(" 03027665767 ")
                .await
        );

        assert_eq!(outcome.phone, "03027665767");
        assert_eq!(
            outcome.records,
            vec![
                record("03027665767", "X", "12345-6789012-3", "Y"),
                record("03001234567", "X", "12345-6789012-3", "Y"),
            ]
        );
        assert!(outcome.warnings.is_empty());
        assert_eq!(fetcher.calls().await, vec!["03027665767", "12345-6789012-3"]);
    }

    #[tokio::test]
    async fn test_run_empty_primary_skips_secondary() {
        let fetcher = MockFetcher::new(&[]);

        let outcome = pipeline(fetcher.clone(), SecondaryFailurePolicy::Fail)
            .run("0300")
            .await
            .unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(fetcher.calls().await, vec!["0300"]);
    }

    #[tokio::test]
    async fn test_run_without_id_number_skips_secondary() {
        let fetcher = MockFetcher::new(&[("0300", Ok(page(&[["0300", "A", "", "B"]])))]);

        let outcome = pipeline(fetcher.clone(), SecondaryFailurePolicy::Fail)
            .run("0300")
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id_number, None);
        assert_eq!(fetcher.calls().await, vec!["0300"]);
    }

    #[tokio::test]
    async fn test_run_secondary_failure_fails_request() {
        let fetcher = MockFetcher::new(&[
            ("0300", Ok(page(&[["0300", "A", "12345", "B"]]))),
            ("12345", Err(502)),
        ]);

        let err = pipeline(fetcher, SecondaryFailurePolicy::Fail)
            .run("0300")
            .await
            .unwrap_err();

        assert_eq!(err.upstream_status(), Some(502));
    }

    #[tokio::test]
    async fn test_run_secondary_failure_degrades() {
        let fetcher = MockFetcher::new(&[
            ("0300", Ok(page(&[["0300", "A", "12345", "B"]]))),
            ("12345", Err(502)),
        ]);

        let outcome = pipeline(fetcher, SecondaryFailurePolicy::Degrade)
            .run("0300")
            .await
            .unwrap();

        assert_eq!(outcome.records, vec![record("0300", "A", "12345", "B")]);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("secondary lookup failed"));
    }

    #[tokio::test]
    async fn test_run_primary_failure_propagates() {
        let fetcher = MockFetcher::new(&[("0300", Err(500))]);

        let err = pipeline(fetcher, SecondaryFailurePolicy::Degrade)
            .run("0300")
            .await
            .unwrap_err();

        assert_eq!(err.upstream_status(), Some(500));
    }

    #[tokio::test]
    async fn test_run_blank_phone_makes_no_calls() {
        let fetcher = MockFetcher::new(&[]);

        let err = pipeline(fetcher.clone(), SecondaryFailurePolicy::Fail)
            .run("  ")
            .await
            .unwrap_err();

        assert!(matches!(err, LookupError::ValidationError { .. }));
        assert!(fetcher.calls().await.is_empty());
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let records = vec![
            record("0300", "First", "12345", "A"),
            record("0301", "Other", "12345", "A"),
            record("0300", "Second", "12345", "B"),
        ];

        let unique = dedupe_records(records);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].name.as_deref(), Some("First"));
        assert_eq!(unique[1].mobile.as_deref(), Some("0301"));
    }

    #[test]
    fn test_dedupe_treats_absent_fields_as_key_parts() {
        let mut no_id = record("0300", "A", "x", "B");
        no_id.id_number = None;
        let records = vec![no_id.clone(), record("0300", "A", "12345", "B"), no_id];

        assert_eq!(dedupe_records(records).len(), 2);
    }
}

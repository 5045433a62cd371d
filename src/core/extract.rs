//! Results-table extraction.
//!
//! The upstream page has no stable ids or classes, so the results table is found
//! by its header text and rows are mapped to [`Record`] by column position.

use crate::domain::model::{Extraction, Record};
use crate::utils::error::{LookupError, Result};
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};

const MOBILE_COLUMN: usize = 0;
const NAME_COLUMN: usize = 1;
const ID_NUMBER_COLUMN: usize = 2;
const ADDRESS_COLUMN: usize = 3;

pub struct TableExtractor {
    table: Selector,
    thead: Selector,
    row: Selector,
    body_row: Selector,
    cell: Selector,
    header_pattern: Regex,
    country: String,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| LookupError::ParseError {
        message: format!("invalid selector '{}': {}", css, e),
    })
}

/// Case-insensitive alternation of the given keywords, matched anywhere in the header text.
pub fn header_pattern<S: AsRef<str>>(keywords: &[S]) -> Result<Regex> {
    let alternation = keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");

    if alternation.is_empty() {
        return Err(LookupError::ConfigError {
            message: "header keyword set is empty".to_string(),
        });
    }

    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .map_err(|e| LookupError::ConfigError {
            message: format!("invalid header keywords: {}", e),
        })
}

/// Maps one row's cell texts to a record. Returns `None` for a row without cells.
pub fn record_from_cells(cells: &[String], country: &str) -> Option<Record> {
    if cells.is_empty() {
        return None;
    }

    let column = |idx: usize| {
        cells
            .get(idx)
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    Some(Record {
        mobile: column(MOBILE_COLUMN),
        name: column(NAME_COLUMN),
        id_number: column(ID_NUMBER_COLUMN),
        address: column(ADDRESS_COLUMN),
        country: country.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

impl TableExtractor {
    pub fn new<S: AsRef<str>>(keywords: &[S], country: impl Into<String>) -> Result<Self> {
        Ok(Self {
            table: selector("table")?,
            thead: selector("thead")?,
            row: selector("tr")?,
            body_row: selector("tbody tr")?,
            cell: selector("td, th")?,
            header_pattern: header_pattern(keywords)?,
            country: country.into(),
        })
    }

    /// Text of the `<thead>`, or of the first row when the table has no usable header section.
    pub fn header_text(&self, table: ElementRef<'_>) -> String {
        let thead_text = table
            .select(&self.thead)
            .map(element_text)
            .collect::<String>();
        if !thead_text.trim().is_empty() {
            return thead_text;
        }

        table
            .select(&self.row)
            .next()
            .map(element_text)
            .unwrap_or_default()
    }

    pub fn is_results_table(&self, table: ElementRef<'_>) -> bool {
        self.header_pattern.is_match(&self.header_text(table))
    }

    /// First table in document order whose header mentions one of the keywords.
    pub fn select_table<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document
            .select(&self.table)
            .find(|table| self.is_results_table(*table))
    }

    /// Data rows of a table. Without a `<thead>` the first row is the header and is skipped.
    pub fn body_rows<'a>(&self, table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let has_thead = table
            .select(&self.thead)
            .any(|thead| !element_text(thead).trim().is_empty());
        let rows = table.select(&self.body_row);

        if has_thead {
            rows.collect()
        } else {
            rows.skip(1).collect()
        }
    }

    pub fn row_cells(&self, row: ElementRef<'_>) -> Vec<String> {
        row.select(&self.cell)
            .map(|cell| element_text(cell).trim().to_string())
            .collect()
    }

    pub fn extract_document(&self, document: &Html) -> Extraction {
        let Some(table) = self.select_table(document) else {
            tracing::debug!("No results table found in document");
            return Extraction::NotFound;
        };

        let records: Vec<Record> = self
            .body_rows(table)
            .into_iter()
            .filter_map(|row| record_from_cells(&self.row_cells(row), &self.country))
            .collect();

        tracing::debug!("Extracted {} records from results table", records.len());
        Extraction::Found(records)
    }

    pub fn extract(&self, html: &str) -> Extraction {
        let document = Html::parse_document(html);
        self.extract_document(&document)
    }
}

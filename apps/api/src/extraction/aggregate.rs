//! Collects one record per document and renders the batch CSV.

use thiserror::Error;

use crate::extraction::schema::{csv_headers, FieldSpec};
use crate::models::batch::SkippedDocument;
use crate::models::resume::{FieldValue, ResumeRecord};

/// Separator used when a list field is flattened into a single cell.
pub const LIST_DELIMITER: &str = ", ";

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

/// Owns the records and skip list of one batch while it is processed.
#[derive(Debug, Default)]
pub struct BatchAggregator {
    records: Vec<ResumeRecord>,
    skipped: Vec<SkippedDocument>,
}

impl BatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, tagging it with the document it came from.
    pub fn push(&mut self, file_name: &str, mut record: ResumeRecord) {
        record.file_name = file_name.to_string();
        self.records.push(record);
    }

    pub fn skip(&mut self, skipped: SkippedDocument) {
        self.skipped.push(skipped);
    }

    #[cfg(test)]
    pub fn records(&self) -> &[ResumeRecord] {
        &self.records
    }

    #[cfg(test)]
    pub fn skipped(&self) -> &[SkippedDocument] {
        &self.skipped
    }

    pub fn into_parts(self) -> (Vec<ResumeRecord>, Vec<SkippedDocument>) {
        (self.records, self.skipped)
    }
}

/// Joins a list field into one cell, preserving order.
pub fn flatten_list(items: &[String]) -> String {
    items.join(LIST_DELIMITER)
}

fn cell(value: Option<FieldValue<'_>>) -> String {
    match value {
        Some(FieldValue::Text(text)) => text.unwrap_or_default().to_string(),
        Some(FieldValue::Integer(number)) => number.map(|n| n.to_string()).unwrap_or_default(),
        Some(FieldValue::List(items)) => flatten_list(items),
        None => String::new(),
    }
}

/// Flattens one record into a CSV row matching `csv_headers(fields)`.
pub fn flatten_record(fields: &[FieldSpec], record: &ResumeRecord) -> Vec<String> {
    fields
        .iter()
        .map(|f| cell(record.field(f.name)))
        .chain([
            record.file_name.clone(),
            record.extraction_status.as_str().to_string(),
        ])
        .collect()
}

/// Serializes records into a CSV table, one row per record.
///
/// Returns `None` when there are no records: an empty batch produces no file.
pub fn render_csv(
    fields: &[FieldSpec],
    records: &[ResumeRecord],
) -> Result<Option<Vec<u8>>, AggregateError> {
    if records.is_empty() {
        return Ok(None);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(csv_headers(fields))?;
    for record in records {
        writer.write_record(flatten_record(fields, record))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AggregateError::Buffer(e.to_string()))?;
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::schema::RESUME_FIELDS;
    use crate::models::batch::SkipReason;

    fn alice() -> ResumeRecord {
        ResumeRecord {
            fullname: Some("Alice Smith".to_string()),
            summary: "Data engineer, 6 years.".to_string(),
            skills: vec!["Python".to_string(), "SQL".to_string()],
            ats_score: Some(82),
            ..Default::default()
        }
    }

    fn read_rows(bytes: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    fn column(headers: &[String], name: &str) -> usize {
        headers.iter().position(|h| h == name).unwrap()
    }

    #[test]
    fn test_flatten_list_round_trips_on_delimiter() {
        let skills = vec!["Python".to_string(), "SQL".to_string()];
        let flat = flatten_list(&skills);
        assert_eq!(flat, "Python, SQL");
        let back: Vec<String> = flat.split(LIST_DELIMITER).map(String::from).collect();
        assert_eq!(back, skills);
    }

    #[test]
    fn test_flatten_empty_list_is_empty_cell() {
        assert_eq!(flatten_list(&[]), "");
    }

    #[test]
    fn test_push_tags_file_name() {
        let mut agg = BatchAggregator::new();
        agg.push("alice.pdf", alice());
        assert_eq!(agg.records()[0].file_name, "alice.pdf");
    }

    #[test]
    fn test_skip_is_tracked_separately() {
        let mut agg = BatchAggregator::new();
        agg.skip(SkippedDocument::new("x.txt", SkipReason::UnsupportedType, "txt"));
        assert!(agg.records().is_empty());
        assert_eq!(agg.skipped().len(), 1);
    }

    #[test]
    fn test_no_records_no_file() {
        assert!(render_csv(RESUME_FIELDS, &[]).unwrap().is_none());
    }

    #[test]
    fn test_csv_rows_and_absent_values() {
        let mut agg = BatchAggregator::new();
        agg.push("alice.pdf", alice());
        agg.push("bob.docx", ResumeRecord::default());
        let (records, _) = agg.into_parts();

        let bytes = render_csv(RESUME_FIELDS, &records).unwrap().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(!text.contains("None"));
        assert!(!text.contains("null"));

        let (headers, rows) = read_rows(&bytes);
        assert_eq!(headers.len(), RESUME_FIELDS.len() + 2);
        assert_eq!(rows.len(), 2);

        let skills = column(&headers, "skills");
        let score = column(&headers, "ats_score");
        let email = column(&headers, "email");
        let file = column(&headers, "file_name");

        assert_eq!(rows[0][skills], "Python, SQL");
        assert_eq!(rows[0][score], "82");
        assert_eq!(rows[0][email], "");
        assert_eq!(rows[0][file], "alice.pdf");
        assert_eq!(rows[1][score], "");
        assert_eq!(rows[1][skills], "");
        assert_eq!(rows[1][file], "bob.docx");
    }

    #[test]
    fn test_cells_with_commas_and_quotes_survive() {
        let record = ResumeRecord {
            summary: "Led \"Project X\", shipped on time\nacross teams".to_string(),
            file_name: "q.pdf".to_string(),
            ..Default::default()
        };
        let bytes = render_csv(RESUME_FIELDS, &[record]).unwrap().unwrap();
        let (headers, rows) = read_rows(&bytes);
        assert_eq!(
            rows[0][column(&headers, "summary")],
            "Led \"Project X\", shipped on time\nacross teams"
        );
    }

    #[test]
    fn test_incomplete_record_status_column() {
        let bytes = render_csv(RESUME_FIELDS, &[ResumeRecord::incomplete("bad.pdf")])
            .unwrap()
            .unwrap();
        let (headers, rows) = read_rows(&bytes);
        assert_eq!(rows[0][column(&headers, "extraction_status")], "incomplete");
        assert_eq!(rows[0][column(&headers, "file_name")], "bad.pdf");
    }

    #[test]
    fn test_column_set_is_stable_across_runs() {
        let first = render_csv(RESUME_FIELDS, &[alice()]).unwrap().unwrap();
        let second = render_csv(RESUME_FIELDS, &[ResumeRecord::default()])
            .unwrap()
            .unwrap();
        assert_eq!(read_rows(&first).0, read_rows(&second).0);
    }
}

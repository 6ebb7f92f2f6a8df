//! Heuristic scoring for CSV exports of lifestyle surveys. Headers are the
//! form field names; a bad row is reported without stopping the batch.

use std::io::Read;
use std::path::Path;

use super::domain::{AssessmentError, FormFields};
use super::heuristic::{HeuristicAssessment, HeuristicScorer};
use super::intake;

#[derive(Debug)]
pub struct BatchRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub outcome: Result<HeuristicAssessment, AssessmentError>,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("unable to read survey CSV: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed survey CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub fn score_csv_path<P: AsRef<Path>>(path: P) -> Result<Vec<BatchRow>, BatchError> {
    let file = std::fs::File::open(path)?;
    score_csv(file)
}

pub fn score_csv<R: Read>(reader: R) -> Result<Vec<BatchRow>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.to_ascii_lowercase())
        .collect();

    let scorer = HeuristicScorer::new();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let fields: FormFields = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        let outcome = intake::lifestyle_survey(&fields).map(|survey| scorer.evaluate(&survey));
        rows.push(BatchRow { line, outcome });
    }

    Ok(rows)
}

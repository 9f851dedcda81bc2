//! Renderer-facing report rows and the CSV / JSON renderers.
//!
//! A [`Report`] is the only thing a renderer sees: per area an [`AreaRow`]
//! followed by its [`SubjectRow`]s, both in transcript order, plus an optional
//! [`Summary`]. The summary is absent when the average could not be
//! calculated; the rows are still rendered so the parsed data is not lost.

use crate::average::GradeTotals;
use crate::error::LedgerError;
use crate::evaluate::Evaluation;
use crate::transcript::Transcript;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// `(area_name, required_lp, accepted_lp, area_average)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRow {
    pub name: String,
    pub required_lp: u32,
    pub accepted_lp: u64,
    pub average: Option<f64>,
}

/// `(code, name, lp, lp_evaluate, grade_or_absent)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectRow {
    pub code: String,
    pub name: String,
    pub lp: u32,
    pub lp_evaluate: u32,
    pub grade: Option<f64>,
}

/// An area row with the subject rows beneath it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaSection {
    pub area: AreaRow,
    pub subjects: Vec<SubjectRow>,
}

/// `(total_lp, weighted_grade, overall_average)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub total_lp: u64,
    pub weighted_grade: f64,
    pub average: f64,
}

impl From<&GradeTotals> for Summary {
    fn from(t: &GradeTotals) -> Self {
        Self {
            total_lp: t.total_lp,
            weighted_grade: t.weighted_grade,
            average: t.average(),
        }
    }
}

/// Everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sections: Vec<AreaSection>,
    pub summary: Option<Summary>,
}

impl Report {
    /// Build rows from a (normalized) transcript.
    pub fn new(transcript: &Transcript, totals: Option<&GradeTotals>) -> Self {
        let sections = transcript
            .areas()
            .iter()
            .map(|area| AreaSection {
                area: AreaRow {
                    name: area.name().to_string(),
                    required_lp: area.lp(),
                    accepted_lp: area.accepted_lp(),
                    average: area.average(),
                },
                subjects: area
                    .subjects()
                    .iter()
                    .map(|s| SubjectRow {
                        code: s.short.clone(),
                        name: s.name.clone(),
                        lp: s.lp(),
                        lp_evaluate: s.lp_evaluate(),
                        grade: s.grade,
                    })
                    .collect(),
            })
            .collect();

        Self {
            sections,
            summary: totals.map(Summary::from),
        }
    }

    pub fn from_evaluation(eval: &Evaluation) -> Self {
        Self::new(&eval.transcript, eval.totals.as_ref().ok())
    }
}

/// Output formats the crate can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    /// Guess the format from a file extension; anything unknown is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }

    pub fn renderer(self) -> Box<dyn ReportRenderer> {
        match self {
            ReportFormat::Csv => Box::new(CsvRenderer::default()),
            ReportFormat::Json => Box::new(JsonRenderer),
        }
    }
}

/// Turns a [`Report`] into bytes.
pub trait ReportRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), LedgerError>;

    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    fn render_to_string(&self, report: &Report) -> Result<String, LedgerError> {
        let mut buf = Vec::new();
        self.render(report, &mut buf)?;
        String::from_utf8(buf).map_err(|e| LedgerError::ReportFailed(e.to_string()))
    }
}

/// Spreadsheet-style CSV: one row per area, one per subject, then the summary.
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    /// Field delimiter. Default: `,`.
    pub delimiter: u8,
}

impl Default for CsvRenderer {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

pub const CSV_HEADERS: [&str; 6] = ["Area", "Code", "Name", "LP", "Counted LP", "Grade"];

fn csv_err(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::ReportFailed(e.to_string())
}

impl ReportRenderer for CsvRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), LedgerError> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_writer(out);

        writer.write_record(CSV_HEADERS).map_err(csv_err)?;

        for section in &report.sections {
            let area = &section.area;
            let average = area
                .average
                .map(|a| format!("{:.2}", a))
                .unwrap_or_default();
            writer
                .write_record([
                    area.name.clone(),
                    String::new(),
                    String::new(),
                    area.required_lp.to_string(),
                    area.accepted_lp.to_string(),
                    average,
                ])
                .map_err(csv_err)?;

            for s in &section.subjects {
                let grade = s.grade.map(|g| format!("{:.1}", g)).unwrap_or_default();
                writer
                    .write_record([
                        String::new(),
                        s.code.clone(),
                        s.name.clone(),
                        s.lp.to_string(),
                        s.lp_evaluate.to_string(),
                        grade,
                    ])
                    .map_err(csv_err)?;
            }
        }

        if let Some(summary) = report.summary {
            writer.write_record([""]).map_err(csv_err)?;
            writer
                .write_record(["Total LP".to_string(), summary.total_lp.to_string()])
                .map_err(csv_err)?;
            writer
                .write_record(["Total Sum".to_string(), format!("{:.4}", summary.weighted_grade)])
                .map_err(csv_err)?;
            writer
                .write_record(["Average".to_string(), format!("{:.5}", summary.average)])
                .map_err(csv_err)?;
        }

        writer.flush().map_err(csv_err)?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "csv"
    }
}

/// Pretty-printed JSON of the whole [`Report`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, report: &Report, out: &mut dyn Write) -> Result<(), LedgerError> {
        serde_json::to_writer_pretty(&mut *out, report).map_err(csv_err)?;
        out.write_all(b"\n").map_err(csv_err)?;
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

/// Render `report` into `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn write_report(
    report: &Report,
    renderer: &dyn ReportRenderer,
    path: impl AsRef<Path>,
) -> Result<(), LedgerError> {
    let path = path.as_ref();
    let write_err = |source: std::io::Error| LedgerError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let bytes = {
        let mut buf = Vec::new();
        renderer.render(report, &mut buf)?;
        buf
    };

    let tmp_path = path.with_extension(format!("{}.tmp", renderer.extension()));
    debug!("Writing report to {}", tmp_path.display());
    std::fs::write(&tmp_path, &bytes).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)?;

    info!(
        "Wrote {} report ({} areas) to {}",
        renderer.extension(),
        report.sections.len(),
        path.display()
    );
    Ok(())
}

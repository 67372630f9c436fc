//! Findings and comparison reports: CSV and HTML rendering, CSV re-import.
//!
//! Report filenames are timestamped so concurrent runs never collide on
//! output files.

use thiserror::Error;

use crate::batch::{ModelOutcome, ModelRun};
use crate::findings::{Finding, FindingLevel};

pub const FINDINGS_CSV_HEADER: &str = "ID,Level,Description,Recommendation,Reference";

pub const COMPARISON_CSV_HEADER: &str = "Model,Status,Total_Findings,Fatal,Major,Minor,\
Best_Practice,Nice_To_Have,Total_Tokens,Input_Tokens,Output_Tokens,Response_Time_Seconds,Error";

/// Per-model findings report format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("malformed CSV at line {line}: {message}")]
    MalformedCsv { line: usize, message: String },
}

/// Filename-safe model id with a run timestamp, e.g.
/// `openai_gpt-4o-mini_20250101_120000.csv`.
pub fn report_filename(model_id: &str, timestamp: &str, extension: &str) -> String {
    format!("{}_{}.{}", model_id.replace('/', "_"), timestamp, extension)
}

pub fn run_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render findings as CSV in the order given by the caller.
pub fn findings_to_csv(findings: &[Finding]) -> String {
    let mut out = String::from(FINDINGS_CSV_HEADER);
    out.push('\n');
    for finding in findings {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            finding.id,
            csv_escape(finding.level.as_str()),
            csv_escape(&finding.description),
            csv_escape(&finding.recommendation),
            csv_escape(&finding.reference),
        ));
    }
    out
}

/// Re-read a findings CSV produced by [`findings_to_csv`].
pub fn parse_findings_csv(text: &str) -> Result<Vec<Finding>, ReportError> {
    let mut findings = Vec::new();
    for (idx, record) in split_csv_records(text).into_iter().enumerate() {
        let line = idx + 1;
        if idx == 0 {
            // Header row.
            continue;
        }
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        if record.len() != 5 {
            return Err(ReportError::MalformedCsv {
                line,
                message: format!("expected 5 fields, got {}", record.len()),
            });
        }
        let id = record[0].parse::<i64>().map_err(|e| ReportError::MalformedCsv {
            line,
            message: format!("bad id '{}': {}", record[0], e),
        })?;
        let level = record[1]
            .parse::<FindingLevel>()
            .map_err(|message| ReportError::MalformedCsv { line, message })?;
        findings.push(Finding {
            id,
            level,
            description: record[2].clone(),
            recommendation: record[3].clone(),
            reference: record[4].clone(),
        });
    }
    Ok(findings)
}

/// Split CSV text into records of unescaped fields (RFC 4180 quoting).
fn split_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// One comparison row per attempted model, `SUCCESS` or `ERROR` with the
/// captured error text. Rows follow the order the batch ran in.
pub fn comparison_to_csv(runs: &[ModelRun]) -> String {
    let mut out = String::from(COMPARISON_CSV_HEADER);
    out.push('\n');
    for run in runs {
        match &run.outcome {
            ModelOutcome::Success(result) => {
                let counts = result.level_counts();
                let usage = &result.token_usage;
                out.push_str(&format!(
                    "{},SUCCESS,{},{},{},{},{},{},{},{},{},{:.2},\n",
                    csv_escape(&run.model),
                    result.findings.len(),
                    counts[0],
                    counts[1],
                    counts[2],
                    counts[3],
                    counts[4],
                    usage.total_tokens,
                    usage.input_tokens,
                    usage.output_tokens,
                    usage.response_time_seconds,
                ));
            }
            ModelOutcome::Failed(error) => {
                out.push_str(&format!(
                    "{},ERROR,0,0,0,0,0,0,0,0,0,0.00,{}\n",
                    csv_escape(&run.model),
                    csv_escape(error),
                ));
            }
        }
    }
    out
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn level_css_class(level: FindingLevel) -> &'static str {
    match level {
        FindingLevel::Fatal => "level-fatal",
        FindingLevel::Major => "level-major",
        FindingLevel::Minor => "level-minor",
        FindingLevel::BestPractice => "level-best-practice",
        FindingLevel::NiceToHave => "level-nice-to-have",
    }
}

const HTML_STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 6px 10px; text-align: left; vertical-align: top; }
th { background: #f0f0f0; }
.level-fatal { color: #8b0000; font-weight: bold; }
.level-major { color: #ff0000; font-weight: bold; }
.level-minor { color: #ff8c00; }
.level-best-practice { color: #0000ff; }
.level-nice-to-have { color: #808080; }
.error-banner { background: #fff3f3; border: 1px solid #c00; padding: 10px; margin-bottom: 1em; }";

/// Render findings as a styled HTML table with severity color-coding.
/// `error_log` names the run's error log; when present a banner links to it.
pub fn findings_to_html(model_id: &str, findings: &[Finding], error_log: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!(
        "<title>Findings - {}</title>\n",
        html_escape(model_id)
    ));
    out.push_str(&format!("<style>\n{}\n</style>\n</head>\n<body>\n", HTML_STYLE));
    out.push_str(&format!("<h1>Findings - {}</h1>\n", html_escape(model_id)));

    if let Some(log) = error_log {
        out.push_str(&format!(
            "<div class=\"error-banner\">Some models failed during this run. \
See <a href=\"{}\">{}</a> for details.</div>\n",
            html_escape(log),
            html_escape(log)
        ));
    }

    out.push_str("<table>\n<tr><th>ID</th><th>Level</th><th>Description</th>\
<th>Recommendation</th><th>Reference</th></tr>\n");
    for finding in findings {
        out.push_str(&format!(
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            finding.id,
            level_css_class(finding.level),
            html_escape(finding.level.as_str()),
            html_escape(&finding.description),
            html_escape(&finding.recommendation),
            html_escape(&finding.reference),
        ));
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

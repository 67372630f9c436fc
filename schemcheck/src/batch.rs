//! Multi-model batch driver.
//!
//! Runs the requested models strictly sequentially against one netlist,
//! isolating failures per model: a missing key, transport error, or schema
//! mismatch is recorded as that model's error text and never aborts the
//! rest of the batch.

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::ConfigManager;
use crate::findings::{sort_findings_for_display, AnalysisResult};
use crate::llm::LlmOperations;
use crate::report::{
    self, comparison_to_csv, findings_to_csv, findings_to_html, report_filename, ReportFormat,
};

/// Candidate models the batch driver knows about.
pub const AVAILABLE_MODELS: &[&str] = &[
    "openai/gpt-4o-mini",
    "openai/gpt-4o",
    "openai/gpt-5",
    "anthropic/claude-sonnet-4-20250514",
    "google/gemini-2.5-flash-lite",
    "google/gemini-2.5-flash",
];

/// Terminal state of one model's run.
#[derive(Debug, Clone)]
pub enum ModelOutcome {
    Success(AnalysisResult),
    Failed(String),
}

impl ModelOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            ModelOutcome::Success(result) => Some(result),
            ModelOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ModelOutcome::Success(_) => None,
            ModelOutcome::Failed(error) => Some(error),
        }
    }
}

/// One attempted model with its terminal outcome, in batch order.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub model: String,
    pub outcome: ModelOutcome,
}

/// Files written by one batch run.
#[derive(Debug)]
pub struct BatchReport {
    pub runs: Vec<ModelRun>,
    pub findings_reports: Vec<PathBuf>,
    pub summary_path: PathBuf,
    pub error_log: Option<PathBuf>,
}

pub struct MultiModelAnalyzer {
    netlist: String,
    schematic: Option<String>,
    output_dir: PathBuf,
    config: ConfigManager,
}

impl MultiModelAnalyzer {
    /// Create a driver over one netlist, creating the output directory.
    pub fn new(
        netlist: String,
        schematic: Option<String>,
        output_dir: PathBuf,
        config: ConfigManager,
    ) -> io::Result<Self> {
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            netlist,
            schematic,
            output_dir,
            config,
        })
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Candidates with a stored API key, optionally restricted to `subset`,
    /// in candidate-list order.
    pub fn available_models(&self, subset: Option<&[String]>) -> Vec<String> {
        AVAILABLE_MODELS
            .iter()
            .filter(|model| match subset {
                Some(subset) => subset.iter().any(|s| s == *model),
                None => true,
            })
            .filter(|model| self.config.api_key_for_model(model).is_some())
            .map(|model| model.to_string())
            .collect()
    }

    /// Run one model to its terminal state. Every failure, missing key
    /// included, is captured as error text rather than propagated.
    pub async fn analyze_with_model(&self, model_id: &str) -> ModelOutcome {
        let Some(api_key) = self.config.api_key_for_model(model_id) else {
            return ModelOutcome::Failed(format!(
                "no API key configured for provider '{}'",
                crate::config::provider_for_model(model_id)
            ));
        };

        let ops = match LlmOperations::new(model_id, api_key) {
            Ok(ops) => ops,
            Err(e) => return ModelOutcome::Failed(e.to_string()),
        };

        let result = match &self.schematic {
            Some(schematic) => {
                ops.analyze_schematic_and_netlist(&self.netlist, schematic)
                    .await
            }
            None => ops.analyze_netlist(&self.netlist).await,
        };

        match result {
            Ok(result) => ModelOutcome::Success(result),
            Err(e) => {
                tracing::error!("analysis with {} failed: {}", model_id, e);
                ModelOutcome::Failed(e.to_string())
            }
        }
    }

    /// Run every requested model sequentially and write all reports.
    pub async fn run_analysis(
        &self,
        models: &[String],
        format: ReportFormat,
    ) -> io::Result<BatchReport> {
        let mut runs = Vec::with_capacity(models.len());
        for model in models {
            tracing::info!("running analysis with {}", model);
            let outcome = self.analyze_with_model(model).await;
            runs.push(ModelRun {
                model: model.clone(),
                outcome,
            });
        }
        self.write_reports(runs, format)
    }

    /// Write per-model findings reports (severity-sorted), the comparison
    /// summary, and an error log when any model failed.
    pub fn write_reports(
        &self,
        runs: Vec<ModelRun>,
        format: ReportFormat,
    ) -> io::Result<BatchReport> {
        let timestamp = report::run_timestamp();

        let error_log_name = format!("analysis_errors_{}.log", timestamp);
        let failures: Vec<(&str, &str)> = runs
            .iter()
            .filter_map(|run| run.outcome.error().map(|e| (run.model.as_str(), e)))
            .collect();
        let error_log = if failures.is_empty() {
            None
        } else {
            let path = self.output_dir.join(&error_log_name);
            let mut log = String::new();
            for (model, error) in &failures {
                log.push_str(&format!("{}: {}\n", model, error));
            }
            fs::write(&path, log)?;
            Some(path)
        };

        let mut findings_reports = Vec::new();
        for run in &runs {
            let Some(result) = run.outcome.result() else {
                continue;
            };
            let mut findings = result.findings.clone();
            sort_findings_for_display(&mut findings);

            let filename = report_filename(&run.model, &timestamp, format.extension());
            let path = self.output_dir.join(filename);
            let body = match format {
                ReportFormat::Csv => findings_to_csv(&findings),
                ReportFormat::Html => findings_to_html(
                    &run.model,
                    &findings,
                    error_log.as_ref().map(|_| error_log_name.as_str()),
                ),
            };
            fs::write(&path, body)?;
            tracing::info!("saved {} findings to {}", findings.len(), path.display());
            findings_reports.push(path);
        }

        let summary_path = self
            .output_dir
            .join(format!("model_comparison_{}.csv", timestamp));
        fs::write(&summary_path, comparison_to_csv(&runs))?;

        Ok(BatchReport {
            runs,
            findings_reports,
            summary_path,
            error_log,
        })
    }
}

//! SchemCheck - LLM-powered KiCad netlist review library
//!
//! This library orchestrates schematic review through hosted language
//! models: it formats a review prompt from an exported netlist, issues a
//! structured completion against one or more configured models, and renders
//! the resulting findings as CSV or HTML reports.
//!
//! # Quick Start
//!
//! ```no_run
//! use schemcheck::{ConfigManager, LlmOperations};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::new();
//! let model = config.selected_model();
//! let key = config.api_key_for_model(model).ok_or("no key configured")?;
//!
//! let ops = LlmOperations::new(model, key)?;
//! let result = ops.analyze_netlist("(export (version \"E\") ...)").await?;
//! for finding in &result.findings {
//!     println!("[{}] {}: {}", finding.level, finding.reference, finding.description);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Multi-provider**: OpenAI, Anthropic, and Google model families
//! - **Batch comparison**: run every configured model over one netlist
//! - **Reports**: per-model CSV/HTML findings plus a cross-model summary
//! - **Netlist export**: wraps the external `kicad-cli` exporter

pub mod batch;
pub mod config;
pub mod findings;
pub mod kicad;
pub mod llm;
pub mod report;

// Re-export main types
pub use batch::{BatchReport, ModelOutcome, ModelRun, MultiModelAnalyzer, AVAILABLE_MODELS};
pub use config::{provider_for_model, ConfigManager, DEFAULT_MODEL};
pub use findings::{
    sort_findings_for_display, AnalysisResult, Finding, FindingLevel, Findings, TokenUsage,
};
pub use kicad::{ExportError, NetlistExporter};
pub use llm::{LlmError, LlmOperations, Provider};
pub use report::{ReportError, ReportFormat};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AnalysisResult, ConfigManager, Finding, FindingLevel, LlmError, LlmOperations,
        ModelOutcome, ModelRun, MultiModelAnalyzer, ReportFormat, TokenUsage,
    };
}

//! SchemCheck CLI - LLM-powered netlist review from the command line.

use clap::{Parser, ValueEnum};
use schemcheck::{
    ConfigManager, ModelRun, MultiModelAnalyzer, NetlistExporter, ReportFormat, AVAILABLE_MODELS,
};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemcheck")]
#[command(about = "Run LLM analysis on a KiCad netlist using multiple models", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the netlist file (.net); a .kicad_sch path is exported
    /// through kicad-cli first
    #[arg(
        long,
        value_name = "PATH",
        required_unless_present_any = ["list_models", "set_api_key", "remove_api_key"]
    )]
    netlist: Option<PathBuf>,

    /// Schematic source file folded into the prompt for extra context
    #[arg(long, value_name = "PATH")]
    schematic: Option<PathBuf>,

    /// Output directory for report files
    #[arg(long, value_name = "DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// Comma-separated list of models to run (default: all with configured keys)
    #[arg(long, value_delimiter = ',', value_name = "MODELS")]
    models: Option<Vec<String>>,

    /// Per-model findings report format
    #[arg(long, value_enum, default_value = "csv")]
    format: FormatArg,

    /// List candidate models and exit
    #[arg(long)]
    list_models: bool,

    /// Store an API key for a provider and exit
    #[arg(long, num_args = 2, value_names = ["PROVIDER", "KEY"])]
    set_api_key: Option<Vec<String>>,

    /// Remove a provider's API key and exit
    #[arg(long, value_name = "PROVIDER")]
    remove_api_key: Option<String>,

    /// Use an alternate configuration file
    #[arg(long, value_name = "PATH")]
    config_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Comma-separated values
    Csv,
    /// Styled HTML table
    Html,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Html => ReportFormat::Html,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    let mut config = match &cli.config_file {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    if cli.list_models {
        list_models(&config);
        return 0;
    }

    if let Some(args) = &cli.set_api_key {
        config.set_api_key_for_provider(&args[0], &args[1]);
        println!("Stored API key for provider '{}'", args[0]);
        return 0;
    }

    if let Some(provider) = &cli.remove_api_key {
        config.remove_api_key_for_provider(provider);
        println!("Removed API key for provider '{}'", provider);
        return 0;
    }

    // clap guarantees --netlist is present past this point.
    let Some(netlist_path) = &cli.netlist else {
        eprintln!("Error: --netlist is required");
        return 1;
    };
    if !netlist_path.exists() {
        eprintln!("Error: Netlist file not found: {}", netlist_path.display());
        return 1;
    }

    if let Some(models) = &cli.models {
        for model in models {
            if !AVAILABLE_MODELS.contains(&model.as_str()) {
                eprintln!(
                    "Error: Unknown model '{}'. Use --list-models to see candidates.",
                    model
                );
                return 1;
            }
        }
    }

    let netlist = match load_netlist(netlist_path) {
        Ok(text) => text,
        Err(message) => {
            eprintln!("Error: {}", message);
            return 1;
        }
    };

    let schematic = match &cli.schematic {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                eprintln!("Error: Failed to read schematic {}: {}", path.display(), e);
                return 1;
            }
        },
        None => None,
    };

    let analyzer =
        match MultiModelAnalyzer::new(netlist, schematic, cli.output_dir.clone(), config) {
            Ok(analyzer) => analyzer,
            Err(e) => {
                eprintln!(
                    "Error: Failed to create output directory {}: {}",
                    cli.output_dir.display(),
                    e
                );
                return 1;
            }
        };

    let models = match &cli.models {
        Some(models) => models.clone(),
        None => analyzer.available_models(None),
    };
    if models.is_empty() {
        println!("No models with API keys found. Configure one with --set-api-key first.");
        return 0;
    }

    println!("Analyzing netlist: {}", netlist_path.display());
    println!("Output directory: {}", cli.output_dir.display());
    println!("{}", "-".repeat(60));

    let mut runs = Vec::with_capacity(models.len());
    for model in &models {
        println!("Running analysis with {}...", model);
        let outcome = analyzer.analyze_with_model(model).await;
        match &outcome {
            schemcheck::ModelOutcome::Success(result) => {
                println!("  ok {}: {} findings", model, result.findings.len());
                println!("  Token usage: {}", result.token_usage.breakdown_text());
            }
            schemcheck::ModelOutcome::Failed(error) => {
                println!("  failed {}: {}", model, error);
            }
        }
        println!();
        runs.push(ModelRun {
            model: model.clone(),
            outcome,
        });
    }

    let report = match analyzer.write_reports(runs, cli.format.into()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: Failed to write reports: {}", e);
            return 1;
        }
    };

    for path in &report.findings_reports {
        println!("Saved findings report: {}", path.display());
    }
    println!("Saved model comparison summary: {}", report.summary_path.display());
    if let Some(log) = &report.error_log {
        println!("Errors logged to: {}", log.display());
    }

    let successes = report
        .runs
        .iter()
        .filter(|r| r.outcome.result().is_some())
        .count();
    println!("{}", "=".repeat(60));
    println!(
        "Analysis complete! Successfully analyzed with {} of {} models.",
        successes,
        report.runs.len()
    );
    0
}

fn list_models(config: &ConfigManager) {
    println!("Candidate models:");
    for model in AVAILABLE_MODELS {
        let marker = if config.api_key_for_model(model).is_some() {
            " (key configured)"
        } else {
            ""
        };
        println!("  {}{}", model, marker);
    }
}

/// Read netlist text, exporting through kicad-cli when handed a schematic.
fn load_netlist(path: &PathBuf) -> Result<String, String> {
    let is_schematic = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext == "kicad_sch")
        .unwrap_or(false);

    if is_schematic {
        let exporter = NetlistExporter::locate()
            .map_err(|e| format!("Cannot export netlist from {}: {}", path.display(), e))?;
        exporter
            .export_netlist(path)
            .map_err(|e| format!("Netlist export failed for {}: {}", path.display(), e))
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read netlist {}: {}", path.display(), e))
    }
}

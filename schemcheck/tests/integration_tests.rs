//! Integration tests for the SchemCheck library

use schemcheck::prelude::*;
use schemcheck::report;
use tempfile::TempDir;

fn workspace() -> (TempDir, ConfigManager) {
    let dir = TempDir::new().unwrap();
    let config = ConfigManager::with_path(dir.path().join("config.json"));
    (dir, config)
}

#[test]
fn test_key_scoping_across_providers() {
    let (_dir, mut config) = workspace();

    config.set_api_key_for_provider("a", "key-a");
    config.set_api_key_for_provider("b", "key-b");

    assert_eq!(config.api_key_for_model("a/m1"), Some("key-a"));
    assert_eq!(config.api_key_for_model("a/m2"), Some("key-a"));
    assert_eq!(config.api_key_for_model("b/m2"), Some("key-b"));

    // Storing a new key for one provider leaves the other untouched.
    config.set_api_key_for_provider("a", "key-a2");
    assert_eq!(config.api_key_for_model("a/m1"), Some("key-a2"));
    assert_eq!(config.api_key_for_model("b/m2"), Some("key-b"));

    // Removal makes every model under that provider keyless.
    config.remove_api_key_for_provider("a");
    assert_eq!(config.api_key_for_model("a/m1"), None);
    assert_eq!(config.api_key_for_model("b/m2"), Some("key-b"));
}

#[test]
fn test_severity_sort_for_display() {
    let mut findings: Vec<Finding> = [
        FindingLevel::Minor,
        FindingLevel::Fatal,
        FindingLevel::NiceToHave,
        FindingLevel::Major,
    ]
    .iter()
    .enumerate()
    .map(|(i, level)| Finding {
        id: i as i64,
        level: *level,
        description: String::new(),
        recommendation: String::new(),
        reference: String::new(),
    })
    .collect();

    schemcheck::sort_findings_for_display(&mut findings);

    let levels: Vec<FindingLevel> = findings.iter().map(|f| f.level).collect();
    assert_eq!(
        levels,
        vec![
            FindingLevel::Fatal,
            FindingLevel::Major,
            FindingLevel::Minor,
            FindingLevel::NiceToHave,
        ]
    );
}

#[test]
fn test_findings_csv_round_trip() {
    let findings = vec![
        Finding {
            id: 1,
            level: FindingLevel::Major,
            description: "Floating input on U2, pin 4".to_string(),
            recommendation: "Tie to GND through a 10k resistor".to_string(),
            reference: "U2".to_string(),
        },
        Finding {
            id: 2,
            level: FindingLevel::BestPractice,
            description: "Net names mix \"VCC\" and \"+3V3\" styles".to_string(),
            recommendation: "Pick one naming convention".to_string(),
            reference: "VCC".to_string(),
        },
    ];

    let csv = report::findings_to_csv(&findings);
    let parsed = report::parse_findings_csv(&csv).unwrap();
    assert_eq!(parsed, findings);
}

#[tokio::test]
async fn test_batch_run_with_partial_keys() {
    // Key stored only for provider "openai"; requesting one model per
    // provider must yield an available list of exactly the keyed one, and
    // a full batch over both must record the keyless model as an error row
    // without stopping the run.
    let (dir, mut config) = workspace();
    config.set_api_key_for_provider("openai", "sk-test");

    let analyzer = MultiModelAnalyzer::new(
        "(export (nets))".to_string(),
        None,
        dir.path().join("outputs"),
        config,
    )
    .unwrap();

    let subset = vec![
        "openai/gpt-4o-mini".to_string(),
        "google/gemini-2.5-flash".to_string(),
    ];
    assert_eq!(
        analyzer.available_models(Some(&subset)),
        vec!["openai/gpt-4o-mini".to_string()]
    );

    // Only run the keyless model so the test stays off the network.
    let models = vec!["google/gemini-2.5-flash".to_string()];
    let batch = analyzer
        .run_analysis(&models, ReportFormat::Csv)
        .await
        .unwrap();

    assert_eq!(batch.runs.len(), 1);
    let error = batch.runs[0].outcome.error().unwrap();
    assert!(error.contains("no API key"));

    let summary = std::fs::read_to_string(&batch.summary_path).unwrap();
    assert_eq!(
        summary
            .lines()
            .filter(|line| line.contains(",ERROR,"))
            .count(),
        1
    );
    assert!(summary.starts_with("Model,Status,"));
}

#[test]
fn test_malformed_config_does_not_panic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "\u{0}\u{1}garbage").unwrap();

    let config = ConfigManager::with_path(path);
    assert_eq!(config.selected_model(), schemcheck::DEFAULT_MODEL);
}

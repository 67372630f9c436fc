//! Findings data model shared by the LLM clients, batch driver, and reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a single finding, in display priority order.
///
/// The derived `Ord` follows that priority: `Fatal` sorts first,
/// `NiceToHave` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FindingLevel {
    Fatal,
    Major,
    Minor,
    #[serde(rename = "Best Practice")]
    BestPractice,
    #[serde(rename = "Nice To Have")]
    NiceToHave,
}

impl FindingLevel {
    /// All levels in display priority order.
    pub const ALL: [FindingLevel; 5] = [
        FindingLevel::Fatal,
        FindingLevel::Major,
        FindingLevel::Minor,
        FindingLevel::BestPractice,
        FindingLevel::NiceToHave,
    ];

    /// Wire/report name, e.g. `"Best Practice"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingLevel::Fatal => "Fatal",
            FindingLevel::Major => "Major",
            FindingLevel::Minor => "Minor",
            FindingLevel::BestPractice => "Best Practice",
            FindingLevel::NiceToHave => "Nice To Have",
        }
    }
}

impl fmt::Display for FindingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingLevel {
    type Err = String;

    /// Case-insensitive; accepts both spaced and underscored forms
    /// ("best practice", "Best_Practice").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', " ");
        match normalized.as_str() {
            "fatal" => Ok(FindingLevel::Fatal),
            "major" => Ok(FindingLevel::Major),
            "minor" => Ok(FindingLevel::Minor),
            "best practice" => Ok(FindingLevel::BestPractice),
            "nice to have" => Ok(FindingLevel::NiceToHave),
            _ => Err(format!("unknown finding level: {}", s)),
        }
    }
}

/// One issue reported by model analysis.
///
/// `id` is assigned by the model and may collide between findings;
/// uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: i64,
    pub level: FindingLevel,
    pub description: String,
    pub recommendation: String,
    /// Component or net the finding refers to.
    pub reference: String,
}

/// Schema the structured-completion response is constrained to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub findings: Vec<Finding>,
}

/// Token accounting for one model invocation, populated best-effort from
/// provider response metadata. Fields a provider does not report stay zero.
/// `total_tokens` is taken as reported and is not validated against the sum
/// of the parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
    pub total_tokens: u64,
    pub response_time_seconds: f64,
}

impl TokenUsage {
    /// One-line human summary for console output.
    pub fn breakdown_text(&self) -> String {
        let mut text = format!(
            "{} tokens ({} in / {} out)",
            self.total_tokens, self.input_tokens, self.output_tokens
        );
        if self.cache_read_input_tokens > 0 || self.cache_creation_input_tokens > 0 {
            text.push_str(&format!(
                ", cache {} read / {} created",
                self.cache_read_input_tokens, self.cache_creation_input_tokens
            ));
        }
        text.push_str(&format!(", {:.2}s", self.response_time_seconds));
        text
    }
}

/// Outcome of one model invocation. Created once, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub findings: Vec<Finding>,
    pub token_usage: TokenUsage,
}

impl AnalysisResult {
    /// Findings per level, indexed in display priority order
    /// (`FindingLevel::ALL`).
    pub fn level_counts(&self) -> [usize; 5] {
        let mut counts = [0usize; 5];
        for finding in &self.findings {
            let idx = FindingLevel::ALL
                .iter()
                .position(|l| *l == finding.level)
                .unwrap_or(0);
            counts[idx] += 1;
        }
        counts
    }
}

/// Stable sort by severity: Fatal first, Nice To Have last. Findings at the
/// same level keep the order the model returned them in.
pub fn sort_findings_for_display(findings: &mut [Finding]) {
    findings.sort_by_key(|f| f.level);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(id: i64, level: FindingLevel) -> Finding {
        Finding {
            id,
            level,
            description: format!("finding {}", id),
            recommendation: "fix it".to_string(),
            reference: format!("U{}", id),
        }
    }

    #[test]
    fn test_display_sort_order() {
        let mut findings = vec![
            finding(1, FindingLevel::Minor),
            finding(2, FindingLevel::Fatal),
            finding(3, FindingLevel::NiceToHave),
            finding(4, FindingLevel::Major),
        ];
        sort_findings_for_display(&mut findings);
        let levels: Vec<_> = findings.iter().map(|f| f.level).collect();
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
    fn test_sort_is_stable_within_level() {
        let mut findings = vec![
            finding(10, FindingLevel::Major),
            finding(20, FindingLevel::Major),
            finding(1, FindingLevel::Fatal),
        ];
        sort_findings_for_display(&mut findings);
        assert_eq!(findings[0].id, 1);
        assert_eq!(findings[1].id, 10);
        assert_eq!(findings[2].id, 20);
    }

    #[test]
    fn test_level_serde_wire_names() {
        let json = serde_json::to_string(&FindingLevel::BestPractice).unwrap();
        assert_eq!(json, "\"Best Practice\"");
        let level: FindingLevel = serde_json::from_str("\"Nice To Have\"").unwrap();
        assert_eq!(level, FindingLevel::NiceToHave);
    }

    #[test]
    fn test_level_from_str_lenient() {
        assert_eq!(
            "best practice".parse::<FindingLevel>().unwrap(),
            FindingLevel::BestPractice
        );
        assert_eq!(
            "Nice_To_Have".parse::<FindingLevel>().unwrap(),
            FindingLevel::NiceToHave
        );
        assert_eq!("FATAL".parse::<FindingLevel>().unwrap(), FindingLevel::Fatal);
        assert!("catastrophic".parse::<FindingLevel>().is_err());
    }

    #[test]
    fn test_findings_schema_round_trip() {
        let json = r#"{"findings":[{"id":1,"level":"Major","description":"Missing decoupling cap","recommendation":"Add 100nF near U1","reference":"U1"}]}"#;
        let parsed: Findings = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.findings.len(), 1);
        assert_eq!(parsed.findings[0].level, FindingLevel::Major);
        let back = serde_json::to_string(&parsed).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn test_level_counts() {
        let result = AnalysisResult {
            findings: vec![
                finding(1, FindingLevel::Fatal),
                finding(2, FindingLevel::Fatal),
                finding(3, FindingLevel::Minor),
            ],
            token_usage: TokenUsage::default(),
        };
        assert_eq!(result.level_counts(), [2, 0, 1, 0, 0]);
    }

    #[test]
    fn test_token_usage_defaults_to_zero() {
        let usage = TokenUsage::default();
        assert_eq!(usage.total_tokens, 0);
        assert_eq!(usage.cache_read_input_tokens, 0);
        assert_eq!(usage.response_time_seconds, 0.0);
    }

    #[test]
    fn test_breakdown_text_mentions_cache_only_when_used() {
        let plain = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
            total_tokens: 150,
            response_time_seconds: 1.5,
            ..Default::default()
        };
        assert!(!plain.breakdown_text().contains("cache"));

        let cached = TokenUsage {
            cache_read_input_tokens: 80,
            ..plain
        };
        assert!(cached.breakdown_text().contains("cache"));
    }
}

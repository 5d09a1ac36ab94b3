//! Core types for narrative analysis

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::models::{CategoryTotal, DataSummary, ProfitTrendPoint};

/// Kinds of analysis that can be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Revenue and expense trends
    Trend,
    /// Overall financial health with a 1-10 score
    Health,
    /// Revenue vs expense comparison
    Comparative,
    /// Risk factors with a 1-10 score
    Risk,
    /// Forward-looking commentary (placeholder projections)
    Forecast,
    /// Free-form analysis driven by a user prompt
    Custom,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Trend => "trend",
            AnalysisKind::Health => "health",
            AnalysisKind::Comparative => "comparative",
            AnalysisKind::Risk => "risk",
            AnalysisKind::Forecast => "forecast",
            AnalysisKind::Custom => "custom",
        }
    }

    pub fn all() -> &'static [AnalysisKind] {
        &[
            AnalysisKind::Trend,
            AnalysisKind::Health,
            AnalysisKind::Comparative,
            AnalysisKind::Risk,
            AnalysisKind::Forecast,
            AnalysisKind::Custom,
        ]
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trend" => Ok(AnalysisKind::Trend),
            "health" | "financial_health" => Ok(AnalysisKind::Health),
            "comparative" => Ok(AnalysisKind::Comparative),
            "risk" | "risk_assessment" => Ok(AnalysisKind::Risk),
            "forecast" => Ok(AnalysisKind::Forecast),
            "custom" => Ok(AnalysisKind::Custom),
            _ => Err(Error::UnsupportedAnalysisKind(s.to_string())),
        }
    }
}

/// Whether the narrative part of an analysis was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeStatus {
    Generated,
    /// Backend absent or failed; numeric outputs are still valid
    Unavailable,
}

impl NarrativeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativeStatus::Generated => "generated",
            NarrativeStatus::Unavailable => "unavailable",
        }
    }
}

impl FromStr for NarrativeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generated" => Ok(NarrativeStatus::Generated),
            "unavailable" => Ok(NarrativeStatus::Unavailable),
            _ => Err(format!("Unknown narrative status: {}", s)),
        }
    }
}

/// Direction of the revenue trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Positive,
    Negative,
}

/// Qualitative grade attached to a margin-derived indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Poor,
    NeedsAttention,
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outlook {
    Positive,
    Cautious,
}

/// Kind-specific numeric and qualitative outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisMetrics {
    Trend {
        revenue_trend: Direction,
        profit_margin: f64,
        transaction_volume: usize,
        profit_trend: Vec<ProfitTrendPoint>,
    },
    Health {
        health_score: f64,
        profitability: Grade,
        /// Distinct categories among the sampled records
        revenue_diversity: usize,
        expense_control: Grade,
    },
    Comparative {
        revenue_expense_ratio: f64,
        profit_margin_category: Grade,
        revenue_by_category: Vec<CategoryTotal>,
        expenses_by_category: Vec<CategoryTotal>,
    },
    Risk {
        risk_score: f64,
        profitability_risk: RiskLevel,
        revenue_volatility: RiskLevel,
        expense_control: Grade,
    },
    Forecast {
        revenue_growth_estimate: String,
        expense_trend: String,
        profit_outlook: Outlook,
    },
    Custom {
        custom_prompt: String,
    },
}

/// Full result of one analysis run, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub kind: AnalysisKind,
    pub summary: DataSummary,
    pub metrics: AnalysisMetrics,
    /// Narrative text from the model, verbatim
    pub insights: Option<String>,
    pub narrative_status: NarrativeStatus,
    /// Why the narrative is unavailable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_error: Option<String>,
    /// Model that produced the narrative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Number of records sampled into the prompt context
    pub context_records: usize,
}

/// An analysis to be persisted
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub dataset_id: i64,
    pub owner: String,
    pub kind: AnalysisKind,
    pub result: AnalysisResult,
    pub prompt: Option<String>,
}

/// A persisted analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: i64,
    pub dataset_id: i64,
    pub owner: String,
    pub kind: AnalysisKind,
    pub status: String,
    pub narrative_status: NarrativeStatus,
    pub result: AnalysisResult,
    pub prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub dataset_id: i64,
    /// Requester; the dataset must belong to them
    pub owner: String,
    pub kind: AnalysisKind,
    #[serde(default)]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub focus_categories: Option<Vec<String>>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl AnalysisRequest {
    pub fn new(dataset_id: i64, owner: &str, kind: AnalysisKind) -> Self {
        Self {
            dataset_id,
            owner: owner.to_string(),
            kind,
            custom_prompt: None,
            focus_categories: None,
            date_from: None,
            date_to: None,
        }
    }

    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.custom_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn with_focus(mut self, focus: Option<Vec<String>>) -> Self {
        self.focus_categories = focus;
        self
    }

    pub fn with_window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }
}

/// What a caller gets back from `AnalysisEngine::run`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub analysis_id: i64,
    pub kind: AnalysisKind,
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
    pub dataset_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_kind_roundtrip() {
        for kind in AnalysisKind::all() {
            assert_eq!(kind.as_str().parse::<AnalysisKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_analysis_kind_aliases() {
        assert_eq!(
            "financial_health".parse::<AnalysisKind>().unwrap(),
            AnalysisKind::Health
        );
        assert_eq!("Risk".parse::<AnalysisKind>().unwrap(), AnalysisKind::Risk);
    }

    #[test]
    fn test_analysis_kind_unsupported() {
        let err = "sentiment".parse::<AnalysisKind>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedAnalysisKind(ref k) if k == "sentiment"));
    }

    #[test]
    fn test_metrics_serialize_tagged() {
        let metrics = AnalysisMetrics::Forecast {
            revenue_growth_estimate: "5-15%".to_string(),
            expense_trend: "stable".to_string(),
            profit_outlook: Outlook::Cautious,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["kind"], "forecast");
        assert_eq!(json["profit_outlook"], "cautious");
    }

    #[test]
    fn test_request_blank_prompt_dropped() {
        let request = AnalysisRequest::new(1, "a@b.c", AnalysisKind::Custom)
            .with_prompt(Some("   ".to_string()));
        assert!(request.custom_prompt.is_none());
    }
}

//! Analysis engine - runs one analysis end to end

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::ai::{AIClient, NarrativeBackend, NarrativeRequest};
use crate::analytics;
use crate::context::build_analysis_context;
use crate::db::{Database, RecordQuery};
use crate::error::{Error, Result};
use crate::prompts::render_prompt;

use super::metrics::compute_metrics;
use super::types::{
    AnalysisKind, AnalysisOutcome, AnalysisRequest, AnalysisResult, NarrativeStatus, NewAnalysis,
};

/// Most recent records pulled for the prompt context (the context keeps fewer)
pub const RECENT_RECORDS_FETCHED: usize = 100;

/// Orchestrates aggregation, prompting and persistence for analyses
pub struct AnalysisEngine {
    db: Database,
    ai: Option<AIClient>,
}

impl AnalysisEngine {
    /// Create an engine; without an AI client narratives are always unavailable
    pub fn new(db: Database, ai: Option<AIClient>) -> Self {
        Self { db, ai }
    }

    pub fn ai(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    /// Run one analysis and persist the result
    ///
    /// Errors only when the dataset is missing or not the requester's, when
    /// a custom analysis has no prompt, or when the store fails. Narrative
    /// failures are recorded in the result instead.
    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome> {
        let dataset = self
            .db
            .get_dataset(request.dataset_id, &request.owner)?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "Dataset {} not found or access denied",
                    request.dataset_id
                ))
            })?;

        let custom_prompt = request
            .custom_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if request.kind == AnalysisKind::Custom && custom_prompt.is_none() {
            return Err(Error::InvalidData(
                "Custom analysis requires a prompt".to_string(),
            ));
        }

        let records = self.db.fetch_records(
            &RecordQuery::new(dataset.id).window(request.date_from, request.date_to),
        )?;
        let summary = analytics::summarize(&records, request.date_from, request.date_to);

        let recent = &records[..records.len().min(RECENT_RECORDS_FETCHED)];
        let context =
            build_analysis_context(summary.clone(), recent, request.focus_categories.clone());

        let metrics = compute_metrics(request.kind, &context, &records, custom_prompt);
        let prompt = render_prompt(request.kind, &context, custom_prompt)?;

        debug!(
            dataset_id = dataset.id,
            kind = %request.kind,
            records = records.len(),
            context_records = context.recent_records.len(),
            prompt_chars = prompt.len(),
            "Prepared analysis"
        );

        let (insights, narrative_status, narrative_error, model) = match &self.ai {
            Some(ai) => match ai.generate(&NarrativeRequest::analyst(prompt)).await {
                Ok(text) => (
                    Some(text),
                    NarrativeStatus::Generated,
                    None,
                    Some(ai.model().to_string()),
                ),
                Err(e) => {
                    warn!(
                        dataset_id = dataset.id,
                        kind = %request.kind,
                        backend = ai.backend_name(),
                        error = %e,
                        "Narrative generation failed"
                    );
                    (
                        None,
                        NarrativeStatus::Unavailable,
                        Some(e.to_string()),
                        Some(ai.model().to_string()),
                    )
                }
            },
            None => (
                None,
                NarrativeStatus::Unavailable,
                Some("No narrative backend configured".to_string()),
                None,
            ),
        };

        let result = AnalysisResult {
            kind: request.kind,
            summary,
            metrics,
            insights,
            narrative_status,
            narrative_error,
            model,
            context_records: context.recent_records.len(),
        };

        let analysis_id = self.db.save_analysis(&NewAnalysis {
            dataset_id: dataset.id,
            owner: request.owner.clone(),
            kind: request.kind,
            result: result.clone(),
            prompt: custom_prompt.map(str::to_string),
        })?;

        let created_at = self
            .db
            .get_analysis(analysis_id, &request.owner)?
            .map(|a| a.created_at)
            .unwrap_or_else(Utc::now);

        info!(
            analysis_id,
            dataset_id = dataset.id,
            kind = %request.kind,
            narrative = narrative_status.as_str(),
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            analysis_id,
            kind: request.kind,
            result,
            created_at,
            dataset_name: dataset.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::analysis::AnalysisMetrics;
    use crate::models::{NewDataset, NewRecord, RecordType};
    use chrono::NaiveDate;

    const OWNER: &str = "owner@example.com";

    fn seeded_db() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let dataset = db
            .create_dataset(
                OWNER,
                &NewDataset {
                    name: "Q1 books".to_string(),
                    description: None,
                    file_path: None,
                },
            )
            .unwrap();

        let rows = [
            ("2024-01-01", RecordType::Revenue, 1000.0, "Sales"),
            ("2024-01-01", RecordType::Expense, 400.0, "Rent"),
            ("2024-01-02", RecordType::Revenue, 500.0, "Sales"),
        ];
        for (date, record_type, amount, category) in rows {
            db.insert_record(
                dataset.id,
                &NewRecord {
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap(),
                    category: Some(category.to_string()),
                    amount,
                    description: None,
                    record_type,
                    import_hash: None,
                },
            )
            .unwrap();
        }
        (db, dataset.id)
    }

    #[tokio::test]
    async fn test_run_with_mock_backend() {
        let (db, dataset_id) = seeded_db();
        let engine = AnalysisEngine::new(db.clone(), Some(AIClient::mock()));

        let outcome = engine
            .run(&AnalysisRequest::new(dataset_id, OWNER, AnalysisKind::Health))
            .await
            .unwrap();

        assert_eq!(outcome.dataset_name, "Q1 books");
        assert_eq!(outcome.kind, AnalysisKind::Health);
        assert_eq!(outcome.result.narrative_status, NarrativeStatus::Generated);
        assert!(outcome.result.insights.is_some());
        assert_eq!(outcome.result.summary.total_revenue, 1500.0);
        assert_eq!(outcome.result.context_records, 3);

        let stored = db.get_analysis(outcome.analysis_id, OWNER).unwrap().unwrap();
        assert_eq!(stored.result, outcome.result);
    }

    #[tokio::test]
    async fn test_run_without_backend_keeps_numbers() {
        let (db, dataset_id) = seeded_db();
        let engine = AnalysisEngine::new(db, None);

        let outcome = engine
            .run(&AnalysisRequest::new(dataset_id, OWNER, AnalysisKind::Risk))
            .await
            .unwrap();

        assert_eq!(outcome.result.narrative_status, NarrativeStatus::Unavailable);
        assert!(outcome.result.insights.is_none());
        assert!(outcome.result.narrative_error.is_some());
        match outcome.result.metrics {
            // margin 73% (-2), revenue < 50k (+1)
            AnalysisMetrics::Risk { risk_score, .. } => assert_eq!(risk_score, 4.0),
            other => panic!("unexpected metrics {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_with_failing_backend() {
        let (db, dataset_id) = seeded_db();
        let engine = AnalysisEngine::new(
            db,
            Some(AIClient::Mock(MockBackend::failing("rate limited"))),
        );

        let outcome = engine
            .run(&AnalysisRequest::new(dataset_id, OWNER, AnalysisKind::Trend))
            .await
            .unwrap();

        assert_eq!(outcome.result.narrative_status, NarrativeStatus::Unavailable);
        assert!(outcome
            .result
            .narrative_error
            .as_deref()
            .unwrap()
            .contains("rate limited"));
    }

    #[tokio::test]
    async fn test_run_rejects_foreign_dataset() {
        let (db, dataset_id) = seeded_db();
        let engine = AnalysisEngine::new(db.clone(), Some(AIClient::mock()));

        let err = engine
            .run(&AnalysisRequest::new(dataset_id, "intruder@example.com", AnalysisKind::Trend))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(db.list_analyses(OWNER, None, None, 50).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_custom_requires_prompt() {
        let (db, dataset_id) = seeded_db();
        let engine = AnalysisEngine::new(db, Some(AIClient::mock()));

        let err = engine
            .run(&AnalysisRequest::new(dataset_id, OWNER, AnalysisKind::Custom))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let outcome = engine
            .run(
                &AnalysisRequest::new(dataset_id, OWNER, AnalysisKind::Custom)
                    .with_prompt(Some("Which category grew fastest?".to_string())),
            )
            .await
            .unwrap();
        assert_eq!(
            outcome.result.metrics,
            AnalysisMetrics::Custom {
                custom_prompt: "Which category grew fastest?".to_string()
            }
        );
    }
}

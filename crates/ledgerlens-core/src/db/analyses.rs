//! Persisted analysis results

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::analysis::{AnalysisKind, NarrativeStatus, NewAnalysis, StoredAnalysis};
use crate::error::Result;

/// Default page size for analysis history
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Analyses always complete once the numbers are computed
const STATUS_COMPLETED: &str = "completed";

const ANALYSIS_COLUMNS: &str =
    "id, dataset_id, owner, analysis_type, status, narrative_status, result, prompt, created_at";

impl Database {
    /// Store an analysis result and return its id
    pub fn save_analysis(&self, analysis: &NewAnalysis) -> Result<i64> {
        let conn = self.conn()?;
        let result_json = serde_json::to_string(&analysis.result)?;

        conn.execute(
            r#"
            INSERT INTO analyses (dataset_id, owner, analysis_type, status, narrative_status, result, prompt)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                analysis.dataset_id,
                analysis.owner,
                analysis.kind.as_str(),
                STATUS_COMPLETED,
                analysis.result.narrative_status.as_str(),
                result_json,
                analysis.prompt,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get one of the owner's analyses
    pub fn get_analysis(&self, id: i64, owner: &str) -> Result<Option<StoredAnalysis>> {
        let conn = self.conn()?;
        let analysis = conn
            .query_row(
                &format!(
                    "SELECT {} FROM analyses WHERE id = ? AND owner = ?",
                    ANALYSIS_COLUMNS
                ),
                params![id, owner],
                Self::row_to_analysis,
            )
            .optional()?;

        Ok(analysis)
    }

    /// Analysis history for an owner, newest first
    pub fn list_analyses(
        &self,
        owner: &str,
        dataset_id: Option<i64>,
        kind: Option<AnalysisKind>,
        limit: i64,
    ) -> Result<Vec<StoredAnalysis>> {
        let conn = self.conn()?;

        let mut sql = format!("SELECT {} FROM analyses WHERE owner = ?", ANALYSIS_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner.to_string())];

        if let Some(dataset_id) = dataset_id {
            sql.push_str(" AND dataset_id = ?");
            params.push(Box::new(dataset_id));
        }
        if let Some(kind) = kind {
            sql.push_str(" AND analysis_type = ?");
            params.push(Box::new(kind.as_str()));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
        params.push(Box::new(limit));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let analyses = stmt
            .query_map(params_refs.as_slice(), Self::row_to_analysis)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(analyses)
    }

    /// Column order: id, dataset_id, owner, analysis_type, status, narrative_status,
    ///               result, prompt, created_at
    fn row_to_analysis(row: &rusqlite::Row) -> rusqlite::Result<StoredAnalysis> {
        let conversion = |idx: usize, e: Box<dyn std::error::Error + Send + Sync>| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e)
        };

        let kind_str: String = row.get(3)?;
        let narrative_str: String = row.get(5)?;
        let result_json: String = row.get(6)?;
        let created_at: String = row.get(8)?;

        Ok(StoredAnalysis {
            id: row.get(0)?,
            dataset_id: row.get(1)?,
            owner: row.get(2)?,
            kind: kind_str
                .parse::<AnalysisKind>()
                .map_err(|e| conversion(3, Box::new(e)))?,
            status: row.get(4)?,
            narrative_status: narrative_str
                .parse::<NarrativeStatus>()
                .map_err(|e| conversion(5, e.into()))?,
            result: serde_json::from_str(&result_json).map_err(|e| conversion(6, Box::new(e)))?,
            prompt: row.get(7)?,
            created_at: parse_datetime(&created_at),
        })
    }
}

//! Dataset operations
//!
//! Every read and write is scoped by owner: a dataset owned by someone else
//! behaves exactly like one that does not exist.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Dataset, DatasetUpdate, NewDataset};

const DATASET_COLUMNS: &str = "id, name, description, owner, file_path, created_at, updated_at";

impl Database {
    /// Create a dataset for an owner and return it
    pub fn create_dataset(&self, owner: &str, dataset: &NewDataset) -> Result<Dataset> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO datasets (name, description, owner, file_path) VALUES (?, ?, ?, ?)",
            params![dataset.name, dataset.description, owner, dataset.file_path],
        )?;
        let id = conn.last_insert_rowid();
        debug!(dataset_id = id, owner, "Created dataset");

        let created = conn.query_row(
            &format!("SELECT {} FROM datasets WHERE id = ?", DATASET_COLUMNS),
            params![id],
            Self::row_to_dataset,
        )?;
        Ok(created)
    }

    /// List an owner's datasets, newest first
    pub fn list_datasets(&self, owner: &str, skip: i64, limit: i64) -> Result<Vec<Dataset>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM datasets WHERE owner = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            DATASET_COLUMNS
        ))?;

        let datasets = stmt
            .query_map(params![owner, limit, skip], Self::row_to_dataset)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(datasets)
    }

    /// Get a dataset if it exists and belongs to the owner
    pub fn get_dataset(&self, id: i64, owner: &str) -> Result<Option<Dataset>> {
        let conn = self.conn()?;
        let dataset = conn
            .query_row(
                &format!(
                    "SELECT {} FROM datasets WHERE id = ? AND owner = ?",
                    DATASET_COLUMNS
                ),
                params![id, owner],
                Self::row_to_dataset,
            )
            .optional()?;

        Ok(dataset)
    }

    /// Apply a partial update; returns None when the dataset is not the owner's
    pub fn update_dataset(
        &self,
        id: i64,
        owner: &str,
        update: &DatasetUpdate,
    ) -> Result<Option<Dataset>> {
        let conn = self.conn()?;

        let changed = conn.execute(
            r#"
            UPDATE datasets SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                file_path = COALESCE(?, file_path),
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND owner = ?
            "#,
            params![update.name, update.description, update.file_path, id, owner],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        drop(conn);

        self.get_dataset(id, owner)
    }

    /// Delete a dataset and (by cascade) its records and analyses
    pub fn delete_dataset(&self, id: i64, owner: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM datasets WHERE id = ? AND owner = ?",
            params![id, owner],
        )?;
        Ok(deleted > 0)
    }

    /// Column order: id, name, description, owner, file_path, created_at, updated_at
    fn row_to_dataset(row: &rusqlite::Row) -> rusqlite::Result<Dataset> {
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;
        Ok(Dataset {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            owner: row.get(3)?,
            file_path: row.get(4)?,
            created_at: parse_datetime(&created_at),
            updated_at: parse_datetime(&updated_at),
        })
    }
}

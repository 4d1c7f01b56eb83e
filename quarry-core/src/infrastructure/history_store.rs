// quarry-core/src/infrastructure/history_store.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::domain::history::{HistoryEntry, QueryHistory};
use crate::infrastructure::error::InfrastructureError;

/// Permanent query history, one list per database, kept as a JSON file:
/// `{ "<database>": [ { "query": ..., "executed_at": ... }, ... ] }`.
pub struct HistoryStore {
    path: PathBuf,
    books: BTreeMap<String, QueryHistory>,
}

impl HistoryStore {
    /// Loads the file; a missing file is an empty store.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InfrastructureError> {
        let path = path.as_ref().to_path_buf();
        let mut books = BTreeMap::new();

        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let raw: BTreeMap<String, Vec<HistoryEntry>> = serde_json::from_str(&content)?;
            for (database, entries) in raw {
                books.insert(database, QueryHistory::from_entries(entries));
            }
            debug!(databases = books.len(), "Query history loaded");
        }

        Ok(Self { path, books })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Detaches the history of `database` (empty when unknown), e.g. to hand it to a workspace.
    pub fn take(&mut self, database: &str) -> QueryHistory {
        self.books.remove(database).unwrap_or_default()
    }

    pub fn get(&self, database: &str) -> Option<&QueryHistory> {
        self.books.get(database)
    }

    pub fn put(&mut self, database: &str, history: QueryHistory) {
        self.books.insert(database.to_string(), history);
    }

    pub fn save(&self) -> Result<(), InfrastructureError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let raw: BTreeMap<&str, &[HistoryEntry]> = self
            .books
            .iter()
            .map(|(db, history)| (db.as_str(), history.entries()))
            .collect();
        fs::write(&self.path, serde_json::to_string_pretty(&raw)?)?;
        info!(path = %self.path.display(), "💾 Query history saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_missing_file_is_empty_store() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let mut store = HistoryStore::open(tmp.path().join("query_history.json"))?;
        assert!(store.get("shop").is_none());
        assert!(store.take("shop").entries().is_empty());
        Ok(())
    }

    #[test]
    fn test_history_survives_reopen_per_database() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("nested").join("query_history.json");

        let mut store = HistoryStore::open(&path)?;
        let mut shop = store.take("shop");
        shop.record("SELECT * FROM orders");
        shop.record("select * from ORDERS");
        store.put("shop", shop);
        let mut logs = QueryHistory::new();
        logs.record(r#"{"level": "error"}"#);
        store.put("logs", logs);
        store.save()?;

        let reopened = HistoryStore::open(&path)?;
        let shop = reopened.get("shop").map(|h| h.entries().len());
        assert_eq!(shop, Some(1));
        let logs: Vec<_> = reopened
            .get("logs")
            .map(|h| h.search("ERROR", 10).into_iter().map(|e| e.query.clone()).collect())
            .unwrap_or_default();
        assert_eq!(logs, vec![r#"{"level": "error"}"#.to_string()]);
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_reported() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("query_history.json");
        fs::write(&path, "not json")?;
        assert!(matches!(
            HistoryStore::open(&path),
            Err(InfrastructureError::Json(_))
        ));
        Ok(())
    }
}

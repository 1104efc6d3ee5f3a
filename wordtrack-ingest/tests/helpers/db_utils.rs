//! Database Test Utilities

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tempfile::TempDir;
use wordtrack_common::db::{init_database, NewWord, Provenance, WordEntry, WordId};
use wordtrack_common::Error;
use wordtrack_ingest::db::{SqliteWordStore, WordStore};

/// Create a word store on a temporary database file
///
/// Returns (TempDir, store) - TempDir must be kept alive for duration of test
pub async fn create_test_store() -> Result<(TempDir, SqliteWordStore)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_wordtrack.db");
    let pool = init_database(&db_path).await?;
    Ok((temp_dir, SqliteWordStore::new(pool)))
}

/// Store that fails every pipeline call for selected words
///
/// Everything else is delegated to a real SQLite store.
pub struct FlakyStore {
    inner: SqliteWordStore,
    poisoned: HashSet<String>,
}

impl FlakyStore {
    pub fn new(inner: SqliteWordStore, poisoned: &[&str]) -> Self {
        Self {
            inner,
            poisoned: poisoned.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn check(&self, word: &str) -> wordtrack_common::Result<()> {
        if self.poisoned.contains(word) {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WordStore for FlakyStore {
    async fn lookup(&self, word: &str) -> wordtrack_common::Result<Option<WordEntry>> {
        self.check(word)?;
        self.inner.lookup(word).await
    }

    async fn insert_if_absent(&self, word: &NewWord) -> wordtrack_common::Result<(WordId, bool)> {
        self.check(&word.word)?;
        self.inner.insert_if_absent(word).await
    }

    async fn increment_usage(&self, id: WordId) -> wordtrack_common::Result<()> {
        self.inner.increment_usage(id).await
    }

    async fn increment_usage_with_provenance(
        &self,
        id: WordId,
        provenance: &Provenance,
    ) -> wordtrack_common::Result<()> {
        self.inner.increment_usage_with_provenance(id, provenance).await
    }

    async fn set_favorite(&self, id: WordId, favorite: bool) -> wordtrack_common::Result<()> {
        self.inner.set_favorite(id, favorite).await
    }

    async fn delete(&self, id: WordId) -> wordtrack_common::Result<()> {
        self.inner.delete(id).await
    }

    async fn delete_all(&self) -> wordtrack_common::Result<u64> {
        self.inner.delete_all().await
    }

    async fn get(&self, id: WordId) -> wordtrack_common::Result<Option<WordEntry>> {
        self.inner.get(id).await
    }

    async fn list_all(&self) -> wordtrack_common::Result<Vec<WordEntry>> {
        self.inner.list_all().await
    }

    async fn search(&self, query: &str) -> wordtrack_common::Result<Vec<WordEntry>> {
        self.inner.search(query).await
    }

    async fn favorites(&self) -> wordtrack_common::Result<Vec<WordEntry>> {
        self.inner.favorites().await
    }

    async fn recent(&self, limit: u32) -> wordtrack_common::Result<Vec<WordEntry>> {
        self.inner.recent(limit).await
    }

    async fn count(&self) -> wordtrack_common::Result<i64> {
        self.inner.count().await
    }
}

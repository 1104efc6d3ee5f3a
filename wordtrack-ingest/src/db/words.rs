//! Word store
//!
//! Persistent keyed store of [`WordEntry`] rows. The UNIQUE constraint on
//! `words.word` is the only correctness mechanism for concurrent first
//! observations: [`WordStore::insert_if_absent`] turns a conflict into a
//! no-op instead of an error.
//!
//! Each method issues exactly one write statement, so an operation is either
//! fully applied or not applied at all, even if the calling task is
//! cancelled mid-await.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use wordtrack_common::db::{Enrichment, NewWord, Provenance, WordEntry, WordId};
use wordtrack_common::{Error, Result};

/// Default page size for [`WordStore::recent`]
pub const RECENT_LIMIT: u32 = 50;

const SELECT_COLUMNS: &str = r#"
    SELECT id, word, definition, pronunciation, part_of_speech,
           source_app, copied_text, date_added, is_favorite, usage_count
    FROM words
"#;

/// Word persistence contract
///
/// The pipeline only uses `lookup`, `insert_if_absent` and the increment
/// methods. Favorites, deletion and the query surface serve the
/// presentation layer.
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Find a word by canonical text
    async fn lookup(&self, word: &str) -> Result<Option<WordEntry>>;

    /// Insert unless the canonical text already exists
    ///
    /// Returns the row id and whether this call created it. On conflict the
    /// existing row is left untouched and its id is returned.
    async fn insert_if_absent(&self, word: &NewWord) -> Result<(WordId, bool)>;

    /// Add one to the usage count
    async fn increment_usage(&self, id: WordId) -> Result<()>;

    /// Add one to the usage count and overwrite provenance, atomically
    async fn increment_usage_with_provenance(
        &self,
        id: WordId,
        provenance: &Provenance,
    ) -> Result<()>;

    async fn set_favorite(&self, id: WordId, favorite: bool) -> Result<()>;

    async fn delete(&self, id: WordId) -> Result<()>;

    /// Remove every word, returning how many rows were deleted
    async fn delete_all(&self) -> Result<u64>;

    async fn get(&self, id: WordId) -> Result<Option<WordEntry>>;

    /// All words, newest first
    async fn list_all(&self) -> Result<Vec<WordEntry>>;

    /// Case-insensitive substring match on word or definition, newest first
    async fn search(&self, query: &str) -> Result<Vec<WordEntry>>;

    /// Favorite words, newest first
    async fn favorites(&self) -> Result<Vec<WordEntry>>;

    /// Most recently added words
    async fn recent(&self, limit: u32) -> Result<Vec<WordEntry>>;

    async fn count(&self) -> Result<i64>;
}

/// SQLite-backed [`WordStore`]
#[derive(Clone)]
pub struct SqliteWordStore {
    pool: SqlitePool,
}

impl SqliteWordStore {
    /// Wrap a pool whose schema was created by `init_database`
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<WordEntry> {
    Ok(WordEntry {
        id: row.try_get("id")?,
        word: row.try_get("word")?,
        enrichment: Enrichment {
            definition: row.try_get("definition")?,
            pronunciation: row.try_get("pronunciation")?,
            part_of_speech: row.try_get("part_of_speech")?,
        },
        provenance: Provenance {
            source_app: row.try_get("source_app")?,
            copied_text: row.try_get("copied_text")?,
        },
        date_added: row.try_get("date_added")?,
        is_favorite: row.try_get("is_favorite")?,
        usage_count: row.try_get("usage_count")?,
    })
}

fn rows_to_entries(rows: &[SqliteRow]) -> Result<Vec<WordEntry>> {
    rows.iter().map(row_to_entry).collect()
}

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn expect_one_row(rows_affected: u64, id: WordId) -> Result<()> {
    if rows_affected == 0 {
        Err(Error::WordNotFound(id))
    } else {
        Ok(())
    }
}

#[async_trait]
impl WordStore for SqliteWordStore {
    async fn lookup(&self, word: &str) -> Result<Option<WordEntry>> {
        let row = sqlx::query(&format!("{} WHERE word = ?", SELECT_COLUMNS))
            .bind(word)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn insert_if_absent(&self, word: &NewWord) -> Result<(WordId, bool)> {
        let result = sqlx::query(
            r#"
            INSERT INTO words (
                word, definition, pronunciation, part_of_speech,
                source_app, copied_text, date_added, is_favorite, usage_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, 1)
            ON CONFLICT(word) DO NOTHING
            "#,
        )
        .bind(&word.word)
        .bind(&word.enrichment.definition)
        .bind(&word.enrichment.pronunciation)
        .bind(&word.enrichment.part_of_speech)
        .bind(&word.provenance.source_app)
        .bind(&word.provenance.copied_text)
        .bind(word.date_added)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok((result.last_insert_rowid(), true));
        }

        // Lost the race: report the row that won
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM words WHERE word = ?")
            .bind(&word.word)
            .fetch_optional(&self.pool)
            .await?;

        match existing {
            Some(id) => Ok((id, false)),
            None => Err(Error::WordVanished(word.word.clone())),
        }
    }

    async fn increment_usage(&self, id: WordId) -> Result<()> {
        let result = sqlx::query("UPDATE words SET usage_count = usage_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected(), id)
    }

    async fn increment_usage_with_provenance(
        &self,
        id: WordId,
        provenance: &Provenance,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE words
            SET usage_count = usage_count + 1,
                source_app = ?,
                copied_text = ?
            WHERE id = ?
            "#,
        )
        .bind(&provenance.source_app)
        .bind(&provenance.copied_text)
        .bind(id)
        .execute(&self.pool)
        .await?;

        expect_one_row(result.rows_affected(), id)
    }

    async fn set_favorite(&self, id: WordId, favorite: bool) -> Result<()> {
        let result = sqlx::query("UPDATE words SET is_favorite = ? WHERE id = ?")
            .bind(favorite)
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected(), id)
    }

    async fn delete(&self, id: WordId) -> Result<()> {
        let result = sqlx::query("DELETE FROM words WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        expect_one_row(result.rows_affected(), id)
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM words")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn get(&self, id: WordId) -> Result<Option<WordEntry>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    async fn list_all(&self) -> Result<Vec<WordEntry>> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY date_added DESC, id DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows_to_entries(&rows)
    }

    async fn search(&self, query: &str) -> Result<Vec<WordEntry>> {
        let pattern = like_pattern(query);
        let rows = sqlx::query(&format!(
            r#"{} WHERE word LIKE ?1 ESCAPE '\' OR definition LIKE ?1 ESCAPE '\'
               ORDER BY date_added DESC, id DESC"#,
            SELECT_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows_to_entries(&rows)
    }

    async fn favorites(&self) -> Result<Vec<WordEntry>> {
        let rows = sqlx::query(&format!(
            "{} WHERE is_favorite = 1 ORDER BY date_added DESC, id DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows_to_entries(&rows)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<WordEntry>> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY date_added DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows_to_entries(&rows)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

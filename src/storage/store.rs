//! Metadata store
//!
//! All reads and writes go through one `Mutex<Connection>`, which is the
//! single serialization point the watcher callbacks and foreground walks
//! share. Rows are replaced wholesale on upsert; `composite_text` and
//! `attributes` are always rebuilt by the caller, never patched.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};

use crate::error::{MetaError, Result};
use crate::meta::{format_timestamp, FileMetadata};
use crate::query::Predicate;
use crate::storage::{DirectoryStatus, FileRecord};

/// Fixed cap on search results.
pub const RESULT_CAP: usize = 20;

const RECORD_COLUMNS: &str =
    "path, name, size_bytes, created, modified, extension, composite_text, attributes";

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = crate::storage::connection::open_connection(db_path)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = crate::storage::connection::open_in_memory()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MetaError::State("Poisoned lock".into()))
    }

    /// Insert or replace the record for `meta.path`. Every column is
    /// rewritten; a re-indexed file keeps its original insertion order.
    pub fn upsert(&self, meta: &FileMetadata) -> Result<()> {
        let composite_text = meta.composite_text();
        let attributes = serde_json::to_string(meta)
            .map_err(|e| MetaError::State(format!("Unserializable metadata: {}", e)))?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO files (path, name, size_bytes, created, modified, extension, composite_text, attributes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(path) DO UPDATE SET
                 name = excluded.name,
                 size_bytes = excluded.size_bytes,
                 created = excluded.created,
                 modified = excluded.modified,
                 extension = excluded.extension,
                 composite_text = excluded.composite_text,
                 attributes = excluded.attributes",
            params![
                meta.path,
                meta.name,
                meta.size_bytes,
                meta.created,
                meta.modified,
                meta.extension,
                composite_text,
                attributes
            ],
        )?;

        tracing::debug!("Upserted record: {}", meta.path);
        Ok(())
    }

    /// Remove the row for a path. Deleting an absent path is a no-op.
    pub fn delete(&self, path: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM files WHERE path = ?1", params![path])?;
        tracing::debug!("Deleted record: {} (rows affected: {})", path, rows);
        Ok(rows > 0)
    }

    /// Full attribute set for a path, or None when it was never indexed.
    pub fn get(&self, path: &str) -> Result<Option<FileMetadata>> {
        let conn = self.lock()?;
        let result = conn.query_row(
            "SELECT attributes FROM files WHERE path = ?1",
            params![path],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(json) => {
                let meta = serde_json::from_str(&json)
                    .map_err(|e| MetaError::State(format!("Corrupt attributes row: {}", e)))?;
                Ok(Some(meta))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(MetaError::Database(e)),
        }
    }

    /// Records matching the AND of all predicates, in insertion order,
    /// truncated to `limit`. An empty predicate list matches everything.
    pub fn scan(&self, predicates: &[Predicate], limit: usize) -> Result<Vec<FileRecord>> {
        let (where_clause, mut values) = build_where(predicates);
        values.push(SqlValue::Integer(limit as i64));

        let sql = format!(
            "SELECT {} FROM files WHERE {} ORDER BY id LIMIT ?",
            RECORD_COLUMNS, where_clause
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok(FileRecord {
                path: row.get(0)?,
                name: row.get(1)?,
                size_bytes: row.get(2)?,
                created: row.get(3)?,
                modified: row.get(4)?,
                extension: row.get(5)?,
                composite_text: row.get(6)?,
                attributes: row.get(7)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn file_count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get::<_, u64>(0))?;
        Ok(count)
    }

    /// Write a ledger entry for a root. Insert-or-replace; called only at
    /// walk completion, so an interrupted walk leaves no trace here.
    pub fn upsert_directory(&self, path: &str, status: DirectoryStatus) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO directories (path, status, last_indexed_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(path) DO UPDATE SET
                 status = excluded.status,
                 last_indexed_at = excluded.last_indexed_at",
            params![path, status.as_str(), format_timestamp(SystemTime::now())],
        )?;
        tracing::debug!("Ledger: {} -> {}", path, status.as_str());
        Ok(())
    }

    /// Roots whose last full walk completed. The ledger is the sole source
    /// of truth for this; file rows are never used to infer completeness.
    pub fn completed_directories(&self) -> Result<HashSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT path FROM directories WHERE status = ?1")?;
        let rows = stmt.query_map(params![DirectoryStatus::Completed.as_str()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut paths = HashSet::new();
        for row in rows {
            paths.insert(row?);
        }
        Ok(paths)
    }
}

/// Translate predicates into a WHERE clause plus bind values.
///
/// The mapping mirrors the query DSL contract: numeric comparison for size
/// ranges, lexicographic comparison for timestamp ranges (valid because the
/// ISO-8601 strings sort chronologically), and substring containment for
/// everything else. Field names reaching SQL text are restricted to the
/// fixed column set; attacker-controlled values only ever travel as binds.
fn build_where(predicates: &[Predicate]) -> (String, Vec<SqlValue>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();

    for predicate in predicates {
        match predicate {
            Predicate::Range { field, low, high, clause } => match field.as_str() {
                "size_bytes" => {
                    // Bounds were validated by the compiler; a bound that
                    // still fails to parse matches as text like any other
                    // uninterpreted range clause.
                    match (low.parse::<f64>(), high.as_deref().map(str::parse::<f64>)) {
                        (Ok(lo), None) => {
                            clauses.push("size_bytes >= ?".into());
                            values.push(SqlValue::Real(lo));
                        }
                        (Ok(lo), Some(Ok(hi))) => {
                            clauses.push("size_bytes BETWEEN ? AND ?".into());
                            values.push(SqlValue::Real(lo));
                            values.push(SqlValue::Real(hi));
                        }
                        _ => {
                            clauses.push("composite_text LIKE ?".into());
                            values.push(like(clause));
                        }
                    }
                }
                "created" | "modified" => match high {
                    Some(hi) => {
                        clauses.push(format!("{} BETWEEN ? AND ?", field));
                        values.push(SqlValue::Text(low.clone()));
                        values.push(SqlValue::Text(hi.clone()));
                    }
                    None => {
                        clauses.push(format!("{} >= ?", field));
                        values.push(SqlValue::Text(low.clone()));
                    }
                },
                // Range syntax on a non-schema field is not interpreted,
                // only text-matched against the literal clause.
                _ => {
                    clauses.push("composite_text LIKE ?".into());
                    values.push(like(clause));
                }
            },
            Predicate::FieldMatch { field, value, direct } => {
                if *direct {
                    clauses.push(format!("{} LIKE ?", field));
                    values.push(like(value));
                } else {
                    clauses.push("composite_text LIKE ?".into());
                    values.push(like(&format!("{}:{}", field, value)));
                }
            }
            Predicate::FreeText { value } => {
                clauses.push("(name LIKE ? OR composite_text LIKE ?)".into());
                values.push(like(value));
                values.push(like(value));
            }
        }
    }

    let where_clause = if clauses.is_empty() {
        "1".to_string()
    } else {
        clauses.join(" AND ")
    };
    (where_clause, values)
}

fn like(value: &str) -> SqlValue {
    SqlValue::Text(format!("%{}%", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compile;
    use serde_json::Value;

    fn record(path: &str, size: u64) -> FileMetadata {
        let mut meta = FileMetadata::placeholder(Path::new(path));
        meta.size_bytes = size;
        meta.created = "2024-03-01T10:00:00.000000".into();
        meta.modified = "2024-03-02T10:00:00.000000".into();
        meta
    }

    fn store_with_sizes() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.upsert(&record("/data/small.txt", 1_048_576)).unwrap();
        store.upsert(&record("/data/medium.txt", 5_242_880)).unwrap();
        store.upsert(&record("/data/large.txt", 10_485_760)).unwrap();
        store
    }

    fn paths(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let mut meta = record("/data/a.txt", 10);
        store.upsert(&meta).unwrap();

        meta.size_bytes = 99;
        meta.content = "second payload".into();
        store.upsert(&meta).unwrap();

        assert_eq!(store.file_count().unwrap(), 1);
        let got = store.get("/data/a.txt").unwrap().unwrap();
        assert_eq!(got.size_bytes, 99);
        assert_eq!(got.content, "second payload");
    }

    #[test]
    fn test_upsert_preserves_insertion_order() {
        let store = store_with_sizes();
        // Re-upserting the first record must not move it to the end.
        store.upsert(&record("/data/small.txt", 2_048)).unwrap();

        let all = store.scan(&[], RESULT_CAP).unwrap();
        assert_eq!(
            paths(&all),
            vec!["/data/small.txt", "/data/medium.txt", "/data/large.txt"]
        );
    }

    #[test]
    fn test_delete_then_gone() {
        let store = store_with_sizes();
        assert!(store.delete("/data/medium.txt").unwrap());
        assert!(store.get("/data/medium.txt").unwrap().is_none());

        let all = store.scan(&[], RESULT_CAP).unwrap();
        assert!(!paths(&all).contains(&"/data/medium.txt"));

        // Absent path: no-op, not an error.
        assert!(!store.delete("/data/medium.txt").unwrap());
    }

    #[test]
    fn test_size_range_open_upper_bound() {
        let store = store_with_sizes();
        let results = store
            .scan(&compile("size_bytes:[5242880 TO ]"), RESULT_CAP)
            .unwrap();
        assert_eq!(paths(&results), vec!["/data/medium.txt", "/data/large.txt"]);
    }

    #[test]
    fn test_size_range_closed() {
        let store = store_with_sizes();
        let results = store
            .scan(&compile("size_bytes:[0 TO 5242880]"), RESULT_CAP)
            .unwrap();
        assert_eq!(paths(&results), vec!["/data/small.txt", "/data/medium.txt"]);
    }

    #[test]
    fn test_date_range_lexicographic() {
        let store = Store::open_in_memory().unwrap();
        let mut old = record("/data/old.txt", 1);
        old.modified = "2023-06-01T00:00:00.000000".into();
        let mut new = record("/data/new.txt", 1);
        new.modified = "2024-06-01T00:00:00.000000".into();
        store.upsert(&old).unwrap();
        store.upsert(&new).unwrap();

        let results = store
            .scan(
                &compile("modified:[2024-01-01T00:00:00 TO 2024-12-31T23:59:59]"),
                RESULT_CAP,
            )
            .unwrap();
        assert_eq!(paths(&results), vec!["/data/new.txt"]);

        let open = store
            .scan(&compile("modified:[2024-01-01T00:00:00 TO ]"), RESULT_CAP)
            .unwrap();
        assert_eq!(paths(&open), vec!["/data/new.txt"]);
    }

    #[test]
    fn test_field_match_direct_column() {
        let store = store_with_sizes();
        let results = store.scan(&compile("extension:\"txt\""), RESULT_CAP).unwrap();
        assert_eq!(results.len(), 3);

        let none = store.scan(&compile("extension:\"pdf\""), RESULT_CAP).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_field_match_routes_non_schema_to_composite() {
        let store = Store::open_in_memory().unwrap();
        let mut tagged = record("/data/paper.pdf", 100);
        tagged
            .extra
            .insert("author".into(), Value::String("Kunal Wagh".into()));
        store.upsert(&tagged).unwrap();
        store.upsert(&record("/data/other.pdf", 100)).unwrap();

        let results = store
            .scan(&compile("author:\"Kunal Wagh\""), RESULT_CAP)
            .unwrap();
        assert_eq!(paths(&results), vec!["/data/paper.pdf"]);
    }

    #[test]
    fn test_free_text_matches_name_or_composite() {
        let store = Store::open_in_memory().unwrap();
        let mut by_content = record("/data/x1.txt", 1);
        by_content.content = "the roadmap draft".into();
        store.upsert(&by_content).unwrap();
        store.upsert(&record("/data/roadmap.txt", 1)).unwrap();
        store.upsert(&record("/data/unrelated.txt", 1)).unwrap();

        let results = store.scan(&compile("roadmap"), RESULT_CAP).unwrap();
        assert_eq!(paths(&results), vec!["/data/x1.txt", "/data/roadmap.txt"]);
    }

    #[test]
    fn test_conjunction_of_predicates() {
        let store = store_with_sizes();
        let results = store
            .scan(&compile("extension:txt AND size_bytes:[2000000 TO 6000000]"), RESULT_CAP)
            .unwrap();
        assert_eq!(paths(&results), vec!["/data/medium.txt"]);
    }

    #[test]
    fn test_scan_limit() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..30 {
            store.upsert(&record(&format!("/data/f{:02}.txt", i), 1)).unwrap();
        }
        let results = store.scan(&[], RESULT_CAP).unwrap();
        assert_eq!(results.len(), RESULT_CAP);
        assert_eq!(results[0].path, "/data/f00.txt");
    }

    #[test]
    fn test_directory_ledger() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.completed_directories().unwrap().is_empty());

        store.upsert_directory("/roots/a", DirectoryStatus::Completed).unwrap();
        store.upsert_directory("/roots/b", DirectoryStatus::Incomplete).unwrap();

        let completed = store.completed_directories().unwrap();
        assert!(completed.contains("/roots/a"));
        assert!(!completed.contains("/roots/b"));

        // Insert-or-replace, not append.
        store.upsert_directory("/roots/b", DirectoryStatus::Completed).unwrap();
        assert_eq!(store.completed_directories().unwrap().len(), 2);
    }

    #[test]
    fn test_range_on_non_schema_field_matches_literal_clause() {
        let store = Store::open_in_memory().unwrap();
        let mut odd = record("/data/odd.txt", 1);
        odd.content = "mentions rating:[3 TO 5] verbatim".into();
        store.upsert(&odd).unwrap();
        store.upsert(&record("/data/plain.txt", 1)).unwrap();

        let results = store.scan(&compile("rating:[3 TO 5]"), RESULT_CAP).unwrap();
        assert_eq!(paths(&results), vec!["/data/odd.txt"]);
    }
}

// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily-run operations.
//!
//! The `(start_time, end_time)` unique index guarantees at most one run
//! row per window, so a cron fire during recovery cannot double-create.

use chrono::{DateTime, Utc};
use recap_core::RecapError;
use rusqlite::{params, OptionalExtension, Row};

use crate::database::Database;
use crate::models::{RunRecord, RunStatus};

const RUN_COLUMNS: &str =
    "id, start_time, end_time, status, error_message, created_at, updated_at";

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let status: String = row.get(3)?;
    let status = status.parse::<RunStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(RunRecord {
        id: row.get(0)?,
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        status,
        error_message: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Fetch the run for `(start, end)`, creating it with `initial_status`
/// if absent. An existing row is returned untouched.
pub async fn get_or_create_run(
    db: &Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    initial_status: RunStatus,
) -> Result<RunRecord, RecapError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {RUN_COLUMNS} FROM daily_runs
                     WHERE start_time = ?1 AND end_time = ?2"
                ))?;
                stmt.query_row(params![start, end], row_to_run).optional()?
            };

            if let Some(run) = existing {
                tx.commit()?;
                return Ok(run);
            }

            tx.execute(
                "INSERT INTO daily_runs (start_time, end_time, status) VALUES (?1, ?2, ?3)",
                params![start, end, initial_status.to_string()],
            )?;
            let id = tx.last_insert_rowid();

            let run = {
                let mut stmt =
                    tx.prepare(&format!("SELECT {RUN_COLUMNS} FROM daily_runs WHERE id = ?1"))?;
                stmt.query_row(params![id], row_to_run)?
            };
            tx.commit()?;
            Ok(run)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the run covering exactly `[start, end)`, if any.
pub async fn get_run_by_range(
    db: &Database,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Option<RunRecord>, RecapError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RUN_COLUMNS} FROM daily_runs
                 WHERE start_time = ?1 AND end_time = ?2"
            ))?;
            Ok(stmt.query_row(params![start, end], row_to_run).optional()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All `pending` or `in_progress` runs, in creation order.
pub async fn list_incomplete_runs(db: &Database) -> Result<Vec<RunRecord>, RecapError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RUN_COLUMNS} FROM daily_runs
                 WHERE status IN ('pending', 'in_progress')
                 ORDER BY created_at, id"
            ))?;
            let rows = stmt.query_map([], row_to_run)?;
            let mut runs = Vec::new();
            for row in rows {
                runs.push(row?);
            }
            Ok(runs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a run completed.
pub async fn mark_run_completed(db: &Database, id: i64) -> Result<(), RecapError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE daily_runs SET status = 'completed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a run failed with an error message.
pub async fn mark_run_failed(db: &Database, id: i64, error: String) -> Result<(), RecapError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE daily_runs SET status = 'failed', error_message = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![error, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn window(day: u32) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 2, day, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, day + 1, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn get_or_create_returns_existing_untouched() {
        let (db, _dir) = setup_db().await;
        let (start, end) = window(10);

        let run = get_or_create_run(&db, start, end, RunStatus::InProgress).await.unwrap();
        assert_eq!(run.status, RunStatus::InProgress);

        mark_run_completed(&db, run.id).await.unwrap();

        // A second get_or_create must not reset the completed status.
        let again = get_or_create_run(&db, start, end, RunStatus::InProgress).await.unwrap();
        assert_eq!(again.id, run.id);
        assert_eq!(again.status, RunStatus::Completed);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_by_range_finds_exact_window_only() {
        let (db, _dir) = setup_db().await;
        let (start, end) = window(10);
        get_or_create_run(&db, start, end, RunStatus::InProgress).await.unwrap();

        assert!(get_run_by_range(&db, start, end).await.unwrap().is_some());
        let (other_start, other_end) = window(11);
        assert!(get_run_by_range(&db, other_start, other_end).await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_incomplete_excludes_terminal_states() {
        let (db, _dir) = setup_db().await;

        let (s1, e1) = window(10);
        let (s2, e2) = window(11);
        let (s3, e3) = window(12);
        let r1 = get_or_create_run(&db, s1, e1, RunStatus::InProgress).await.unwrap();
        let r2 = get_or_create_run(&db, s2, e2, RunStatus::InProgress).await.unwrap();
        let r3 = get_or_create_run(&db, s3, e3, RunStatus::InProgress).await.unwrap();

        mark_run_completed(&db, r1.id).await.unwrap();
        mark_run_failed(&db, r2.id, "query failed".into()).await.unwrap();

        let incomplete = list_incomplete_runs(&db).await.unwrap();
        assert_eq!(incomplete.len(), 1);
        assert_eq!(incomplete[0].id, r3.id);

        let failed = get_run_by_range(&db, s2, e2).await.unwrap().unwrap();
        assert_eq!(failed.status, RunStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some("query failed"));

        db.close().await.unwrap();
    }
}

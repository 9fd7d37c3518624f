// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Summarization task operations.
//!
//! Creation is idempotent against the `(chat_id, start_time, end_time)`
//! unique index; the scheduler relies on that for crash-safe re-entry.

use chrono::{DateTime, Utc};
use recap_core::RecapError;
use rusqlite::{params, OptionalExtension, Row};

use crate::database::Database;
use crate::models::{TaskRecord, TaskStatus};

const TASK_COLUMNS: &str = "id, chat_id, start_time, end_time, status, completed_at, \
                            error_message, summary_content, created_at, updated_at";

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    let status: String = row.get(4)?;
    let status = status.parse::<TaskStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(TaskRecord {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        status,
        completed_at: row.get(5)?,
        error_message: row.get(6)?,
        summary_content: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Fetch the task for `(chat_id, start, end)`, creating it with
/// `initial_status` if absent. Returns the row and whether it was created.
///
/// An existing row is returned untouched regardless of its status.
pub async fn get_or_create_task(
    db: &Database,
    chat_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    initial_status: TaskStatus,
) -> Result<(TaskRecord, bool), RecapError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks
                     WHERE chat_id = ?1 AND start_time = ?2 AND end_time = ?3"
                ))?;
                stmt.query_row(params![chat_id, start, end], row_to_task)
                    .optional()?
            };

            if let Some(task) = existing {
                tx.commit()?;
                return Ok((task, false));
            }

            tx.execute(
                "INSERT INTO tasks (chat_id, start_time, end_time, status)
                 VALUES (?1, ?2, ?3, ?4)",
                params![chat_id, start, end, initial_status.to_string()],
            )?;
            let id = tx.last_insert_rowid();

            let task = {
                let mut stmt =
                    tx.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
                stmt.query_row(params![id], row_to_task)?
            };
            tx.commit()?;
            Ok((task, true))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch a task by id.
pub async fn get_task(db: &Database, id: i64) -> Result<Option<TaskRecord>, RecapError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
            Ok(stmt.query_row(params![id], row_to_task).optional()?)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a task's status, stamping `completed_at` when the status is
/// `completed` and recording `error` when given.
pub async fn update_task_status(
    db: &Database,
    id: i64,
    status: TaskStatus,
    error: Option<String>,
) -> Result<(), RecapError> {
    db.connection()
        .call(move |conn| {
            let completed_at = if status == TaskStatus::Completed {
                Some(Utc::now())
            } else {
                None
            };
            match (&completed_at, &error) {
                (Some(at), _) => {
                    conn.execute(
                        "UPDATE tasks SET status = ?1, completed_at = ?2,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?3",
                        params![status.to_string(), at, id],
                    )?;
                }
                (None, Some(err)) => {
                    conn.execute(
                        "UPDATE tasks SET status = ?1, error_message = ?2,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?3",
                        params![status.to_string(), err, id],
                    )?;
                }
                (None, None) => {
                    conn.execute(
                        "UPDATE tasks SET status = ?1,
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?2",
                        params![status.to_string(), id],
                    )?;
                }
            }
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a task completed.
pub async fn mark_task_completed(db: &Database, id: i64) -> Result<(), RecapError> {
    update_task_status(db, id, TaskStatus::Completed, None).await
}

/// Mark a task failed with an error message.
pub async fn mark_task_failed(db: &Database, id: i64, error: String) -> Result<(), RecapError> {
    update_task_status(db, id, TaskStatus::Failed, Some(error)).await
}

/// Persist the rendered summary awaiting delivery.
pub async fn set_summary_content(
    db: &Database,
    id: i64,
    content: String,
) -> Result<(), RecapError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tasks SET summary_content = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![content, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Clear the pending summary after delivery is acknowledged.
pub async fn clear_summary_content(db: &Database, id: i64) -> Result<(), RecapError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tasks SET summary_content = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reset a task to `pending` for recovery: clears `completed_at` and
/// `error_message` but keeps `summary_content` so a delivery-only retry
/// stays possible.
pub async fn reset_task_to_pending(db: &Database, id: i64) -> Result<(), RecapError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE tasks SET status = 'pending', completed_at = NULL,
                 error_message = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Completed tasks still holding an undelivered summary, in creation
/// order. These are the delivery-exhausted tasks recovery retries
/// without touching their status.
pub async fn list_completed_with_pending_summary(
    db: &Database,
) -> Result<Vec<TaskRecord>, RecapError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE status = 'completed'
                   AND summary_content IS NOT NULL AND summary_content != ''
                 ORDER BY created_at, id"
            ))?;
            let rows = stmt.query_map([], row_to_task)?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All `pending` or `processing` tasks, in creation order.
pub async fn list_pending_or_processing(db: &Database) -> Result<Vec<TaskRecord>, RecapError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE status IN ('pending', 'processing')
                 ORDER BY created_at, id"
            ))?;
            let rows = stmt.query_map([], row_to_task)?;
            let mut tasks = Vec::new();
            for row in rows {
                tasks.push(row?);
            }
            Ok(tasks)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cron-driven daily summarization scheduler.
//!
//! Each fire computes the UTC window `[today_00:00 - range_days,
//! today_00:00)`, creates a durable run row, then drives one task per
//! active chat through two independently retryable phases: summary
//! generation (the expensive, non-idempotent LLM work) and delivery.
//! The rendered summary is persisted on the task before the first
//! delivery attempt, so a crash anywhere in phase B resumes as a
//! delivery-only retry without re-invoking the LLM.
//!
//! Shutdown cancels a single token observed at every sleep and blocking
//! call; a cancelled task stays `processing` and is re-picked by the
//! startup recovery pass.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use cron::Schedule;
use recap_config::{parse_cron_expression, SummaryConfig};
use recap_core::{Notifier, RecapError};
use recap_storage::queries::{messages, runs, tasks};
use recap_storage::{Database, RunStatus, TaskRecord, TaskStatus};
use recap_summarizer::{format_summary, Summarizer};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Delivery gets a fixed, small retry budget: the expensive work is
/// already done and recovery can always retry delivery later.
const DELIVERY_ATTEMPTS: u32 = 2;

/// Unfinished tasks older than this are dropped as stale at recovery.
const STALE_TASK_DAYS: i64 = 7;

/// Cron-triggered driver for daily summarization runs.
pub struct Scheduler {
    db: Database,
    summarizer: Arc<Summarizer>,
    notifier: Arc<dyn Notifier>,
    config: SummaryConfig,
    cancel: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(
        db: Database,
        summarizer: Arc<Summarizer>,
        notifier: Arc<dyn Notifier>,
        config: SummaryConfig,
    ) -> Self {
        Self {
            db,
            summarizer,
            notifier,
            config,
            cancel: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Start the cron loop and the startup recovery pass.
    pub async fn start(self: &Arc<Self>) -> Result<(), RecapError> {
        let schedule = parse_cron_expression(&self.config.cron).map_err(RecapError::Config)?;
        info!(cron = %self.config.cron, "scheduler starting");

        let cron_task = tokio::spawn(Arc::clone(self).run_cron_loop(schedule));
        let recovery_task = {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.run_recovery().await })
        };

        let mut handles = self.handles.lock().await;
        handles.push(cron_task);
        handles.push(recovery_task);
        Ok(())
    }

    /// Fire the cancel signal and wait for the workers to quiesce.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = self.handles.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "scheduler worker panicked");
            }
        }
        info!("scheduler stopped");
    }

    async fn run_cron_loop(self: Arc<Self>, schedule: Schedule) {
        loop {
            let Some(next) = schedule.upcoming(Utc).next() else {
                warn!("cron schedule has no upcoming fire times, stopping");
                return;
            };
            let delay = (next - Utc::now()).to_std().unwrap_or(StdDuration::ZERO);
            debug!(next = %next, "waiting for next cron fire");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    self.run_daily_summary().await;
                }
                _ = self.cancel.cancelled() => {
                    info!("cron loop stopped");
                    return;
                }
            }
        }
    }

    /// The current summarization window: `[today_00:00_utc - range_days,
    /// today_00:00_utc)`.
    fn current_window(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let range_days = if self.config.range_days == 0 {
            1
        } else {
            i64::from(self.config.range_days)
        };
        let end = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
        let start = end - Duration::days(range_days);
        (start, end)
    }

    /// Effective retry policy with the documented defaults for zero values.
    fn retry_policy(&self) -> (u32, StdDuration) {
        let times = if self.config.retry_times == 0 {
            3
        } else {
            self.config.retry_times
        };
        let interval = if self.config.retry_interval == 0 {
            60
        } else {
            self.config.retry_interval
        };
        (times, StdDuration::from_secs(interval))
    }

    /// Sleep for `interval`; returns `false` when cancelled first.
    async fn sleep_or_cancel(&self, interval: StdDuration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(interval) => true,
            _ = self.cancel.cancelled() => false,
        }
    }

    /// Execute one cron-triggered daily run over the current window.
    pub async fn run_daily_summary(&self) {
        if self.cancel.is_cancelled() {
            return;
        }

        let (start, end) = self.current_window();
        let (start_date, end_date) = window_dates(start, end);
        info!(%start_date, %end_date, "starting daily summary run");

        // The run row is created before any querying so a crash at any
        // later point is visible to recovery.
        let run = match runs::get_or_create_run(&self.db, start, end, RunStatus::InProgress).await
        {
            Ok(run) => run,
            Err(e) => {
                error!(error = %e, "failed to get or create daily run");
                return;
            }
        };
        if run.status == RunStatus::Completed {
            info!("daily run for this window already completed, skipping");
            return;
        }

        match self.execute_for_range(start, end).await {
            Ok(()) => {
                if let Err(e) = runs::mark_run_completed(&self.db, run.id).await {
                    error!(error = %e, "failed to mark run completed");
                }
                info!("daily summary run completed");
            }
            Err(e) if e.is_cancelled() => {
                // Left in_progress on purpose; recovery finishes it.
                info!("daily summary run interrupted by shutdown");
            }
            Err(e) => {
                error!(error = %e, "daily summary run failed");
                if let Err(mark_err) = runs::mark_run_failed(&self.db, run.id, e.to_string()).await
                {
                    error!(error = %mark_err, "failed to mark run failed");
                }
            }
        }
    }

    /// The full pipeline for one window: chat discovery, task creation,
    /// task processing, retention sweep.
    async fn execute_for_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), RecapError> {
        let chat_ids = self.query_chat_ids_with_retry(start, end).await?;

        if self.cancel.is_cancelled() {
            return Err(RecapError::Cancelled);
        }

        if chat_ids.is_empty() {
            info!("no messages in window, skipping summarization");
            self.retention_sweep().await;
            return Ok(());
        }
        info!(chats = chat_ids.len(), "found chats to summarize");

        let mut success_count = 0usize;
        let mut fail_count = 0usize;

        let mut to_process: Vec<TaskRecord> = Vec::new();
        for chat_id in chat_ids {
            if self.cancel.is_cancelled() {
                return Err(RecapError::Cancelled);
            }
            match tasks::get_or_create_task(&self.db, chat_id, start, end, TaskStatus::Pending)
                .await
            {
                Ok((task, _)) if task.status == TaskStatus::Completed => success_count += 1,
                Ok((task, _)) => to_process.push(task),
                Err(e) => {
                    error!(chat_id, error = %e, "failed to create task");
                    fail_count += 1;
                }
            }
        }

        for task in to_process {
            if self.cancel.is_cancelled() {
                return Err(RecapError::Cancelled);
            }
            if let Err(e) =
                tasks::update_task_status(&self.db, task.id, TaskStatus::Processing, None).await
            {
                error!(task_id = task.id, error = %e, "failed to mark task processing");
                fail_count += 1;
                continue;
            }
            match self.process_task(&task).await {
                Ok(()) => {
                    if let Err(e) = tasks::mark_task_completed(&self.db, task.id).await {
                        error!(task_id = task.id, error = %e, "failed to mark task completed");
                    } else {
                        success_count += 1;
                    }
                }
                Err(e) if e.is_cancelled() => return Err(RecapError::Cancelled),
                Err(e) => {
                    error!(chat_id = task.chat_id, error = %e, "task processing failed");
                    if let Err(mark_err) =
                        tasks::mark_task_failed(&self.db, task.id, e.to_string()).await
                    {
                        error!(task_id = task.id, error = %mark_err, "failed to mark task failed");
                    }
                    fail_count += 1;
                }
            }
        }

        info!(succeeded = success_count, failed = fail_count, "chat processing finished");

        if self.cancel.is_cancelled() {
            return Err(RecapError::Cancelled);
        }
        self.retention_sweep().await;
        Ok(())
    }

    /// The chat-id discovery query, retried per the configured policy.
    async fn query_chat_ids_with_retry(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<i64>, RecapError> {
        let (retry_times, retry_interval) = self.retry_policy();
        let mut last_err: Option<RecapError> = None;

        for attempt in 1..=retry_times {
            if self.cancel.is_cancelled() {
                return Err(RecapError::Cancelled);
            }
            match messages::list_chat_ids_in(&self.db, start, end).await {
                Ok(ids) => return Ok(ids),
                Err(e) => {
                    warn!(attempt, retry_times, error = %e, "chat-id query failed");
                    last_err = Some(e);
                    if attempt < retry_times && !self.sleep_or_cancel(retry_interval).await {
                        return Err(RecapError::Cancelled);
                    }
                }
            }
        }

        let last = last_err.map(|e| e.to_string()).unwrap_or_default();
        Err(RecapError::Internal(format!(
            "chat-id query failed after {retry_times} attempts: {last}"
        )))
    }

    /// Process one task through both phases.
    ///
    /// Phase A generates and renders the summary with retries; phase B
    /// delivers it. Delivery exhaustion is NOT a task failure: the
    /// summary stays persisted on the task and the next recovery pass
    /// retries delivery only.
    async fn process_task(&self, task: &TaskRecord) -> Result<(), RecapError> {
        let (start_date, end_date) = window_dates(task.start_time, task.end_time);
        info!(chat_id = task.chat_id, %start_date, %end_date, "processing task");

        let Some(rendered) = self
            .generate_summary(task.chat_id, task.start_time, task.end_time)
            .await?
        else {
            return Ok(());
        };

        // Persist before the first delivery attempt: from here on, any
        // crash resumes as a delivery-only retry.
        if let Err(e) = tasks::set_summary_content(&self.db, task.id, rendered.clone()).await {
            warn!(task_id = task.id, error = %e, "failed to persist summary before delivery");
        }

        let sent = self.deliver_summary(&rendered, task.chat_id).await?;
        if sent {
            if let Err(e) = tasks::clear_summary_content(&self.db, task.id).await {
                warn!(task_id = task.id, error = %e, "failed to clear delivered summary");
            }
        }
        Ok(())
    }

    /// Phase A: generate and render the summary, retrying whole
    /// generation on failure.
    ///
    /// `Ok(None)` means the window has nothing to say (no messages, or
    /// an empty rendering); callers complete the task without delivery.
    async fn generate_summary(
        &self,
        chat_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<String>, RecapError> {
        let (retry_times, retry_interval) = self.retry_policy();

        let mut outcome = None;
        let mut last_err: Option<RecapError> = None;
        for attempt in 1..=retry_times {
            if self.cancel.is_cancelled() {
                return Err(RecapError::Cancelled);
            }
            debug!(chat_id, attempt, retry_times, "generating summary");
            match self.summarizer.summarize_range(chat_id, start, end).await {
                Ok(result) => {
                    outcome = Some(result);
                    last_err = None;
                    break;
                }
                Err(e) if e.is_cancelled() => return Err(RecapError::Cancelled),
                Err(e) => {
                    warn!(chat_id, attempt, retry_times, error = %e, "summary generation failed");
                    last_err = Some(e);
                    if attempt < retry_times && !self.sleep_or_cancel(retry_interval).await {
                        return Err(RecapError::Cancelled);
                    }
                }
            }
        }

        if let Some(e) = last_err {
            return Err(RecapError::Provider {
                message: format!("summary generation failed after {retry_times} attempts"),
                source: Some(Box::new(e)),
            });
        }

        match outcome.flatten() {
            None => {
                info!(chat_id, "no messages in window, skipping delivery");
                Ok(None)
            }
            Some(result) => {
                let (start_date, end_date) = window_dates(start, end);
                let rendered = format_summary(&result, chat_id, &start_date, &end_date);
                if rendered.is_empty() {
                    info!(chat_id, "summary rendered empty, skipping delivery");
                    Ok(None)
                } else {
                    Ok(Some(rendered))
                }
            }
        }
    }

    /// Phase B: deliver a rendered summary, retrying delivery only.
    ///
    /// Returns `Ok(true)` on success and `Ok(false)` when all attempts
    /// are exhausted; errors only on cancellation.
    async fn deliver_summary(&self, content: &str, chat_id: i64) -> Result<bool, RecapError> {
        let (_, retry_interval) = self.retry_policy();

        for attempt in 1..=DELIVERY_ATTEMPTS {
            if self.cancel.is_cancelled() {
                return Err(RecapError::Cancelled);
            }

            let result = tokio::select! {
                r = self.notifier.notify(content, chat_id) => r,
                _ = self.cancel.cancelled() => Err(RecapError::Cancelled),
            };
            match result {
                Ok(()) => {
                    info!(chat_id, "notification delivered");
                    return Ok(true);
                }
                Err(e) if e.is_cancelled() => return Err(RecapError::Cancelled),
                Err(e) => {
                    warn!(
                        chat_id, attempt, attempts = DELIVERY_ATTEMPTS, error = %e,
                        "notification delivery failed"
                    );
                    if attempt < DELIVERY_ATTEMPTS
                        && !self.sleep_or_cancel(retry_interval / 2).await
                    {
                        return Err(RecapError::Cancelled);
                    }
                }
            }
        }

        error!(
            chat_id,
            attempts = DELIVERY_ATTEMPTS,
            "delivery failed; summary retained for a later delivery-only retry"
        );
        Ok(false)
    }

    /// Startup recovery: finish incomplete runs, backfill a missed
    /// current window, re-drive unfinished tasks, then retry summaries
    /// that were generated but never delivered.
    pub async fn run_recovery(&self) {
        info!("starting recovery");

        match runs::list_incomplete_runs(&self.db).await {
            Err(e) => error!(error = %e, "failed to list incomplete runs"),
            Ok(incomplete) => {
                for run in incomplete {
                    if self.cancel.is_cancelled() {
                        info!("recovery interrupted");
                        return;
                    }
                    let (start_date, end_date) = window_dates(run.start_time, run.end_time);
                    info!(%start_date, %end_date, "re-executing incomplete daily run");
                    match self.execute_for_range(run.start_time, run.end_time).await {
                        Ok(()) => {
                            if let Err(e) = runs::mark_run_completed(&self.db, run.id).await {
                                error!(error = %e, "failed to mark recovered run completed");
                            }
                        }
                        Err(e) if e.is_cancelled() => {
                            info!("recovery interrupted");
                            return;
                        }
                        Err(e) => {
                            error!(error = %e, "recovered run failed");
                            if let Err(mark_err) =
                                runs::mark_run_failed(&self.db, run.id, e.to_string()).await
                            {
                                error!(error = %mark_err, "failed to mark recovered run failed");
                            }
                        }
                    }
                }
            }
        }

        // Missed-cron backfill: the current window has no run row at all.
        let (start, end) = self.current_window();
        match runs::get_run_by_range(&self.db, start, end).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                let (start_date, end_date) = window_dates(start, end);
                info!(%start_date, %end_date, "no run recorded for current window, backfilling");
                match runs::get_or_create_run(&self.db, start, end, RunStatus::InProgress).await {
                    Err(e) => error!(error = %e, "failed to create backfill run"),
                    Ok(run) => match self.execute_for_range(start, end).await {
                        Ok(()) => {
                            if let Err(e) = runs::mark_run_completed(&self.db, run.id).await {
                                error!(error = %e, "failed to mark backfill run completed");
                            }
                        }
                        Err(e) if e.is_cancelled() => {
                            info!("recovery interrupted");
                            return;
                        }
                        Err(e) => {
                            error!(error = %e, "backfill run failed");
                            if let Err(mark_err) =
                                runs::mark_run_failed(&self.db, run.id, e.to_string()).await
                            {
                                error!(error = %mark_err, "failed to mark backfill run failed");
                            }
                        }
                    },
                }
            }
            Err(e) => error!(error = %e, "failed to look up current window run"),
        }

        self.recover_tasks().await;
        self.recover_undelivered().await;
        info!("recovery finished");
    }

    /// Retry delivery for completed tasks whose summary never went out
    /// (delivery exhausted its attempts in an earlier process). Status
    /// is left untouched; only the pending summary is delivered and
    /// cleared.
    async fn recover_undelivered(&self) {
        let stuck = match tasks::list_completed_with_pending_summary(&self.db).await {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "failed to list undelivered summaries");
                return;
            }
        };
        if stuck.is_empty() {
            return;
        }

        info!(count = stuck.len(), "retrying undelivered summaries");
        let stale_cutoff = Utc::now() - Duration::days(STALE_TASK_DAYS);

        for task in stuck {
            if self.cancel.is_cancelled() {
                info!("undelivered recovery interrupted");
                return;
            }
            if task.start_time < stale_cutoff {
                warn!(
                    chat_id = task.chat_id,
                    start = %task.start_time.format("%Y-%m-%d"),
                    "dropping stale undelivered summary"
                );
                if let Err(e) = tasks::clear_summary_content(&self.db, task.id).await {
                    error!(task_id = task.id, error = %e, "failed to drop stale summary");
                }
                continue;
            }

            let content = task.summary_content.clone().unwrap_or_default();
            match self.deliver_summary(&content, task.chat_id).await {
                Err(_) => {
                    info!("undelivered recovery interrupted");
                    return;
                }
                Ok(true) => {
                    if let Err(e) = tasks::clear_summary_content(&self.db, task.id).await {
                        warn!(task_id = task.id, error = %e, "failed to clear delivered summary");
                    }
                }
                Ok(false) => {
                    // Still failing; the summary stays for the next start.
                }
            }
        }
    }

    /// Re-drive every `pending`/`processing` task within the staleness
    /// window. Tasks with a persisted summary take the delivery-only
    /// fast path and never re-invoke the LLM.
    async fn recover_tasks(&self) {
        let open_tasks = match tasks::list_pending_or_processing(&self.db).await {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "failed to list unfinished tasks");
                return;
            }
        };
        if open_tasks.is_empty() {
            return;
        }

        info!(count = open_tasks.len(), "recovering unfinished tasks");
        let stale_cutoff = Utc::now() - Duration::days(STALE_TASK_DAYS);

        for task in open_tasks {
            if self.cancel.is_cancelled() {
                info!("task recovery interrupted");
                return;
            }
            if task.start_time < stale_cutoff {
                warn!(
                    chat_id = task.chat_id,
                    start = %task.start_time.format("%Y-%m-%d"),
                    "skipping stale task"
                );
                continue;
            }

            if let Err(e) = tasks::reset_task_to_pending(&self.db, task.id).await {
                error!(task_id = task.id, error = %e, "failed to reset task");
                continue;
            }
            if let Err(e) =
                tasks::update_task_status(&self.db, task.id, TaskStatus::Processing, None).await
            {
                error!(task_id = task.id, error = %e, "failed to mark task processing");
                continue;
            }

            if task.has_pending_summary() {
                // The summary was produced before the crash: retry
                // delivery only.
                info!(chat_id = task.chat_id, task_id = task.id, "retrying delivery only");
                let content = task.summary_content.clone().unwrap_or_default();
                match self.deliver_summary(&content, task.chat_id).await {
                    Err(e) if e.is_cancelled() => {
                        info!("task recovery interrupted");
                        return;
                    }
                    Err(e) => {
                        error!(chat_id = task.chat_id, error = %e, "recovered delivery failed");
                        if let Err(mark_err) =
                            tasks::mark_task_failed(&self.db, task.id, e.to_string()).await
                        {
                            error!(task_id = task.id, error = %mark_err, "failed to mark task failed");
                        }
                    }
                    Ok(sent) => {
                        if sent {
                            if let Err(e) = tasks::clear_summary_content(&self.db, task.id).await {
                                warn!(task_id = task.id, error = %e, "failed to clear delivered summary");
                            }
                        }
                        if let Err(e) = tasks::mark_task_completed(&self.db, task.id).await {
                            error!(task_id = task.id, error = %e, "failed to mark task completed");
                        }
                    }
                }
                continue;
            }

            info!(chat_id = task.chat_id, task_id = task.id, "re-processing recovered task");
            match self.process_task(&task).await {
                Ok(()) => {
                    if let Err(e) = tasks::mark_task_completed(&self.db, task.id).await {
                        error!(task_id = task.id, error = %e, "failed to mark task completed");
                    }
                }
                Err(e) if e.is_cancelled() => {
                    info!("task recovery interrupted");
                    return;
                }
                Err(e) => {
                    error!(chat_id = task.chat_id, error = %e, "recovered task failed");
                    if let Err(mark_err) =
                        tasks::mark_task_failed(&self.db, task.id, e.to_string()).await
                    {
                        error!(task_id = task.id, error = %mark_err, "failed to mark task failed");
                    }
                }
            }
        }
    }

    /// Delete messages older than the retention cutoff. Runs after
    /// every daily run; failures are logged, never fatal.
    pub async fn retention_sweep(&self) {
        let retention_days = i64::from(self.config.retention_days);
        let cutoff = (Utc::now() - Duration::days(retention_days + 1))
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc();

        info!(cutoff = %cutoff.format("%Y-%m-%d"), "sweeping expired messages");
        match messages::delete_messages_before(&self.db, cutoff).await {
            Ok(deleted) => info!(deleted, "retention sweep finished"),
            Err(e) => error!(error = %e, "retention sweep failed"),
        }
    }
}

/// Display dates for a window: the end date is the last *covered*
/// calendar day, one before the exclusive end bound.
fn window_dates(start: DateTime<Utc>, end: DateTime<Utc>) -> (String, String) {
    (
        start.format("%Y-%m-%d").to_string(),
        (end - Duration::days(1)).format("%Y-%m-%d").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_dates_cover_inclusive_days() {
        let start = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 2, 11, 0, 0, 0).unwrap();
        let (start_date, end_date) = window_dates(start, end);
        assert_eq!(start_date, "2025-02-10");
        assert_eq!(end_date, "2025-02-10");

        let week_start = Utc.with_ymd_and_hms(2025, 2, 4, 0, 0, 0).unwrap();
        let (start_date, end_date) = window_dates(week_start, end);
        assert_eq!(start_date, "2025-02-04");
        assert_eq!(end_date, "2025-02-10");
    }
}

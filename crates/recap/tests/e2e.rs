// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests: captured messages flow through the real
//! LLM client (against wiremock), the formatter, and the scheduler to a
//! recording notifier, over a real temp SQLite database.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use recap_llm::LlmClient;
use recap_scheduler::Scheduler;
use recap_storage::queries::{runs, tasks};
use recap_storage::{Database, MessageStore, RunStatus, TaskStatus};
use recap_summarizer::Summarizer;
use recap_test_utils::{seed_message, temp_database, test_summary_config, MockNotifier};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let end = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    (end - Duration::days(1), end)
}

fn build_scheduler(db: &Database, server_uri: &str, notifier: Arc<MockNotifier>) -> Scheduler {
    let llm = LlmClient::new(
        server_uri.to_string(),
        "sk-test".into(),
        "gpt-4o".into(),
        128000,
        None,
    )
    .unwrap();
    let summarizer = Arc::new(Summarizer::new(
        Arc::new(llm),
        Arc::new(MessageStore::new(db.clone())),
    ));
    Scheduler::new(db.clone(), summarizer, notifier, test_summary_config())
}

fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 50, "completion_tokens": 40, "total_tokens": 90}
    })
}

#[tokio::test]
async fn full_pipeline_from_messages_to_delivery() {
    let (db, _dir) = temp_database().await;
    let (start, _end) = current_window();
    let chat_id = -1001427755127_i64;

    for (message_id, sender_id, sender, text) in [
        (100, 1, "A", "good morning"),
        (101, 2, "B", "morning A"),
        (102, 1, "A", "what a day"),
    ] {
        seed_message(
            &db,
            chat_id,
            message_id,
            sender_id,
            sender,
            text,
            start + Duration::hours(8),
        )
        .await;
    }

    // The model replies fenced, exercising the fence stripping too.
    let reply = "```json\n{\"topics\":[{\"title\":\"Greetings\",\"items\":[\
                 {\"sender_name\":\"A\",\"description\":\"said hi\",\"message_ids\":[100,102]},\
                 {\"sender_name\":\"B\",\"description\":\"responded\",\"message_ids\":[101]}\
                 ]}]}\n```";
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = Arc::new(MockNotifier::new());
    let scheduler = build_scheduler(&db, &server.uri(), notifier.clone());
    scheduler.run_daily_summary().await;

    let delivered = notifier.delivered();
    assert_eq!(delivered.len(), 1);
    let (delivered_chat, content) = &delivered[0];
    assert_eq!(*delivered_chat, chat_id);
    assert!(content.starts_with("📊 <b>Group Summary</b>\n📅 "));
    assert!(content.contains("1. Greetings\n"));
    assert!(content.contains(
        "- <b>A</b> said hi [<a href=\"https://t.me/c/1427755127/100\">link</a>] \
         [<a href=\"https://t.me/c/1427755127/102\">link</a>]"
    ));
    assert!(content.contains("- <b>B</b> responded [<a href=\"https://t.me/c/1427755127/101\">link</a>]"));

    let (start, end) = current_window();
    let (task, _) =
        tasks::get_or_create_task(&db, chat_id, start, end, TaskStatus::Pending).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(!task.has_pending_summary());

    let run = runs::get_run_by_range(&db, start, end).await.unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);

    db.close().await.unwrap();
}

#[tokio::test]
async fn unparseable_model_reply_fails_the_task() {
    let (db, _dir) = temp_database().await;
    let (start, end) = current_window();
    let chat_id = 8;
    seed_message(&db, chat_id, 1, 1, "A", "hi", start + Duration::hours(1)).await;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("Sorry, I cannot help with that.")),
        )
        .mount(&server)
        .await;

    let notifier = Arc::new(MockNotifier::new());
    let scheduler = build_scheduler(&db, &server.uri(), notifier.clone());
    scheduler.run_daily_summary().await;

    let (task, _) =
        tasks::get_or_create_task(&db, chat_id, start, end, TaskStatus::Pending).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert!(task
        .error_message
        .as_deref()
        .unwrap_or_default()
        .contains("summary generation failed"));
    assert_eq!(notifier.attempts(), 0);

    // The failed task is terminal: a later recovery pass leaves it alone.
    let recovery_notifier = Arc::new(MockNotifier::new());
    let recovered = build_scheduler(&db, &server.uri(), recovery_notifier.clone());
    recovered.run_recovery().await;
    let (task, _) =
        tasks::get_or_create_task(&db, chat_id, start, end, TaskStatus::Pending).await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(recovery_notifier.attempts(), 0);

    db.close().await.unwrap();
}

#[tokio::test]
async fn empty_model_topic_list_skips_delivery() {
    let (db, _dir) = temp_database().await;
    let (start, end) = current_window();
    let chat_id = 12;
    seed_message(&db, chat_id, 1, 1, "A", "hi", start + Duration::hours(1)).await;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{\"topics\":[]}")))
        .mount(&server)
        .await;

    let notifier = Arc::new(MockNotifier::new());
    let scheduler = build_scheduler(&db, &server.uri(), notifier.clone());
    scheduler.run_daily_summary().await;

    // "Nothing to say" is success, not failure.
    let (task, _) =
        tasks::get_or_create_task(&db, chat_id, start, end, TaskStatus::Pending).await.unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(!task.has_pending_summary());
    assert_eq!(notifier.attempts(), 0);

    db.close().await.unwrap();
}

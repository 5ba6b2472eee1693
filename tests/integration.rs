#![cfg(test)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{body::Bytes, extract::State, http::HeaderMap};
use chrono::Duration;
use mockall::mock;
use review_bell::{
    base::{
        config::{Config, ConfigInner},
        github::{EventKind, GithubEvent},
        notification::Notification,
        types::Void,
    },
    interaction,
    runtime::Runtime,
    service::{
        chat::{ChatClient, GenericChatClient},
        record::{RecordClient, file::FileRecordStore},
        webhook::{EVENT_HEADER, WebhookResponse, github_webhook_handler},
    },
};
use serde_json::{Value, json};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn send_notification(&self, notification: &Notification) -> Void;
    }
}

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            slack_webhook_url: "https://hooks.slack.com/services/T000/B000/XXXX".to_string(),
            github_to_slack: HashMap::from([
                ("@alice".to_string(), "@U0ALICE".to_string()),
                ("@bob".to_string(), "@U0BOB".to_string()),
                ("@carol".to_string(), "@U0CAROL".to_string()),
                ("@dave".to_string(), "@U0DAVE".to_string()),
            ]),
            record_window_secs: 60,
            bind_address: "127.0.0.1:0".to_string(),
            attachment_color: "#36a64f".to_string(),
            ..Default::default()
        }),
    }
}

/// Helper function to setup the test environment.
fn setup_test_environment(chat: MockChat, records: RecordClient) -> Runtime {
    Runtime::with_services(test_config(), ChatClient::new(Arc::new(chat)), records)
}

fn memory_records() -> RecordClient {
    RecordClient::memory(Duration::seconds(60))
}

fn parse(kind: &str, payload: &Value) -> GithubEvent {
    GithubEvent::parse(&EventKind::from_header(kind), &serde_json::to_vec(payload).unwrap()).unwrap()
}

fn review_requested_payload(reviewers: &[&str]) -> Value {
    let reviewers: Vec<_> = reviewers.iter().map(|login| json!({ "login": login })).collect();

    json!({
        "action": "review_requested",
        "pull_request": {
            "id": 1001,
            "number": 12,
            "html_url": "https://github.com/o/r/pull/12",
            "user": { "login": "dave" },
            "body": "Adds the thing.",
            "requested_reviewers": reviewers,
        },
    })
}

#[tokio::test]
async fn test_review_request_end_to_end() {
    let mut chat = MockChat::new();
    chat.expect_send_notification()
        .withf(|n| n.text == ":triangular_flag_on_post: <@U0ALICE> <@U0BOB>, *review requested* by dave in https://github.com/o/r/pull/12")
        .times(1)
        .returning(|_| Ok(()));

    let records = memory_records();
    let runtime = setup_test_environment(chat, records.clone());

    let delivered = interaction::handle_github_event(&runtime, &parse("pull_request", &review_requested_payload(&["alice", "bob"]))).await;

    assert_eq!(delivered, 1);
    assert_eq!(records.load().await.unwrap().query("1001"), vec!["@alice".to_string(), "@bob".to_string()]);
}

#[tokio::test]
async fn test_review_request_burst_pings_each_reviewer_once() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().withf(|n| n.text.contains("<@U0ALICE>") && !n.text.contains("<@U0BOB>")).times(1).returning(|_| Ok(()));
    chat.expect_send_notification().withf(|n| n.text.contains("<@U0BOB>") && !n.text.contains("<@U0ALICE>")).times(1).returning(|_| Ok(()));

    let runtime = setup_test_environment(chat, memory_records());

    let first = interaction::handle_github_event(&runtime, &parse("pull_request", &review_requested_payload(&["alice"]))).await;
    let second = interaction::handle_github_event(&runtime, &parse("pull_request", &review_requested_payload(&["alice", "bob"]))).await;
    let third = interaction::handle_github_event(&runtime, &parse("pull_request", &review_requested_payload(&["alice", "bob"]))).await;

    assert_eq!((first, second, third), (1, 1, 0));
}

#[tokio::test]
async fn test_issue_comment_end_to_end() {
    let mut chat = MockChat::new();
    chat.expect_send_notification()
        .withf(|n| {
            n.text == ":wave: <@U0CAROL> <@U0DAVE>, *mentioned* by bob in https://github.com/o/r/issues/3#issuecomment-9"
                && n.attachment.as_ref().map(|a| a.text.as_str()) == Some("@carol please check")
        })
        .times(1)
        .returning(|_| Ok(()));

    let runtime = setup_test_environment(chat, memory_records());
    let payload = json!({
        "action": "created",
        "issue": { "html_url": "https://github.com/o/r/issues/3", "user": { "login": "dave" }, "body": "Broken." },
        "comment": { "html_url": "https://github.com/o/r/issues/3#issuecomment-9", "user": { "login": "bob" }, "body": "@carol please check" },
    });

    assert_eq!(interaction::handle_github_event(&runtime, &parse("issue_comment", &payload)).await, 1);
}

#[tokio::test]
async fn test_self_review_sends_nothing() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().never();

    let runtime = setup_test_environment(chat, memory_records());
    let payload = json!({
        "action": "submitted",
        "review": { "html_url": "u", "user": { "login": "dave" }, "body": "Some notes", "state": "commented" },
        "pull_request": { "id": 1001, "html_url": "u", "user": { "login": "dave" } },
    });

    assert_eq!(interaction::handle_github_event(&runtime, &parse("pull_request_review", &payload)).await, 0);
}

#[tokio::test]
async fn test_failed_send_keeps_record() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(1).returning(|_| Err(anyhow::anyhow!("Slack is down")));

    let records = memory_records();
    let runtime = setup_test_environment(chat, records.clone());

    let delivered = interaction::handle_github_event(&runtime, &parse("pull_request", &review_requested_payload(&["alice"]))).await;

    assert_eq!(delivered, 0);
    assert_eq!(records.load().await.unwrap().query("1001"), vec!["@alice".to_string()]);
}

#[tokio::test]
async fn test_corrupt_record_file_only_fails_review_requests() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notify_record.json");
    std::fs::write(&path, "garbage").unwrap();

    let mut chat = MockChat::new();
    // The mention in the body of the pull request still goes out.
    chat.expect_send_notification().withf(|n| n.text.starts_with(":wave: <@U0CAROL>")).times(1).returning(|_| Ok(()));

    let records = RecordClient::new(Arc::new(FileRecordStore::new(path.clone())), Duration::seconds(60));
    let runtime = setup_test_environment(chat, records);

    let mut payload = review_requested_payload(&["alice"]);
    payload["action"] = json!("opened");
    payload["pull_request"]["body"] = json!("cc @carol");
    assert_eq!(interaction::handle_github_event(&runtime, &parse("pull_request", &payload)).await, 1);

    let payload = review_requested_payload(&["alice"]);
    assert_eq!(interaction::handle_github_event(&runtime, &parse("pull_request", &payload)).await, 0);

    // The corrupt file is left for an operator to look at.
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "garbage");
}

#[tokio::test]
async fn test_webhook_handler_always_acknowledges() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().never();

    let runtime = setup_test_environment(chat, memory_records());

    let mut headers = HeaderMap::new();
    headers.insert(EVENT_HEADER, "pull_request".parse().unwrap());
    let response = github_webhook_handler(State(runtime.clone()), headers, Bytes::from_static(b"{ not json")).await;
    assert_eq!(response.0, WebhookResponse::ok());

    let mut headers = HeaderMap::new();
    headers.insert(EVENT_HEADER, "push".parse().unwrap());
    let response = github_webhook_handler(State(runtime.clone()), headers, Bytes::from_static(b"{}")).await;
    assert_eq!(response.0, WebhookResponse::ok());

    let response = github_webhook_handler(State(runtime), HeaderMap::new(), Bytes::new()).await;
    assert_eq!(response.0, WebhookResponse::ok());
}

#[tokio::test]
async fn test_webhook_handler_dispatches() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().withf(|n| n.text.starts_with(":white_check_mark: <@U0DAVE>, *review approved* by alice")).times(1).returning(|_| Ok(()));

    let runtime = setup_test_environment(chat, memory_records());
    let payload = json!({
        "action": "submitted",
        "review": { "html_url": "u", "user": { "login": "alice" }, "body": "Ship it", "state": "approved" },
        "pull_request": { "id": 1001, "html_url": "u", "user": { "login": "dave" } },
    });

    let mut headers = HeaderMap::new();
    headers.insert(EVENT_HEADER, "pull_request_review".parse().unwrap());
    let response = github_webhook_handler(State(runtime), headers, Bytes::from(serde_json::to_vec(&payload).unwrap())).await;

    assert_eq!(response.0.result, "ok");
}

#[tokio::test]
async fn test_handle_webhook_sends_for_raw_delivery() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().withf(|n| n.text.starts_with(":wave: <@U0CAROL>, *mentioned* by bob")).times(1).returning(|_| Ok(()));

    let runtime = setup_test_environment(chat, memory_records());
    let payload = json!({
        "action": "opened",
        "issue": { "html_url": "https://github.com/o/r/issues/4", "user": { "login": "bob" }, "body": "ping @carol" },
    });

    interaction::handle_webhook(&runtime, "issues", &serde_json::to_vec(&payload).unwrap()).await;
}

use channel_finder::{ChannelFinderPipeline, CliConfig, LocalStorage, ScanEngine};
use clap::Parser;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const GET_CHAT: &str = "/botTEST_TOKEN/getChat";

fn ok(result: Value) -> Value {
    json!({ "ok": true, "result": result })
}

fn not_found() -> Value {
    json!({ "ok": false, "error_code": 400, "description": "Bad Request: chat not found" })
}

fn config(server: &MockServer, base_path: &str, extra: &[&str]) -> CliConfig {
    let base_url = server.base_url();
    let mut args = vec![
        "channel-finder",
        "--bot-token",
        "TEST_TOKEN",
        "--api-base-url",
        base_url.as_str(),
        "--base-path",
        base_path,
    ];
    args.extend_from_slice(extra);
    CliConfig::parse_from(args)
}

fn mock_get(server: &MockServer, chat_id: &str, status: u16, body: Value) {
    let chat_id = chat_id.to_string();
    server.mock(move |when, then| {
        when.method(GET).path(GET_CHAT).query_param("chat_id", chat_id);
        then.status(status).json_body(body);
    });
}

fn mock_post(server: &MockServer, chat_id: &str, body: Value) {
    let chat_id = chat_id.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path(GET_CHAT)
            .json_body(json!({ "chat_id": chat_id }));
        then.status(200).json_body(body);
    });
}

fn setup_directory(server: &MockServer) {
    // @alice: 自介有連結，另有個人頻道
    mock_get(
        server,
        "@alice",
        200,
        ok(json!({ "id": 1, "type": "private", "username": "alice" })),
    );
    mock_post(
        server,
        "1",
        ok(json!({
            "id": 1,
            "type": "private",
            "username": "alice",
            "bio": "Channel: t.me/alice_news",
            "personal_chat": {
                "id": -1001000000001i64,
                "type": "channel",
                "username": "alice_personal"
            }
        })),
    );
    mock_get(
        server,
        "-1001000000001",
        200,
        ok(json!({ "id": -1001000000001i64, "type": "channel", "username": "alice_personal" })),
    );

    // https://t.me/bob: 自介提到群組
    mock_get(
        server,
        "@bob",
        200,
        ok(json!({ "id": 2, "type": "private", "username": "bob" })),
    );
    mock_post(
        server,
        "2",
        ok(json!({ "id": 2, "type": "private", "username": "bob", "bio": "@bob_chat is my group" })),
    );

    // 777: 沒有任何線索
    mock_get(server, "777", 200, ok(json!({ "id": 777, "type": "private" })));
    mock_post(server, "777", ok(json!({ "id": 777, "type": "private" })));

    // @ghost: 查不到本人，只剩名稱變化
    mock_get(server, "@ghost", 400, not_found());
    mock_get(
        server,
        "@ghost_channel",
        200,
        ok(json!({ "id": -1000000000999i64, "type": "channel", "username": "ghost_channel" })),
    );
}

#[tokio::test]
async fn test_end_to_end_scan() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = temp_dir.path().to_str().unwrap().to_string();
    std::fs::write(
        temp_dir.path().join("accounts.txt"),
        "@alice\nhttps://t.me/bob\n\n777\n@ghost\n",
    )
    .unwrap();

    let server = MockServer::start();
    setup_directory(&server);

    let config = config(&server, &base_path, &["--report", "report.csv"]);
    let api = config.telegram_client().unwrap();
    let storage = LocalStorage::new(base_path.clone());
    let pipeline = ChannelFinderPipeline::new(storage, config, api);
    let engine = ScanEngine::new(pipeline);

    let output_path = engine.run().await.unwrap();
    assert_eq!(output_path, "channels.txt");

    let channels = std::fs::read_to_string(temp_dir.path().join("channels.txt")).unwrap();
    assert_eq!(
        channels,
        "alice_news\nalice_personal\nbob_chat\nghost_channel\n"
    );

    let report = std::fs::read_to_string(temp_dir.path().join("report.csv")).unwrap();
    let rows: Vec<&str> = report.lines().collect();
    assert_eq!(rows[0], "account,channel,source");
    assert!(rows.contains(&"@alice,alice_personal,channel_ref:personal_chat"));
    assert!(rows.contains(&"@alice,alice_news,bio"));
    assert!(rows.contains(&"https://t.me/bob,bob_chat,bio"));
    assert!(rows.contains(&"@ghost,ghost_channel,name_variation"));
    assert!(!report.contains("777"));
}

#[tokio::test]
async fn test_end_to_end_without_variations() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = temp_dir.path().to_str().unwrap().to_string();
    std::fs::write(temp_dir.path().join("accounts.txt"), "@ghost\n").unwrap();

    let server = MockServer::start();
    setup_directory(&server);

    let config = config(&server, &base_path, &["--no-variations"]);
    let api = config.telegram_client().unwrap();
    let pipeline = ChannelFinderPipeline::new(LocalStorage::new(base_path.clone()), config, api);

    ScanEngine::new(pipeline).run().await.unwrap();

    let channels = std::fs::read_to_string(temp_dir.path().join("channels.txt")).unwrap();
    assert_eq!(channels, "");
    assert!(!temp_dir.path().join("report.csv").exists());
}

#[tokio::test]
async fn test_missing_input_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let config = config(&server, &base_path, &[]);
    let api = config.telegram_client().unwrap();
    let pipeline = ChannelFinderPipeline::new(LocalStorage::new(base_path), config, api);

    let result = ScanEngine::new(pipeline).run().await;
    assert!(matches!(
        result,
        Err(channel_finder::ScanError::IoError(_))
    ));
}

#[tokio::test]
async fn test_direct_channel_check_survives_no_variations() {
    let temp_dir = TempDir::new().unwrap();
    let base_path = temp_dir.path().to_str().unwrap().to_string();
    std::fs::write(temp_dir.path().join("accounts.txt"), "@chan\n").unwrap();

    let server = MockServer::start();
    mock_get(
        &server,
        "@chan",
        200,
        ok(json!({ "id": -1000000000321i64, "type": "channel", "username": "chan" })),
    );
    server.mock(|when, then| {
        when.method(POST)
            .path(GET_CHAT)
            .json_body(json!({ "chat_id": "-1000000000321" }));
        then.status(400).json_body(not_found());
    });

    let config = config(&server, &base_path, &["--no-variations"]);
    let api = config.telegram_client().unwrap();
    let pipeline = ChannelFinderPipeline::new(LocalStorage::new(base_path.clone()), config, api);

    ScanEngine::new(pipeline).run().await.unwrap();

    let channels = std::fs::read_to_string(temp_dir.path().join("channels.txt")).unwrap();
    assert_eq!(channels, "chan\n");
}

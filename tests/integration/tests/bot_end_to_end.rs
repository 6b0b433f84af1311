use std::time::Duration;

use clap::Parser;
use granat_bot::{build_bot_runtime, Cli};
use granat_telegram::{
    build_webhook_router, spawn_webhook_worker, TelegramPoller, WebhookState,
    TELEGRAM_SECRET_HEADER,
};
use httpmock::prelude::*;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

const CATALOG_CSV: &str = "Component,File,Tags,Link\n\
Button,App Components,\"кнопка, button\",https://figma/button\n\
Header,Web Components,шапка,https://figma/header\n";

fn cli_for(server: &MockServer, extra: &[&str]) -> Cli {
    let api_base = server.base_url();
    let catalog_url = server.url("/components.csv");
    let mut argv = vec![
        "granat-bot",
        "--bot-token",
        "e2e-token",
        "--telegram-api-base",
        api_base.as_str(),
        "--catalog-url",
        catalog_url.as_str(),
        "--poll-timeout-secs",
        "1",
        "--request-timeout-ms",
        "2000",
    ];
    argv.extend_from_slice(extra);
    Cli::try_parse_from(argv).expect("cli parses")
}

fn text_update(update_id: i64, chat_id: i64, text: &str) -> serde_json::Value {
    json!({
        "update_id": update_id,
        "message": {"message_id": update_id, "chat": {"id": chat_id}, "text": text}
    })
}

fn sent_ok() -> serde_json::Value {
    json!({"ok": true, "result": {"message_id": 1}})
}

#[tokio::test]
async fn integration_polling_search_flow_replies_in_order() {
    let server = MockServer::start();
    let catalog = server.mock(|when, then| {
        when.method(GET).path("/components.csv");
        then.status(200).body(CATALOG_CSV);
    });
    server.mock(|when, then| {
        when.method(GET).path("/bote2e-token/getUpdates");
        then.status(200).json_body(json!({
            "ok": true,
            "result": [
                text_update(1, 300, "/start"),
                text_update(2, 300, "Найти компонент"),
                text_update(3, 300, "Мобильный компонент"),
                text_update(4, 300, "КНОПКА"),
            ]
        }));
    });
    let welcome = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("\"chat_id\":300")
            .body_includes("Я помощник Дизайн-системы");
        then.status(200).json_body(sent_ok());
    });
    let category_prompt = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("Выберите тип компонента");
        then.status(200).json_body(sent_ok());
    });
    let query_prompt = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("Введите название компонента");
        then.status(200).json_body(sent_ok());
    });
    let result = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("Найдено: 1")
            .body_includes("https://figma/button")
            .body_includes("\"parse_mode\":\"HTML\"");
        then.status(200).json_body(sent_ok());
    });
    let main_menu = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("Вы в главном меню");
        then.status(200).json_body(sent_ok());
    });

    let cli = cli_for(&server, &[]);
    let runtime = build_bot_runtime(&cli).expect("runtime builds");
    let mut poller = TelegramPoller::new(runtime.client, runtime.handler, cli.poller_config());
    let report = poller.run_poll_cycle().await.expect("poll cycle");

    assert_eq!(report.received, 4);
    assert_eq!(report.handled, 4);
    assert_eq!(poller.cursor().offset(), Some(5));
    welcome.assert_calls(1);
    category_prompt.assert_calls(1);
    query_prompt.assert_calls(1);
    result.assert_calls(1);
    main_menu.assert_calls(1);
    catalog.assert_calls(1);
}

#[tokio::test]
async fn integration_unreachable_catalog_answers_not_found_then_main_menu() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/components.csv");
        then.status(503).body("maintenance");
    });
    server.mock(|when, then| {
        when.method(GET).path("/bote2e-token/getUpdates");
        then.status(200).json_body(json!({
            "ok": true,
            "result": [
                text_update(10, 8, "find component"),
                text_update(11, 8, "web component"),
                text_update(12, 8, "шапка"),
            ]
        }));
    });
    let not_found = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("не найдены");
        then.status(200).json_body(sent_ok());
    });
    let main_menu = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("Вы в главном меню");
        then.status(200).json_body(sent_ok());
    });

    let cli = cli_for(&server, &[]);
    let runtime = build_bot_runtime(&cli).expect("runtime builds");
    let mut poller = TelegramPoller::new(runtime.client, runtime.handler, cli.poller_config());
    let report = poller.run_poll_cycle().await.expect("poll cycle");

    assert_eq!(report.handled, 3);
    not_found.assert_calls(1);
    main_menu.assert_calls(1);
}

#[tokio::test]
async fn integration_failed_send_does_not_block_later_updates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/components.csv");
        then.status(200).body(CATALOG_CSV);
    });
    server.mock(|when, then| {
        when.method(GET).path("/bote2e-token/getUpdates");
        then.status(200).json_body(json!({
            "ok": true,
            "result": [
                text_update(20, 1, "/start"),
                text_update(21, 2, "/start"),
            ]
        }));
    });
    let blocked = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("\"chat_id\":1,");
        then.status(403)
            .json_body(json!({"ok": false, "error_code": 403, "description": "Forbidden: bot was blocked by the user"}));
    });
    let delivered = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("\"chat_id\":2,");
        then.status(200).json_body(sent_ok());
    });

    let cli = cli_for(&server, &[]);
    let runtime = build_bot_runtime(&cli).expect("runtime builds");
    let mut poller = TelegramPoller::new(runtime.client, runtime.handler, cli.poller_config());
    let report = poller.run_poll_cycle().await.expect("poll cycle");

    assert_eq!(report.handled, 2);
    assert_eq!(poller.cursor().offset(), Some(22));
    blocked.assert_calls(1);
    delivered.assert_calls(1);
}

#[tokio::test]
async fn integration_webhook_update_reaches_send_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/components.csv");
        then.status(200).body(CATALOG_CSV);
    });
    let welcome = server.mock(|when, then| {
        when.method(POST)
            .path("/bote2e-token/sendMessage")
            .body_includes("\"chat_id\":55")
            .body_includes("Я помощник Дизайн-системы");
        then.status(200).json_body(sent_ok());
    });

    let cli = cli_for(
        &server,
        &["--ingress-mode", "webhook", "--webhook-secret", "hook-secret"],
    );
    let runtime = build_bot_runtime(&cli).expect("runtime builds");
    let webhook = cli.webhook_config();
    let (sender, receiver) = mpsc::channel(webhook.queue_capacity);
    let _worker = spawn_webhook_worker(receiver, runtime.handler);
    let state = std::sync::Arc::new(WebhookState::new(&webhook.path, webhook.secret, sender));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = build_webhook_router(state);
    let server_task = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(25)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/webhook"))
        .header(TELEGRAM_SECRET_HEADER, "hook-secret")
        .body(text_update(1, 55, "/start").to_string())
        .send()
        .await
        .expect("post webhook");
    assert_eq!(response.status().as_u16(), 200);

    for _ in 0..80 {
        if welcome.calls() >= 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    welcome.assert_calls(1);

    server_task.abort();
}

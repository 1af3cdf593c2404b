//! Widget Exchange Tests
//!
//! Drive the widget controller over real HTTP against the local test backend:
//! - Successful replies and the request payload
//! - Non-2xx statuses and unreadable bodies
//! - Unreachable backend
//! - Agent listing and health check

mod test_server;

use chat_widget::{
    AgentRegistry, ChatBackend, ExchangeError, ExchangeState, HttpBackend, Language, MessageKind,
    RecordingView, Sender, ViewEvent, WidgetConfig, WidgetController,
};
use serde_json::json;
use std::sync::Arc;
use test_server::{unreachable_url, ChatBehavior, TestServer};

/// Helper to build a headless widget pointed at `base_url`
fn create_widget(base_url: &str) -> anyhow::Result<WidgetController<RecordingView>> {
    let config = WidgetConfig::default().with_api_base_url(base_url);
    let backend = Arc::new(HttpBackend::new(&config));
    Ok(WidgetController::new(config, backend, RecordingView::new())?)
}

#[tokio::test]
async fn test_admission_question_gets_reply() -> anyhow::Result<()> {
    let server = TestServer::with_behavior(ChatBehavior::Reply(json!({
        "response": "Подайте документы до 20 августа",
        "response_time": 0.31
    })))
    .await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    widget.open();
    widget.send_message("Как поступить?").await;

    let messages = widget.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].sender, Sender::User);
    assert_eq!(messages[1].text, "Как поступить?");
    assert_eq!(messages[2].sender, Sender::Bot);
    assert_eq!(messages[2].kind, MessageKind::Text);
    assert_eq!(messages[2].text, "Подайте документы до 20 августа");

    let view = widget.view();
    assert!(!view.typing_visible);
    assert!(view.send_enabled);
    assert_eq!(view.count(|e| matches!(e, ViewEvent::TypingShown(_))), 1);
    assert_eq!(view.count(|e| matches!(e, ViewEvent::TypingHidden)), 1);
    assert_eq!(widget.exchange_state(), ExchangeState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_request_payload_contract() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    widget.switch_agent("consultant");
    widget.switch_language(Language::Kz);
    widget.send_message("  Шәкіртақы  ").await;

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        json!({
            "message": "Шәкіртақы",
            "language": "kz",
            "session_id": widget.session_id().as_str(),
            "agent_type": "academic"
        })
    );
    assert_eq!(widget.messages().last().unwrap().text, "echo: Шәкіртақы");

    Ok(())
}

#[tokio::test]
async fn test_session_id_is_stable_across_requests() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    widget.send_message("first").await;
    widget.switch_agent("dorm");
    widget.send_message("second").await;

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["session_id"], requests[1]["session_id"]);
    assert_eq!(requests[1]["agent_type"], "student_life");

    Ok(())
}

#[tokio::test]
async fn test_service_unavailable_status() -> anyhow::Result<()> {
    let server = TestServer::with_behavior(ChatBehavior::Status(503)).await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    widget.send_message("Стоимость обучения").await;

    let reply = widget.messages().last().unwrap();
    assert_eq!(reply.kind, MessageKind::Error);
    assert_eq!(
        reply.text,
        widget
            .config()
            .strings
            .service_unavailable
            .get(Language::Ru)
    );
    assert!(widget.view().send_enabled);

    Ok(())
}

#[tokio::test]
async fn test_connection_error_in_selected_language() -> anyhow::Result<()> {
    let mut widget = create_widget(&unreachable_url().await)?;
    widget.switch_language(Language::Kz);
    widget.send_message("Байланыс").await;

    let messages = widget.messages();
    assert_eq!(messages.len(), 3);
    let reply = &messages[2];
    assert_eq!(reply.kind, MessageKind::Error);
    assert_eq!(reply.text, "Кешіріңіз, байланыс қатесі орын алды.");

    let view = widget.view();
    assert!(view.send_enabled);
    assert!(!view.typing_visible);

    Ok(())
}

#[tokio::test]
async fn test_malformed_body_falls_back() -> anyhow::Result<()> {
    let server = TestServer::with_behavior(ChatBehavior::Raw("<html>oops</html>")).await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    widget.send_message("Контакты").await;

    assert_eq!(
        widget.messages().last().unwrap().text,
        "Извините, произошла ошибка. Попробуйте позже."
    );

    Ok(())
}

#[tokio::test]
async fn test_reply_without_response_field_falls_back() -> anyhow::Result<()> {
    let server =
        TestServer::with_behavior(ChatBehavior::Reply(json!({ "response_time": 1.0 }))).await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    widget.send_message("Специальности").await;

    let reply = widget.messages().last().unwrap();
    assert_eq!(reply.sender, Sender::Bot);
    assert_eq!(reply.text, "Извините, произошла ошибка. Попробуйте позже.");

    Ok(())
}

#[tokio::test]
async fn test_backend_quick_replies_are_shown() -> anyhow::Result<()> {
    let server = TestServer::with_behavior(ChatBehavior::Reply(json!({
        "response": "Выберите тему",
        "quickReplies": ["Гранты", "Общежитие"]
    })))
    .await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    widget.send_quick_reply("Контакты").await;

    assert_eq!(widget.view().quick_replies, vec!["Гранты", "Общежитие"]);

    Ok(())
}

#[tokio::test]
async fn test_http_backend_status_and_transport_errors() -> anyhow::Result<()> {
    let server = TestServer::with_behavior(ChatBehavior::Status(500)).await;
    server.wait_ready().await?;

    let mut widget = create_widget(&server.url())?;
    let pending = widget.begin_send("q").expect("exchange starts");

    let backend = HttpBackend::new(widget.config());
    let outcome = backend.send(pending.request()).await;
    assert_eq!(outcome, Err(ExchangeError::Status(500)));

    let config = WidgetConfig::default().with_api_base_url(unreachable_url().await);
    let outcome = HttpBackend::new(&config).send(pending.request()).await;
    assert!(matches!(outcome, Err(ExchangeError::Transport(_))));

    widget.complete_send(pending, Err(ExchangeError::Status(500)));
    assert_eq!(widget.exchange_state(), ExchangeState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_remote_agent_registry() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let config = WidgetConfig::default().with_api_base_url(server.url());
    let backend = Arc::new(HttpBackend::new(&config));

    let descriptors = backend.list_agents().await?;
    assert_eq!(descriptors.len(), 2);

    let config = config.with_agents(AgentRegistry::from_descriptors(&descriptors));
    assert_eq!(config.default_agent, "admission");

    let mut widget = WidgetController::new(config, backend, RecordingView::new())?;
    assert_eq!(widget.view().agent_label, "Агент по поступлению");
    assert_eq!(widget.messages()[0].text, "Вопросы поступления и документов");

    widget.switch_agent("scholarship");
    widget.send_message("Какие есть гранты?").await;
    assert_eq!(server.requests()[0]["agent_type"], "scholarship");

    Ok(())
}

#[tokio::test]
async fn test_backend_health_check() -> anyhow::Result<()> {
    let server = TestServer::start().await;
    server.wait_ready().await?;

    let config = WidgetConfig::default().with_api_base_url(server.url());
    let health = HttpBackend::new(&config).health().await?;
    assert!(health.is_healthy());
    assert_eq!(health.status, "healthy");

    let config = WidgetConfig::default().with_api_base_url(unreachable_url().await);
    let outcome = HttpBackend::new(&config).health().await;
    assert!(matches!(outcome, Err(ExchangeError::Transport(_))));

    Ok(())
}

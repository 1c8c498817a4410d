use super::*;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::http::StatusCode;
use shared::{domain::TicketNumber, protocol::FormField};

use crate::{
    memory_page::{ElementState, MemoryPage, PageEffect},
    page::SelectOption,
    test_support::{
        create_executor, create_page, detail_page, spawn_canned_server, spawn_create_server,
        ticket_executor, TICKET,
    },
    users::{MissingUserDirectory, StaticUserDirectory},
};

struct FailingUserDirectory;

#[async_trait]
impl UserDirectory for FailingUserDirectory {
    async fn assignable_users(
        &self,
        _ticket_number: &TicketNumber,
    ) -> anyhow::Result<Vec<SelectOption>> {
        Err(anyhow!("directory offline"))
    }
}

fn option(value: &str, label: &str) -> SelectOption {
    SelectOption {
        value: value.into(),
        label: label.into(),
    }
}

#[tokio::test]
async fn status_form_reads_select_and_notes() {
    let (server_url, recorder) = spawn_canned_server(StatusCode::OK, r#"{"success": true}"#).await;
    let page = Arc::new(detail_page());
    let controller = PageController::new(
        ticket_executor(&server_url, page.clone()),
        Arc::new(MissingUserDirectory),
    );

    controller.submit_status_form().await.expect("status");

    let requests = recorder.requests().await;
    assert_eq!(
        requests[0].json(),
        serde_json::json!({"status": "resolved", "resolution_notes": "Replaced the lamp"})
    );
    assert_eq!(page.effects(), vec![PageEffect::Reload]);
}

#[tokio::test]
async fn comment_form_without_internal_checkbox_sends_public_comment() {
    let (server_url, recorder) = spawn_canned_server(
        StatusCode::OK,
        r#"{"success": true, "comment": {"comment": "hello\nworld", "user": "ana", "created_at": "2024-05-01 10:00:00", "is_internal": false}}"#,
    )
    .await;
    let page = detail_page();
    let mut elements = page.elements();
    elements.remove("is-internal");
    let page = Arc::new(elements.into_iter().fold(
        MemoryPage::new("csrftoken=abc"),
        |page, (id, element)| page.with_element(id, element),
    ));
    let controller = PageController::new(
        ticket_executor(&server_url, page.clone()),
        Arc::new(MissingUserDirectory),
    );

    controller.submit_comment_form().await.expect("comment");

    let requests = recorder.requests().await;
    assert_eq!(
        requests[0].json(),
        serde_json::json!({"comment": "hello\nworld", "is_internal": false})
    );
    assert_eq!(page.value("comment-text").as_deref(), Some(""));
    assert!(!page.has_element("is-internal"));
}

#[tokio::test]
async fn missing_form_is_reported_without_request_or_alert() {
    let (server_url, recorder) = spawn_canned_server(StatusCode::OK, r#"{"success": true}"#).await;
    let page = Arc::new(MemoryPage::new(""));
    let controller = PageController::new(
        ticket_executor(&server_url, page.clone()),
        Arc::new(MissingUserDirectory),
    );

    let err = controller
        .submit_status_form()
        .await
        .expect_err("must fail");

    assert!(matches!(err, ActionError::MissingElement { .. }));
    assert_eq!(recorder.count().await, 0);
    assert!(page.effects().is_empty());
}

#[tokio::test]
async fn assign_button_opens_then_saves() {
    let (server_url, recorder) = spawn_canned_server(StatusCode::OK, r#"{"success": true}"#).await;
    let page = Arc::new(detail_page());
    let controller = PageController::new(
        ticket_executor(&server_url, page.clone()),
        Arc::new(StaticUserDirectory::new(vec![
            option("2", "dana"),
            option("5", "lee"),
        ])),
    );
    assert_eq!(controller.assignment_state(), AssignmentState::Collapsed);

    let step = controller.click_assign_button().await.expect("open");

    assert_eq!(step, AssignmentStep::Opened);
    assert_eq!(controller.assignment_state(), AssignmentState::Editing);
    assert_eq!(page.is_visible("assign-select"), Some(true));
    assert_eq!(
        page.element("assign-btn").expect("button").text,
        SAVE_ASSIGNMENT_LABEL
    );
    assert_eq!(page.option_count("assign-select"), 3);
    assert_eq!(recorder.count().await, 0);

    page.set_value("assign-select", "5");
    let step = controller.click_assign_button().await.expect("save");

    assert_eq!(step, AssignmentStep::Saved(ActionOutcome::Reloaded));
    assert_eq!(controller.assignment_state(), AssignmentState::Collapsed);
    assert_eq!(page.is_visible("assign-select"), Some(false));
    assert_eq!(page.element("assign-btn").expect("button").text, ASSIGN_LABEL);
    let requests = recorder.requests().await;
    assert_eq!(requests[0].path, format!("/api/complaint/{TICKET}/assign/"));
    assert_eq!(requests[0].json(), serde_json::json!({"user_id": "5"}));
    assert_eq!(page.effects(), vec![PageEffect::Reload]);
}

#[tokio::test]
async fn failed_assignment_stays_in_editing() {
    let (server_url, _recorder) = spawn_canned_server(
        StatusCode::OK,
        r#"{"success": false, "error": "Permission denied"}"#,
    )
    .await;
    let page = Arc::new(detail_page());
    let controller = PageController::new(
        ticket_executor(&server_url, page.clone()),
        Arc::new(MissingUserDirectory),
    );

    controller.click_assign_button().await.expect("open");
    let err = controller
        .click_assign_button()
        .await
        .expect_err("save must fail");

    assert!(matches!(err, ActionError::Application { .. }));
    assert_eq!(controller.assignment_state(), AssignmentState::Editing);
    assert_eq!(page.is_visible("assign-select"), Some(true));
    assert_eq!(
        page.alerts(),
        vec!["Failed to assign: Permission denied".to_string()]
    );
}

#[tokio::test]
async fn user_directory_failure_does_not_block_editing() {
    let (server_url, _recorder) = spawn_canned_server(StatusCode::OK, r#"{"success": true}"#).await;
    let page = Arc::new(detail_page());
    let controller = PageController::new(
        ticket_executor(&server_url, page.clone()),
        Arc::new(FailingUserDirectory),
    );

    let step = controller.click_assign_button().await.expect("open");

    assert_eq!(step, AssignmentStep::Opened);
    assert_eq!(controller.assignment_state(), AssignmentState::Editing);
    assert_eq!(page.option_count("assign-select"), 1);
    assert!(page.effects().is_empty());
}

#[tokio::test]
async fn populated_selector_is_not_refilled() {
    let (server_url, _recorder) = spawn_canned_server(StatusCode::OK, r#"{"success": true}"#).await;
    let page = Arc::new(detail_page());
    page.append_option("assign-select", &option("9", "already here"));
    let controller = PageController::new(
        ticket_executor(&server_url, page.clone()),
        Arc::new(StaticUserDirectory::new(vec![option("2", "dana")])),
    );

    controller.click_assign_button().await.expect("open");

    assert_eq!(page.option_count("assign-select"), 2);
}

#[tokio::test]
async fn visible_selector_at_load_starts_in_editing() {
    let page = detail_page().with_element("assign-select", ElementState::visible());
    let page = Arc::new(page);
    let controller = PageController::new(
        ticket_executor("http://127.0.0.1:9", page),
        Arc::new(MissingUserDirectory),
    );

    assert_eq!(controller.assignment_state(), AssignmentState::Editing);
}

#[tokio::test]
async fn complaint_form_submission_uses_form_snapshot() {
    let (server_url, recorder) =
        spawn_create_server(r#"{"success": true, "ticket_number": "T-42"}"#).await;
    let page = Arc::new(create_page(vec![
        FormField::text("title", "Noise"),
        FormField::text("priority", "low"),
    ]));
    let controller = PageController::new(
        create_executor(&server_url, page.clone()),
        Arc::new(MissingUserDirectory),
    );

    let outcome = controller.submit_complaint_form().await.expect("create");

    assert_eq!(outcome, ActionOutcome::Navigated("/complaint/T-42/".into()));
    let names: Vec<String> = recorder
        .parts()
        .await
        .into_iter()
        .map(|part| part.name)
        .collect();
    assert_eq!(names, vec!["title", "priority", "category"]);
}

use super::*;

use client_core::{ElementIds, ElementState, MemoryPage};

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn assign_writes_the_selection_to_the_bound_selector() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let page = Arc::new(
        MemoryPage::new("")
            .with_element("owner-btn", ElementState::with_text("Assign"))
            .with_element("owner-select", ElementState::hidden()),
    );
    let context = PageContext {
        ticket_number: Some(parse_ticket("COMP-000001").expect("ticket")),
        elements: ElementIds {
            assign_button: "owner-btn".into(),
            assign_select: "owner-select".into(),
            ..ElementIds::default()
        },
    };
    let executor = Arc::new(
        RequestExecutor::new(&closed_port_url(), context, page.clone()).expect("executor"),
    );
    let controller = PageController::new(executor, user_directory(&[]));

    let err = assign(&controller, "7".into())
        .await
        .expect_err("nothing listens");

    assert!(matches!(err, ActionError::Transport { status: None, .. }));
    assert_eq!(page.value("owner-select").as_deref(), Some("7"));
    assert!(page.element("assign-select").is_none());
}

#[test]
fn form_fields_and_candidates_split_on_first_equals() {
    assert_eq!(
        parse_field("title=a=b").expect("field"),
        ("title".to_string(), "a=b".to_string())
    );
    assert!(parse_field("=x").is_err());
    let candidate = parse_candidate("5=lee").expect("candidate");
    assert_eq!((candidate.value.as_str(), candidate.label.as_str()), ("5", "lee"));
}

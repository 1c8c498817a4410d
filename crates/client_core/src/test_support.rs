//! In-process servers and page fixtures shared by the unit tests.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Router,
};
use shared::{domain::TicketNumber, protocol::FormField};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    executor::RequestExecutor,
    memory_page::{ElementState, MemoryPage},
    page::{PageContext, SelectOption},
};

pub(crate) const TICKET: &str = "COMP-000001";
pub(crate) const PAGE_COOKIE: &str = "sessionid=s3ss10n; csrftoken=tok%2B1";

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub csrf_token: Option<String>,
    pub cookie: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("json request body")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone, Default)]
pub(crate) struct Recorder {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    parts: Arc<Mutex<Vec<RecordedPart>>>,
}

impl Recorder {
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn parts(&self) -> Vec<RecordedPart> {
        self.parts.lock().await.clone()
    }

    async fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: Vec<u8>) {
        let header_text = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().await.push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            csrf_token: header_text("x-csrftoken"),
            cookie: header_text("cookie"),
            body,
        });
    }
}

pub(crate) async fn spawn_canned_server(status: StatusCode, body: &'static str) -> (String, Recorder) {
    spawn_delayed_server(status, body, None).await
}

pub(crate) async fn spawn_delayed_server(
    status: StatusCode,
    body: &'static str,
    delay: Option<Duration>,
) -> (String, Recorder) {
    let recorder = Recorder::default();
    let state = recorder.clone();
    let app = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, request_body: Bytes| {
            let state = state.clone();
            async move {
                state
                    .record(method, &uri, &headers, request_body.to_vec())
                    .await;
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        },
    );
    (serve(app).await, recorder)
}

#[derive(Clone)]
struct CreateServerState {
    recorder: Recorder,
    response: &'static str,
}

async fn handle_create(
    State(state): State<CreateServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.expect("field bytes").to_vec();
        state.recorder.parts.lock().await.push(RecordedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state.recorder.record(method, &uri, &headers, Vec::new()).await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        state.response,
    )
}

/// Parses multipart submissions on `/complaint/create/` and answers with `response`.
pub(crate) async fn spawn_create_server(response: &'static str) -> (String, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .route("/complaint/create/", post(handle_create))
        .with_state(CreateServerState {
            recorder: recorder.clone(),
            response,
        });
    (serve(app).await, recorder)
}

pub(crate) async fn unreachable_server_url() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

pub(crate) fn detail_page() -> MemoryPage {
    MemoryPage::new(PAGE_COOKIE)
        .with_element("statusForm", ElementState::form(Vec::new()))
        .with_element("status-select", ElementState::with_value("resolved"))
        .with_element("resolution-notes", ElementState::with_value("Replaced the lamp"))
        .with_element("commentForm", ElementState::form(Vec::new()))
        .with_element("comment-text", ElementState::with_value("hello\nworld"))
        .with_element("is-internal", ElementState::checkbox(true))
        .with_element("comments-list", ElementState::visible())
        .with_element("assign-btn", ElementState::with_text("Assign"))
        .with_element(
            "assign-select",
            ElementState {
                options: vec![SelectOption {
                    value: String::new(),
                    label: "Unassigned".into(),
                }],
                ..ElementState::hidden()
            },
        )
        .with_element("assigned-user", ElementState::with_text("Unassigned"))
}

pub(crate) fn create_page(fields: Vec<FormField>) -> MemoryPage {
    MemoryPage::new(PAGE_COOKIE)
        .with_element("complaintForm", ElementState::form(fields))
        .with_element("category", ElementState::with_value(""))
        .with_element("errorMessage", ElementState::hidden())
}

pub(crate) fn ticket_executor(server_url: &str, page: Arc<MemoryPage>) -> Arc<RequestExecutor> {
    executor_for_ticket(server_url, TICKET, page)
}

pub(crate) fn executor_for_ticket(
    server_url: &str,
    ticket: &str,
    page: Arc<MemoryPage>,
) -> Arc<RequestExecutor> {
    let ticket = TicketNumber::parse(ticket).expect("ticket");
    Arc::new(
        RequestExecutor::new(server_url, PageContext::for_ticket(ticket), page)
            .expect("executor"),
    )
}

pub(crate) fn create_executor(server_url: &str, page: Arc<MemoryPage>) -> Arc<RequestExecutor> {
    Arc::new(
        RequestExecutor::new(server_url, PageContext::without_ticket(), page).expect("executor"),
    )
}

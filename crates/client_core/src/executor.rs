use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use futures::future::{abortable, AbortHandle, Aborted};
use reqwest::{
    header::COOKIE,
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ActionKind, Comment, TicketNumber},
    protocol::{
        set_text_field, ActionRequest, ActionResult, AddCommentBody, AssignBody, Assigned,
        CommentAdded, ComplaintCreated, Envelope, FormField, FormValue, ServerFailure,
        StatusUpdated, UpdateStatusBody, CATEGORY_FIELD,
    },
};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;

use crate::{
    cookie::{get_cookie, CSRF_COOKIE, CSRF_HEADER},
    error::{ActionError, EMPTY_COMMENT_MESSAGE},
    page::{PageContext, PageView},
    render::render_comment,
};

pub const CREATE_COMPLAINT_PATH: &str = "/complaint/create/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Reloaded,
    CommentPrepended(Comment),
    Navigated(String),
}

pub struct RequestExecutor {
    http: Client,
    base_url: Url,
    context: PageContext,
    page: Arc<dyn PageView>,
    last_task_id: AtomicU64,
}

impl RequestExecutor {
    pub fn new(server_url: &str, context: PageContext, page: Arc<dyn PageView>) -> Result<Self> {
        Self::with_client(Client::new(), server_url, context, page)
    }

    pub fn with_client(
        http: Client,
        server_url: &str,
        context: PageContext,
        page: Arc<dyn PageView>,
    ) -> Result<Self> {
        let base_url = Url::parse(server_url)
            .with_context(|| format!("invalid server url '{server_url}'"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("server url '{server_url}' cannot be used as a base url");
        }

        Ok(Self {
            http,
            base_url,
            context,
            page,
            last_task_id: AtomicU64::new(0),
        })
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn page(&self) -> &Arc<dyn PageView> {
        &self.page
    }

    pub fn last_task_id(&self) -> u64 {
        self.last_task_id.load(Ordering::SeqCst)
    }

    pub async fn execute(&self, action: ActionRequest) -> Result<ActionOutcome, ActionError> {
        let kind = action.kind();
        info!(action = %kind, "dispatching complaint action");

        let result = match action {
            ActionRequest::UpdateStatus {
                status,
                resolution_notes,
            } => self.update_status(status, resolution_notes).await,
            ActionRequest::AddComment { text, is_internal } => {
                self.add_comment(text, is_internal).await
            }
            ActionRequest::AssignUser { user_id } => self.assign_user(user_id).await,
            ActionRequest::CreateComplaint { form_fields } => {
                self.create_complaint(form_fields).await
            }
        };

        match &result {
            Ok(outcome) => info!(action = %kind, ?outcome, "complaint action applied"),
            Err(err) => self.report(err),
        }
        result
    }

    pub fn spawn(self: &Arc<Self>, action: ActionRequest) -> ActionTask {
        let id = self.last_task_id.fetch_add(1, Ordering::SeqCst) + 1;
        let kind = action.kind();
        let executor = Arc::clone(self);
        let (future, abort) = abortable(async move { executor.execute(action).await });
        let handle = tokio::spawn(future.instrument(info_span!("complaint_action", id, action = %kind)));

        ActionTask {
            id,
            kind,
            abort,
            handle,
        }
    }

    async fn update_status(
        &self,
        status: String,
        resolution_notes: String,
    ) -> Result<ActionOutcome, ActionError> {
        let kind = ActionKind::UpdateStatus;
        let ticket = self.ticket(kind)?;
        let request = self
            .http
            .post(self.endpoint(
                kind,
                &format!("/api/complaint/{}/status/", ticket.path_segment()),
            )?)
            .json(&UpdateStatusBody {
                status,
                resolution_notes,
            });

        match self.send::<StatusUpdated>(kind, request).await? {
            ActionResult::Success(payload) => {
                debug!(ticket = %ticket, status = ?payload.status, "status updated");
                self.page.reload();
                Ok(ActionOutcome::Reloaded)
            }
            ActionResult::Failure(failure) => Err(application_error(kind, failure)),
        }
    }

    async fn add_comment(
        &self,
        text: String,
        is_internal: bool,
    ) -> Result<ActionOutcome, ActionError> {
        let kind = ActionKind::AddComment;
        if text.trim().is_empty() {
            return Err(ActionError::validation(kind, EMPTY_COMMENT_MESSAGE));
        }

        let ticket = self.ticket(kind)?;
        let request = self
            .http
            .post(self.endpoint(
                kind,
                &format!("/api/complaint/{}/comment/", ticket.path_segment()),
            )?)
            .json(&AddCommentBody {
                comment: text,
                is_internal,
            });

        let payload = match self.send::<CommentAdded>(kind, request).await? {
            ActionResult::Success(payload) => payload,
            ActionResult::Failure(failure) => return Err(application_error(kind, failure)),
        };
        let Some(comment) = payload.comment else {
            warn!(ticket = %ticket, "comment response reported success without a comment");
            return Err(ActionError::malformed(
                kind,
                "success response carried no comment",
            ));
        };

        let comment = Comment::from(comment);
        let ids = &self.context.elements;
        if self.page.has_element(&ids.comments_list) {
            self.page
                .prepend_html(&ids.comments_list, &render_comment(&comment));
        } else {
            warn!(element = %ids.comments_list, "comment list missing; new comment not displayed");
        }
        self.page.set_value(&ids.comment_text, "");
        if self.page.has_element(&ids.is_internal) {
            self.page.set_checked(&ids.is_internal, false);
        }

        Ok(ActionOutcome::CommentPrepended(comment))
    }

    async fn assign_user(&self, user_id: Option<String>) -> Result<ActionOutcome, ActionError> {
        let kind = ActionKind::AssignUser;
        let ticket = self.ticket(kind)?;
        let user_id = user_id.filter(|user_id| !user_id.is_empty());
        let request = self
            .http
            .post(self.endpoint(
                kind,
                &format!("/api/complaint/{}/assign/", ticket.path_segment()),
            )?)
            .json(&AssignBody {
                user_id: user_id.clone(),
            });

        match self.send::<Assigned>(kind, request).await? {
            ActionResult::Success(_) => {
                debug!(ticket = %ticket, user_id = ?user_id, "assignment saved");
                self.page.reload();
                Ok(ActionOutcome::Reloaded)
            }
            ActionResult::Failure(failure) => Err(application_error(kind, failure)),
        }
    }

    async fn create_complaint(
        &self,
        mut form_fields: Vec<FormField>,
    ) -> Result<ActionOutcome, ActionError> {
        let kind = ActionKind::CreateComplaint;
        let ids = &self.context.elements;
        if self
            .page
            .value(&ids.category)
            .is_some_and(|category| category.is_empty())
        {
            set_text_field(&mut form_fields, CATEGORY_FIELD, "");
        }

        let request = self
            .http
            .post(self.endpoint(kind, CREATE_COMPLAINT_PATH)?)
            .multipart(multipart_form(kind, form_fields)?);

        let created = match self.send::<ComplaintCreated>(kind, request).await? {
            ActionResult::Success(created) => created,
            ActionResult::Failure(failure) => return Err(application_error(kind, failure)),
        };

        let target = match (created.redirect, created.ticket_number) {
            (Some(redirect), _) if !redirect.is_empty() => redirect,
            (_, Some(ticket_number)) => TicketNumber::parse(ticket_number)
                .map_err(|err| ActionError::malformed(kind, err.to_string()))?
                .detail_path(),
            _ => {
                return Err(ActionError::malformed(
                    kind,
                    "success response carried neither redirect nor ticket_number",
                ))
            }
        };

        self.page.set_visible(&ids.error_message, false);
        self.page.navigate(&target);
        Ok(ActionOutcome::Navigated(target))
    }

    async fn send<P>(
        &self,
        kind: ActionKind,
        request: RequestBuilder,
    ) -> Result<ActionResult<P>, ActionError>
    where
        P: DeserializeOwned,
    {
        let response = self
            .with_session_headers(request)
            .send()
            .await
            .map_err(|source| {
                warn!(action = %kind, error = %source, "complaint request failed to send");
                ActionError::Transport {
                    action: kind,
                    status: None,
                    source: Some(source),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(action = %kind, %status, %body, "server returned an error status");
            return Err(ActionError::Transport {
                action: kind,
                status: Some(status),
                source: None,
            });
        }

        let body = response.bytes().await.map_err(|source| {
            warn!(action = %kind, error = %source, "failed to read response body");
            ActionError::Transport {
                action: kind,
                status: Some(status),
                source: Some(source),
            }
        })?;

        let envelope: Envelope<P> = serde_json::from_slice(&body).map_err(|err| {
            warn!(
                action = %kind,
                error = %err,
                body = %String::from_utf8_lossy(&body),
                "failed to parse response"
            );
            ActionError::malformed(kind, err.to_string())
        })?;
        Ok(envelope.into_result())
    }

    fn with_session_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let cookies = self.page.cookie();
        let mut request = request;
        if let Some(token) = get_cookie(&cookies, CSRF_COOKIE) {
            request = request.header(CSRF_HEADER, token);
        }
        if !cookies.trim().is_empty() {
            request = request.header(COOKIE, cookies);
        }
        request
    }

    fn ticket(&self, kind: ActionKind) -> Result<&TicketNumber, ActionError> {
        self.context.ticket_number.as_ref().ok_or_else(|| {
            ActionError::validation(kind, "This page is not bound to a complaint ticket.")
        })
    }

    fn endpoint(&self, kind: ActionKind, path: &str) -> Result<Url, ActionError> {
        self.base_url
            .join(path)
            .map_err(|err| ActionError::validation(kind, format!("invalid request path {path}: {err}")))
    }

    fn report(&self, err: &ActionError) {
        match err {
            ActionError::Application { action, .. } => {
                info!(action = %action, error = %err, "server rejected complaint action")
            }
            ActionError::MissingElement { action, element } => {
                warn!(action = %action, element = %element, "page element missing");
            }
            _ => debug!(action = %err.action(), error = %err, "complaint action failed"),
        }

        if !err.is_user_visible() {
            return;
        }
        if err.action() == ActionKind::CreateComplaint {
            self.show_inline_error(&err.to_string());
        } else {
            self.page.alert(&err.to_string());
        }
    }

    fn show_inline_error(&self, message: &str) {
        let id = &self.context.elements.error_message;
        if !self.page.has_element(id) {
            self.page.alert(message);
            return;
        }
        self.page.set_text(id, message);
        self.page.set_visible(id, true);
        self.page.scroll_into_view(id);
    }
}

fn application_error(kind: ActionKind, failure: ServerFailure) -> ActionError {
    ActionError::Application {
        action: kind,
        message: failure.message(),
        field_errors: failure.field_messages(),
    }
}

fn multipart_form(kind: ActionKind, fields: Vec<FormField>) -> Result<Form, ActionError> {
    let mut form = Form::new();
    for field in fields {
        form = match field.value {
            FormValue::Text(value) => form.text(field.name, value),
            FormValue::File {
                filename,
                content_type,
                bytes,
            } => {
                let mut part = Part::bytes(bytes).file_name(filename);
                if let Some(content_type) = content_type {
                    part = part.mime_str(&content_type).map_err(|err| {
                        ActionError::validation(
                            kind,
                            format!("invalid content type '{content_type}': {err}"),
                        )
                    })?;
                }
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

// Aborting drops the request before any page mutation.
pub struct ActionTask {
    id: u64,
    kind: ActionKind,
    abort: AbortHandle,
    handle: JoinHandle<Result<Result<ActionOutcome, ActionError>, Aborted>>,
}

impl ActionTask {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn outcome(self) -> Result<ActionOutcome, ActionError> {
        match self.handle.await {
            Ok(Ok(result)) => result,
            Ok(Err(Aborted)) => Err(ActionError::Cancelled { action: self.kind }),
            Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
            Err(_) => Err(ActionError::Cancelled { action: self.kind }),
        }
    }
}

#[cfg(test)]
#[path = "tests/executor_tests.rs"]
mod tests;

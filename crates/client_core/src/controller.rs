//! Binds page forms and buttons to complaint actions.

use std::sync::{Arc, Mutex, PoisonError};

use shared::{domain::ActionKind, protocol::ActionRequest};
use tracing::{debug, warn};

use crate::{
    error::ActionError,
    executor::{ActionOutcome, RequestExecutor},
    page::PageView,
    users::UserDirectory,
};

pub const ASSIGN_LABEL: &str = "Assign";
pub const SAVE_ASSIGNMENT_LABEL: &str = "Save Assignment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentState {
    Collapsed,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentStep {
    Opened,
    Saved(ActionOutcome),
}

pub struct PageController {
    executor: Arc<RequestExecutor>,
    users: Arc<dyn UserDirectory>,
    assignment: Mutex<AssignmentState>,
}

impl PageController {
    pub fn new(executor: Arc<RequestExecutor>, users: Arc<dyn UserDirectory>) -> Self {
        let select = &executor.context().elements.assign_select;
        let initial = if executor.page().is_visible(select).unwrap_or(false) {
            AssignmentState::Editing
        } else {
            AssignmentState::Collapsed
        };

        Self {
            executor,
            users,
            assignment: Mutex::new(initial),
        }
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn assignment_state(&self) -> AssignmentState {
        *self
            .assignment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn submit_status_form(&self) -> Result<ActionOutcome, ActionError> {
        let ids = &self.executor.context().elements;
        self.require_element(ActionKind::UpdateStatus, &ids.status_form)?;

        let page = self.page();
        let action = ActionRequest::UpdateStatus {
            status: page.value(&ids.status_select).unwrap_or_default(),
            resolution_notes: page.value(&ids.resolution_notes).unwrap_or_default(),
        };
        self.executor.execute(action).await
    }

    pub async fn submit_comment_form(&self) -> Result<ActionOutcome, ActionError> {
        let ids = &self.executor.context().elements;
        self.require_element(ActionKind::AddComment, &ids.comment_form)?;

        let page = self.page();
        let action = ActionRequest::AddComment {
            text: page.value(&ids.comment_text).unwrap_or_default(),
            is_internal: page.checked(&ids.is_internal).unwrap_or(false),
        };
        self.executor.execute(action).await
    }

    pub async fn submit_complaint_form(&self) -> Result<ActionOutcome, ActionError> {
        let ids = &self.executor.context().elements;
        let Some(form_fields) = self.page().form_fields(&ids.complaint_form) else {
            return Err(self.missing(ActionKind::CreateComplaint, &ids.complaint_form));
        };
        self.executor
            .execute(ActionRequest::CreateComplaint { form_fields })
            .await
    }

    pub async fn click_assign_button(&self) -> Result<AssignmentStep, ActionError> {
        let ids = &self.executor.context().elements;
        self.require_element(ActionKind::AssignUser, &ids.assign_button)?;

        match self.assignment_state() {
            AssignmentState::Collapsed => {
                let page = self.page();
                page.set_visible(&ids.assign_select, true);
                page.set_text(&ids.assign_button, SAVE_ASSIGNMENT_LABEL);
                self.set_assignment_state(AssignmentState::Editing);
                self.load_users().await;
                Ok(AssignmentStep::Opened)
            }
            AssignmentState::Editing => {
                let user_id = self.page().value(&ids.assign_select);
                let outcome = self
                    .executor
                    .execute(ActionRequest::AssignUser { user_id })
                    .await?;
                let page = self.page();
                page.set_visible(&ids.assign_select, false);
                page.set_text(&ids.assign_button, ASSIGN_LABEL);
                self.set_assignment_state(AssignmentState::Collapsed);
                Ok(AssignmentStep::Saved(outcome))
            }
        }
    }

    async fn load_users(&self) {
        let context = self.executor.context();
        let Some(ticket_number) = context.ticket_number.as_ref() else {
            return;
        };
        let select = &context.elements.assign_select;

        match self.users.assignable_users(ticket_number).await {
            Ok(users) if users.is_empty() => {}
            Ok(users) => {
                if self.page().option_count(select) > 1 {
                    debug!(select = %select, "assignment selector already populated");
                    return;
                }
                for user in &users {
                    self.page().append_option(select, user);
                }
            }
            Err(err) => warn!(ticket = %ticket_number, error = %err, "failed to load assignable users"),
        }
    }

    fn set_assignment_state(&self, state: AssignmentState) {
        *self
            .assignment
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn page(&self) -> &dyn PageView {
        self.executor.page().as_ref()
    }

    fn require_element(&self, action: ActionKind, id: &str) -> Result<(), ActionError> {
        if self.page().has_element(id) {
            Ok(())
        } else {
            Err(self.missing(action, id))
        }
    }

    fn missing(&self, action: ActionKind, id: &str) -> ActionError {
        warn!(action = %action, element = %id, "page element missing");
        ActionError::MissingElement {
            action,
            element: id.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

//! Page port: what the executor may read from and change on the hosting page.

use shared::{domain::TicketNumber, protocol::FormField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub status_form: String,
    pub status_select: String,
    pub resolution_notes: String,
    pub comment_form: String,
    pub comment_text: String,
    pub is_internal: String,
    pub comments_list: String,
    pub assign_button: String,
    pub assign_select: String,
    pub assigned_user: String,
    pub complaint_form: String,
    pub category: String,
    pub error_message: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            status_form: "statusForm".into(),
            status_select: "status-select".into(),
            resolution_notes: "resolution-notes".into(),
            comment_form: "commentForm".into(),
            comment_text: "comment-text".into(),
            is_internal: "is-internal".into(),
            comments_list: "comments-list".into(),
            assign_button: "assign-btn".into(),
            assign_select: "assign-select".into(),
            assigned_user: "assigned-user".into(),
            complaint_form: "complaintForm".into(),
            category: "category".into(),
            error_message: "errorMessage".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub ticket_number: Option<TicketNumber>,
    pub elements: ElementIds,
}

impl PageContext {
    pub fn for_ticket(ticket_number: TicketNumber) -> Self {
        Self {
            ticket_number: Some(ticket_number),
            elements: ElementIds::default(),
        }
    }

    pub fn without_ticket() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Operations on elements that do not exist are no-ops; reads return `None`.
pub trait PageView: Send + Sync {
    fn cookie(&self) -> String;
    fn has_element(&self, id: &str) -> bool;
    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&self, id: &str, value: &str);
    fn checked(&self, id: &str) -> Option<bool>;
    fn set_checked(&self, id: &str, checked: bool);
    fn set_text(&self, id: &str, text: &str);
    fn is_visible(&self, id: &str) -> Option<bool>;
    fn set_visible(&self, id: &str, visible: bool);
    fn option_count(&self, id: &str) -> usize;
    fn append_option(&self, id: &str, option: &SelectOption);
    fn prepend_html(&self, id: &str, html: &str);
    fn form_fields(&self, id: &str) -> Option<Vec<FormField>>;
    fn scroll_into_view(&self, id: &str);
    fn alert(&self, message: &str);
    fn reload(&self);
    fn navigate(&self, url: &str);
}

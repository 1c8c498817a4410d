use serde::{Deserialize, Serialize};

use crate::{
    domain::{ActionKind, Comment},
    error::FieldErrorMap,
};

pub const UNKNOWN_ERROR: &str = "Unknown error";
pub const CATEGORY_FIELD: &str = "category";

#[derive(Debug, Clone)]
pub enum ActionRequest {
    UpdateStatus {
        status: String,
        resolution_notes: String,
    },
    AddComment {
        text: String,
        is_internal: bool,
    },
    AssignUser {
        user_id: Option<String>,
    },
    CreateComplaint {
        form_fields: Vec<FormField>,
    },
}

impl ActionRequest {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionRequest::UpdateStatus { .. } => ActionKind::UpdateStatus,
            ActionRequest::AddComment { .. } => ActionKind::AddComment,
            ActionRequest::AssignUser { .. } => ActionKind::AssignUser,
            ActionRequest::CreateComplaint { .. } => ActionKind::CreateComplaint,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateStatusBody {
    pub status: String,
    pub resolution_notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddCommentBody {
    pub comment: String,
    pub is_internal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignBody {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File {
        filename: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                filename: filename.into(),
                content_type,
                bytes,
            },
        }
    }
}

// FormData.set: first match is replaced in place, later ones removed.
pub fn set_text_field(fields: &mut Vec<FormField>, name: &str, value: &str) {
    let mut replaced = false;
    fields.retain_mut(|field| {
        if field.name != name {
            return true;
        }
        if replaced {
            return false;
        }
        field.value = FormValue::Text(value.to_string());
        replaced = true;
        true
    });
    if !replaced {
        fields.push(FormField::text(name, value));
    }
}

#[derive(Debug, Deserialize)]
pub struct Envelope<P> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<FieldErrorMap>,
    #[serde(flatten)]
    pub payload: P,
}

impl<P> Envelope<P> {
    pub fn into_result(self) -> ActionResult<P> {
        if self.success {
            ActionResult::Success(self.payload)
        } else {
            ActionResult::Failure(ServerFailure {
                errors: self.errors,
                error: self.error,
            })
        }
    }
}

#[derive(Debug)]
pub enum ActionResult<P> {
    Success(P),
    Failure(ServerFailure),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerFailure {
    pub errors: Option<FieldErrorMap>,
    pub error: Option<String>,
}

impl ServerFailure {
    pub fn field_messages(&self) -> Vec<String> {
        self.errors
            .as_ref()
            .map(FieldErrorMap::messages)
            .unwrap_or_default()
    }

    pub fn message(&self) -> String {
        let field_messages = self.field_messages();
        if !field_messages.is_empty() {
            return field_messages.join(" ");
        }
        match self.error.as_deref() {
            Some(error) if !error.is_empty() => error.to_string(),
            _ => UNKNOWN_ERROR.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdated {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentAdded {
    #[serde(default)]
    pub comment: Option<CommentPayload>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Assigned {}

#[derive(Debug, Default, Deserialize)]
pub struct ComplaintCreated {
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub ticket_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user: String,
    #[serde(default)]
    pub is_internal: bool,
    pub created_at: String,
    pub comment: String,
}

impl From<CommentPayload> for Comment {
    fn from(value: CommentPayload) -> Self {
        Self {
            author: value.user,
            is_internal: value.is_internal,
            created_at: value.created_at,
            text: value.comment,
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;

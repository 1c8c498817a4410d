use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Everything that would end or re-route a single URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TicketNumberError {
    #[error("ticket number must not be empty")]
    Empty,
    #[error("ticket number '{0}' must not contain '/'")]
    ContainsSlash(String),
    #[error("ticket number '{0}' must not be a dot segment")]
    DotSegment(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(String);

impl TicketNumber {
    pub fn parse(raw: impl Into<String>) -> Result<Self, TicketNumberError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TicketNumberError::Empty);
        }
        if trimmed.contains('/') {
            return Err(TicketNumberError::ContainsSlash(trimmed.to_string()));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(TicketNumberError::DotSegment(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ticket percent-encoded as one URL path segment.
    pub fn path_segment(&self) -> String {
        utf8_percent_encode(&self.0, PATH_SEGMENT).to_string()
    }

    pub fn detail_path(&self) -> String {
        format!("/complaint/{}/", self.path_segment())
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UpdateStatus,
    AddComment,
    AssignUser,
    CreateComplaint,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::UpdateStatus => "update_status",
            ActionKind::AddComment => "add_comment",
            ActionKind::AssignUser => "assign_user",
            ActionKind::CreateComplaint => "create_complaint",
        }
    }

    pub fn failure_prefix(self) -> &'static str {
        match self {
            ActionKind::UpdateStatus => "Failed to update status: ",
            ActionKind::AddComment => "Failed to add comment: ",
            ActionKind::AssignUser => "Failed to assign: ",
            ActionKind::CreateComplaint => "Failed to create complaint. ",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub is_internal: bool,
    pub created_at: String,
    pub text: String,
}

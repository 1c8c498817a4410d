//! Headless stand-ins for the complaint templates.

use std::path::Path;

use anyhow::{Context, Result};
use client_core::{ElementState, MemoryPage, PageEffect, PageView, SelectOption};
use shared::protocol::FormField;

pub struct DetailForm<'a> {
    pub status: &'a str,
    pub resolution_notes: &'a str,
    pub comment: &'a str,
    pub is_internal: bool,
}

/// Page for `/complaint/{ticket}/` with the given form values filled in.
pub fn detail_page(cookie: String, form: &DetailForm<'_>) -> MemoryPage {
    MemoryPage::new(cookie)
        .with_element("statusForm", ElementState::form(Vec::new()))
        .with_element("status-select", ElementState::with_value(form.status))
        .with_element(
            "resolution-notes",
            ElementState::with_value(form.resolution_notes),
        )
        .with_element("commentForm", ElementState::form(Vec::new()))
        .with_element("comment-text", ElementState::with_value(form.comment))
        .with_element("is-internal", ElementState::checkbox(form.is_internal))
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

pub fn create_page(cookie: String, fields: Vec<FormField>, category: Option<&str>) -> MemoryPage {
    MemoryPage::new(cookie)
        .with_element("complaintForm", ElementState::form(fields))
        .with_element("category", ElementState::with_value(category.unwrap_or_default()))
        .with_element("errorMessage", ElementState::hidden())
}

pub async fn attachment_field(path: &Path) -> Result<FormField> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read attachment '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let content_type = mime_guess::from_path(path)
        .first_raw()
        .map(str::to_string);
    Ok(FormField::file("attachment", filename, content_type, bytes))
}

/// Prints what a browser would have shown after the action.
pub fn print_report(page: &MemoryPage) {
    for effect in page.effects() {
        match effect {
            PageEffect::Alert(message) => println!("alert: {message}"),
            PageEffect::Reload => println!("page reloaded"),
            PageEffect::Navigate(url) => println!("navigated to {url}"),
        }
    }

    if let Some(list) = page.element("comments-list") {
        for html in &list.children {
            println!("new comment: {html}");
        }
    }

    if let Some(banner) = page.element("errorMessage") {
        if banner.visible && !banner.text.is_empty() {
            println!("error: {}", banner.text);
        }
    }

    if page.is_visible("assign-select") == Some(true) {
        let options: Vec<String> = page
            .element("assign-select")
            .map(|select| {
                select
                    .options
                    .iter()
                    .map(|option| format!("{}={}", option.value, option.label))
                    .collect()
            })
            .unwrap_or_default();
        println!("assignment selector open: [{}]", options.join(", "));
    }
}

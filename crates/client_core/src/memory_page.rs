use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use shared::protocol::FormField;

use crate::page::{PageView, SelectOption};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    pub value: String,
    pub checked: bool,
    pub visible: bool,
    pub text: String,
    pub options: Vec<SelectOption>,
    pub children: Vec<String>,
    pub form_fields: Vec<FormField>,
    pub scrolled_into_view: bool,
}

impl ElementState {
    pub fn visible() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            visible: true,
            ..Self::default()
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: true,
            ..Self::default()
        }
    }

    pub fn checkbox(checked: bool) -> Self {
        Self {
            checked,
            visible: true,
            ..Self::default()
        }
    }

    pub fn form(fields: Vec<FormField>) -> Self {
        Self {
            form_fields: fields,
            visible: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEffect {
    Alert(String),
    Reload,
    Navigate(String),
}

#[derive(Debug, Default)]
struct MemoryPageState {
    cookie: String,
    elements: HashMap<String, ElementState>,
    effects: Vec<PageEffect>,
}

/// Headless page that keeps element state in memory and records effects.
#[derive(Debug, Default)]
pub struct MemoryPage {
    state: Mutex<MemoryPageState>,
}

impl MemoryPage {
    pub fn new(cookie: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(MemoryPageState {
                cookie: cookie.into(),
                ..MemoryPageState::default()
            }),
        }
    }

    pub fn with_element(self, id: impl Into<String>, element: ElementState) -> Self {
        self.insert_element(id, element);
        self
    }

    pub fn insert_element(&self, id: impl Into<String>, element: ElementState) {
        self.lock().elements.insert(id.into(), element);
    }

    pub fn element(&self, id: &str) -> Option<ElementState> {
        self.lock().elements.get(id).cloned()
    }

    pub fn elements(&self) -> HashMap<String, ElementState> {
        self.lock().elements.clone()
    }

    pub fn effects(&self) -> Vec<PageEffect> {
        self.lock().effects.clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock()
            .effects
            .iter()
            .filter_map(|effect| match effect {
                PageEffect::Alert(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryPageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut ElementState)) {
        if let Some(element) = self.lock().elements.get_mut(id) {
            apply(element);
        }
    }

    fn read<T>(&self, id: &str, read: impl FnOnce(&ElementState) -> T) -> Option<T> {
        self.lock().elements.get(id).map(read)
    }
}

impl PageView for MemoryPage {
    fn cookie(&self) -> String {
        self.lock().cookie.clone()
    }

    fn has_element(&self, id: &str) -> bool {
        self.lock().elements.contains_key(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        self.read(id, |element| element.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) {
        self.update(id, |element| element.value = value.to_string());
    }

    fn checked(&self, id: &str) -> Option<bool> {
        self.read(id, |element| element.checked)
    }

    fn set_checked(&self, id: &str, checked: bool) {
        self.update(id, |element| element.checked = checked);
    }

    fn set_text(&self, id: &str, text: &str) {
        self.update(id, |element| element.text = text.to_string());
    }

    fn is_visible(&self, id: &str) -> Option<bool> {
        self.read(id, |element| element.visible)
    }

    fn set_visible(&self, id: &str, visible: bool) {
        self.update(id, |element| element.visible = visible);
    }

    fn option_count(&self, id: &str) -> usize {
        self.read(id, |element| element.options.len())
            .unwrap_or_default()
    }

    fn append_option(&self, id: &str, option: &SelectOption) {
        self.update(id, |element| element.options.push(option.clone()));
    }

    fn prepend_html(&self, id: &str, html: &str) {
        self.update(id, |element| element.children.insert(0, html.to_string()));
    }

    fn form_fields(&self, id: &str) -> Option<Vec<FormField>> {
        self.read(id, |element| element.form_fields.clone())
    }

    fn scroll_into_view(&self, id: &str) {
        self.update(id, |element| element.scrolled_into_view = true);
    }

    fn alert(&self, message: &str) {
        self.lock()
            .effects
            .push(PageEffect::Alert(message.to_string()));
    }

    fn reload(&self) {
        self.lock().effects.push(PageEffect::Reload);
    }

    fn navigate(&self, url: &str) {
        self.lock()
            .effects
            .push(PageEffect::Navigate(url.to_string()));
    }
}

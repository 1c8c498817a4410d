use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorEntry {
    Text(String),
    Detailed { message: String },
    Other(serde_json::Value),
}

impl ErrorEntry {
    pub fn message(&self) -> String {
        match self {
            ErrorEntry::Text(text) => text.clone(),
            ErrorEntry::Detailed { message } => message.clone(),
            ErrorEntry::Other(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    Many(Vec<ErrorEntry>),
    One(ErrorEntry),
}

impl FieldErrors {
    pub fn entries(&self) -> &[ErrorEntry] {
        match self {
            FieldErrors::Many(entries) => entries,
            FieldErrors::One(entry) => std::slice::from_ref(entry),
        }
    }
}

// Keeps the order the server listed the fields in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrorMap(Vec<(String, FieldErrors)>);

impl FieldErrorMap {
    pub fn new(entries: Vec<(String, FieldErrors)>) -> Self {
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(field, _)| field.as_str())
    }

    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, errors)| {
                errors
                    .entries()
                    .iter()
                    .map(move |entry| format!("{field}: {}", entry.message()))
            })
            .collect()
    }
}

impl<'de> Deserialize<'de> for FieldErrorMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldErrorMapVisitor;

        impl<'de> Visitor<'de> for FieldErrorMapVisitor {
            type Value = FieldErrorMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of field names to error messages")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((field, errors)) = access.next_entry::<String, FieldErrors>()? {
                    entries.push((field, errors));
                }
                Ok(FieldErrorMap(entries))
            }
        }

        deserializer.deserialize_map(FieldErrorMapVisitor)
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;

// Alfred script filter output.
// Item records and the `{"items": [...]}` envelope printed on stdout.

use serde::Serialize;

use crate::sources::{DocEntry, Repository};

/// One row in Alfred's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub uid: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}

impl Item {
    /// A non-actionable row describing a failure.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            uid: "error".to_string(),
            item_type: None,
            title: "Error".to_string(),
            subtitle: Some(message.into()),
            arg: None,
            autocomplete: None,
            valid: Some(false),
        }
    }
}

impl From<DocEntry> for Item {
    fn from(entry: DocEntry) -> Self {
        Self {
            uid: entry.path,
            item_type: Some("default".to_string()),
            title: entry.name.clone(),
            subtitle: Some(entry.entry_type),
            arg: Some(entry.name.clone()),
            autocomplete: Some(entry.name),
            valid: None,
        }
    }
}

impl From<Repository> for Item {
    fn from(repo: Repository) -> Self {
        Self {
            arg: Some(format!("https://github.dev/{}", repo.full_name)),
            uid: repo.full_name,
            item_type: None,
            title: repo.name,
            subtitle: repo.description,
            autocomplete: None,
            valid: None,
        }
    }
}

/// The document Alfred expects on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptFilterOutput {
    pub items: Vec<Item>,
}

impl ScriptFilterOutput {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            items: vec![Item::error(message)],
        }
    }
}

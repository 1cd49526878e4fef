use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Library-independent view of a thread as seen by the scanner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadState {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub name: String,
    pub archived: bool,
    pub locked: bool,
    pub archived_at: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedFieldSnapshot {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedSnapshot {
    pub title: Option<String>,
    pub description: Option<String>,
    pub footer_text: Option<String>,
    pub author_name: Option<String>,
    pub fields: Vec<EmbedFieldSnapshot>,
}

/// A message from a thread's recent history.
///
/// `components` holds the raw component tree so that formats the client
/// library does not model are still searchable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub id: u64,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub created_at: i64,
    pub content: String,
    pub embeds: Vec<EmbedSnapshot>,
    pub components: Value,
}

//! Closure marker detection over a thread's recent history.
//!
//! A thread counts as closed when any recent message carries the marker
//! phrase in its text, in any embed surface, or anywhere inside its
//! component tree. Other bots often post the closing notice as a button or
//! a container component rather than as plain text, so components are
//! walked recursively as raw JSON.

use serde_json::Value;

use crate::config::DEFAULT_CLOSED_MARKER;
use crate::snapshot::{EmbedSnapshot, MessageSnapshot};

/// Component keys whose values are identifiers rather than visible text.
pub const IGNORED_COMPONENT_KEYS: &[&str] = &["custom_id", "url", "proxy_url", "id", "sku_id"];

const MAX_COMPONENT_DEPTH: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerLocation {
    Content,
    EmbedTitle,
    EmbedDescription,
    EmbedFooter,
    EmbedAuthor,
    EmbedFieldName,
    EmbedFieldValue,
    Component,
}

impl MarkerLocation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Content => "message content",
            Self::EmbedTitle => "embed title",
            Self::EmbedDescription => "embed description",
            Self::EmbedFooter => "embed footer",
            Self::EmbedAuthor => "embed author",
            Self::EmbedFieldName => "embed field name",
            Self::EmbedFieldValue => "embed field value",
            Self::Component => "component",
        }
    }
}

/// The most recent message carrying the closure marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosureMatch {
    pub message_id: u64,
    pub closed_at: i64,
    pub location: MarkerLocation,
}

/// Case-insensitive marker phrase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosedMarker {
    phrase: String,
    needle: String,
}

impl Default for ClosedMarker {
    fn default() -> Self {
        Self {
            phrase: DEFAULT_CLOSED_MARKER.to_owned(),
            needle: DEFAULT_CLOSED_MARKER.to_lowercase(),
        }
    }
}

impl ClosedMarker {
    /// Returns `None` for a blank phrase, which would match everything.
    pub fn new(phrase: impl Into<String>) -> Option<Self> {
        let phrase = phrase.into().trim().to_owned();
        if phrase.is_empty() {
            return None;
        }

        let needle = phrase.to_lowercase();
        Some(Self { phrase, needle })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn matches(&self, text: &str) -> bool {
        !text.is_empty() && text.to_lowercase().contains(&self.needle)
    }
}

/// Scan `history` (most recent first) and return the first message that
/// carries the marker.
pub fn find_closure(history: &[MessageSnapshot], marker: &ClosedMarker) -> Option<ClosureMatch> {
    history.iter().find_map(|message| {
        locate_marker(message, marker).map(|location| ClosureMatch {
            message_id: message.id,
            closed_at: message.created_at,
            location,
        })
    })
}

/// Where in `message` the marker appears, if anywhere.
pub fn locate_marker(message: &MessageSnapshot, marker: &ClosedMarker) -> Option<MarkerLocation> {
    if marker.matches(&message.content) {
        return Some(MarkerLocation::Content);
    }

    if let Some(location) = message
        .embeds
        .iter()
        .find_map(|embed| locate_in_embed(embed, marker))
    {
        return Some(location);
    }

    component_contains(&message.components, marker, 0).then_some(MarkerLocation::Component)
}

fn locate_in_embed(embed: &EmbedSnapshot, marker: &ClosedMarker) -> Option<MarkerLocation> {
    let optional_surfaces = [
        (&embed.title, MarkerLocation::EmbedTitle),
        (&embed.description, MarkerLocation::EmbedDescription),
        (&embed.footer_text, MarkerLocation::EmbedFooter),
        (&embed.author_name, MarkerLocation::EmbedAuthor),
    ];

    for (text, location) in optional_surfaces {
        if text.as_deref().is_some_and(|text| marker.matches(text)) {
            return Some(location);
        }
    }

    for field in &embed.fields {
        if marker.matches(&field.name) {
            return Some(MarkerLocation::EmbedFieldName);
        }
        if marker.matches(&field.value) {
            return Some(MarkerLocation::EmbedFieldValue);
        }
    }

    None
}

fn component_contains(value: &Value, marker: &ClosedMarker, depth: usize) -> bool {
    if depth > MAX_COMPONENT_DEPTH {
        return false;
    }

    match value {
        Value::String(text) => marker.matches(text),
        Value::Array(items) => items
            .iter()
            .any(|item| component_contains(item, marker, depth + 1)),
        Value::Object(map) => map.iter().any(|(key, item)| {
            !IGNORED_COMPONENT_KEYS.contains(&key.as_str())
                && component_contains(item, marker, depth + 1)
        }),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ClosedMarker, MarkerLocation, find_closure, locate_marker};
    use crate::snapshot::{EmbedFieldSnapshot, EmbedSnapshot, MessageSnapshot};

    fn marker() -> ClosedMarker {
        ClosedMarker::new("Thread Closed").expect("non-empty marker")
    }

    fn message(id: u64, created_at: i64) -> MessageSnapshot {
        MessageSnapshot {
            id,
            created_at,
            ..Default::default()
        }
    }

    #[test]
    fn blank_marker_is_rejected() {
        assert!(ClosedMarker::new("").is_none());
        assert!(ClosedMarker::new("   ").is_none());
    }

    #[test]
    fn matches_plain_content_case_insensitively() {
        let mut msg = message(1, 10);
        msg.content = "Staff: this THREAD CLOSED by request".to_owned();

        assert_eq!(
            locate_marker(&msg, &marker()),
            Some(MarkerLocation::Content)
        );
    }

    #[test]
    fn matches_embed_title() {
        let mut msg = message(1, 10);
        msg.embeds.push(EmbedSnapshot {
            title: Some("Thread closed".to_owned()),
            ..Default::default()
        });

        assert_eq!(
            locate_marker(&msg, &marker()),
            Some(MarkerLocation::EmbedTitle)
        );
    }

    #[test]
    fn matches_embed_footer_and_author() {
        let mut footer = message(1, 10);
        footer.embeds.push(EmbedSnapshot {
            footer_text: Some("thread closed • ticket bot".to_owned()),
            ..Default::default()
        });
        assert_eq!(
            locate_marker(&footer, &marker()),
            Some(MarkerLocation::EmbedFooter)
        );

        let mut author = message(2, 10);
        author.embeds.push(EmbedSnapshot {
            author_name: Some("Thread Closed".to_owned()),
            ..Default::default()
        });
        assert_eq!(
            locate_marker(&author, &marker()),
            Some(MarkerLocation::EmbedAuthor)
        );
    }

    #[test]
    fn matches_embed_field_value() {
        let mut msg = message(1, 10);
        msg.embeds.push(EmbedSnapshot {
            title: Some("Ticket update".to_owned()),
            fields: vec![EmbedFieldSnapshot {
                name: "Status".to_owned(),
                value: "Thread closed by moderator".to_owned(),
            }],
            ..Default::default()
        });

        assert_eq!(
            locate_marker(&msg, &marker()),
            Some(MarkerLocation::EmbedFieldValue)
        );
    }

    #[test]
    fn matches_nested_component_label() {
        let mut msg = message(1, 10);
        msg.components = json!([
            {
                "type": 17,
                "components": [
                    { "type": 10, "content": "Ticket #42" },
                    {
                        "type": 1,
                        "components": [
                            { "type": 2, "style": 2, "label": "Thread closed", "custom_id": "noop" }
                        ]
                    }
                ]
            }
        ]);

        assert_eq!(
            locate_marker(&msg, &marker()),
            Some(MarkerLocation::Component)
        );
    }

    #[test]
    fn matches_select_placeholder() {
        let mut msg = message(1, 10);
        msg.components = json!([
            {
                "type": 1,
                "components": [
                    { "type": 3, "custom_id": "status", "placeholder": "Thread closed - pick feedback" }
                ]
            }
        ]);

        assert!(locate_marker(&msg, &marker()).is_some());
    }

    #[test]
    fn ignores_identifier_keys_in_components() {
        let mut msg = message(1, 10);
        msg.components = json!([
            {
                "type": 1,
                "components": [
                    { "type": 2, "label": "Reopen", "custom_id": "thread closed" },
                    { "type": 2, "label": "Docs", "url": "https://example.com/thread closed" }
                ]
            }
        ]);

        assert_eq!(locate_marker(&msg, &marker()), None);
    }

    #[test]
    fn history_without_marker_has_no_closure() {
        let mut plain = message(3, 30);
        plain.content = "still waiting on a reply".to_owned();

        let mut with_embed = message(2, 20);
        with_embed.embeds.push(EmbedSnapshot {
            title: Some("Ticket opened".to_owned()),
            description: Some("A moderator will be with you shortly".to_owned()),
            footer_text: Some("ticket bot".to_owned()),
            author_name: Some("Helper".to_owned()),
            fields: vec![EmbedFieldSnapshot {
                name: "Status".to_owned(),
                value: "open".to_owned(),
            }],
        });

        let mut with_components = message(1, 10);
        with_components.components =
            json!([{ "type": 1, "components": [{ "type": 2, "label": "Close thread" }] }]);

        assert_eq!(
            find_closure(&[plain, with_embed, with_components], &marker()),
            None
        );
    }

    #[test]
    fn returns_most_recent_marked_message() {
        let mut newest = message(3, 300);
        newest.content = "thread closed again".to_owned();
        let middle = message(2, 200);
        let mut oldest = message(1, 100);
        oldest.content = "thread closed".to_owned();

        let found = find_closure(&[newest, middle, oldest], &marker()).expect("closure");
        assert_eq!(found.message_id, 3);
        assert_eq!(found.closed_at, 300);
    }
}

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use serenity::builder::EditThread;
use serenity::http::{Http, HttpError, LightMethod, Request, Route};
use serenity::model::Timestamp;
use serenity::model::prelude::{ChannelId, Embed, GuildChannel, ThreadsData};
use tracing::{debug, warn};

use crate::gateway::{GatewayError, ThreadGateway};
use crate::snapshot::{EmbedFieldSnapshot, EmbedSnapshot, MessageSnapshot, ThreadState};

const ARCHIVED_THREAD_PAGE: u64 = 100;
/// Upper bound on archive pages walked per container and visibility.
pub const MAX_ARCHIVED_PAGES: usize = 50;

/// One page of an archived thread listing.
#[derive(Clone, Debug, Default)]
pub struct ArchivedPage {
    pub threads: Vec<ThreadState>,
    /// `before` value for the next request: the archive timestamp of the
    /// oldest thread on this page.
    pub cursor: Option<String>,
    pub has_more: bool,
}

#[derive(Clone, Copy, Debug)]
enum ArchiveVisibility {
    Public,
    Private,
}

/// `ThreadGateway` backed by the serenity HTTP client.
#[derive(Clone, Debug)]
pub struct SerenityGateway {
    http: Arc<Http>,
}

impl SerenityGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ThreadGateway for SerenityGateway {
    async fn archived_threads(&self, container_id: u64) -> Result<Vec<ThreadState>, GatewayError> {
        let mut threads = collect_archived_pages(
            |before| self.archived_page(container_id, ArchiveVisibility::Public, before),
            MAX_ARCHIVED_PAGES,
        )
        .await?;

        match collect_archived_pages(
            |before| self.archived_page(container_id, ArchiveVisibility::Private, before),
            MAX_ARCHIVED_PAGES,
        )
        .await
        {
            Ok(private) => threads.extend(private),
            Err(source) => debug!(
                ?source,
                container_id, "archived private threads unavailable"
            ),
        }

        Ok(threads)
    }

    async fn thread(&self, thread_id: u64) -> Result<ThreadState, GatewayError> {
        let http: &Http = &self.http;
        let channel = ChannelId::new(thread_id)
            .to_channel(http)
            .await
            .map_err(|source| classify_serenity_error(&source))?;

        match channel.guild() {
            Some(channel) if channel.thread_metadata.is_some() => Ok(thread_state(&channel)),
            _ => Err(GatewayError::NotFound(format!(
                "channel {thread_id} is not a thread"
            ))),
        }
    }

    async fn recent_messages(
        &self,
        thread_id: u64,
        limit: u8,
    ) -> Result<Vec<MessageSnapshot>, GatewayError> {
        // Raw payloads keep Components V2 blocks the typed model drops.
        let request = Request::new(
            Route::ChannelMessages {
                channel_id: ChannelId::new(thread_id),
            },
            LightMethod::Get,
        )
        .params(Some(vec![("limit", limit.to_string())]));

        let raw: Vec<Value> = self
            .http
            .fire(request)
            .await
            .map_err(|source| classify_serenity_error(&source))?;

        Ok(raw
            .iter()
            .filter_map(|message| {
                let snapshot = message_snapshot_from_json(message);
                if snapshot.is_none() {
                    warn!(thread_id, "skipping message payload without id, author or timestamp");
                }
                snapshot
            })
            .collect())
    }

    async fn reopen_thread(&self, thread_id: u64) -> Result<(), GatewayError> {
        let http: &Http = &self.http;
        ChannelId::new(thread_id)
            .edit_thread(http, EditThread::new().archived(false))
            .await
            .map(|_| ())
            .map_err(|source| classify_serenity_error(&source))
    }

    async fn delete_thread(&self, thread_id: u64) -> Result<(), GatewayError> {
        let http: &Http = &self.http;
        ChannelId::new(thread_id)
            .delete(http)
            .await
            .map(|_| ())
            .map_err(|source| classify_serenity_error(&source))
    }
}

impl SerenityGateway {
    async fn archived_page(
        &self,
        container_id: u64,
        visibility: ArchiveVisibility,
        before: Option<String>,
    ) -> Result<ArchivedPage, GatewayError> {
        let channel_id = ChannelId::new(container_id);
        let route = match visibility {
            ArchiveVisibility::Public => Route::ChannelArchivedPublicThreads { channel_id },
            ArchiveVisibility::Private => Route::ChannelArchivedPrivateThreads { channel_id },
        };

        let mut params = vec![("limit", ARCHIVED_THREAD_PAGE.to_string())];
        if let Some(before) = before {
            params.push(("before", before));
        }

        let page: ThreadsData = self
            .http
            .fire(Request::new(route, LightMethod::Get).params(Some(params)))
            .await
            .map_err(|source| classify_serenity_error(&source))?;

        let cursor = page
            .threads
            .last()
            .and_then(|thread| thread.thread_metadata.as_ref())
            .and_then(|meta| meta.archive_timestamp)
            .map(|timestamp| timestamp.to_string());

        Ok(ArchivedPage {
            threads: page.threads.iter().map(thread_state).collect(),
            cursor,
            has_more: page.has_more,
        })
    }
}

/// Walk an archived thread listing page by page until Discord reports no
/// more, the cursor runs out, or `max_pages` is reached. A failure on the
/// first page is returned; a later failure keeps what was already read.
pub async fn collect_archived_pages<F, Fut>(
    mut fetch_page: F,
    max_pages: usize,
) -> Result<Vec<ThreadState>, GatewayError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ArchivedPage, GatewayError>>,
{
    let mut threads = Vec::new();
    let mut before = None;

    for page_index in 0..max_pages {
        let page = match fetch_page(before.take()).await {
            Ok(page) => page,
            Err(source) if page_index == 0 => return Err(source),
            Err(source) => {
                warn!(
                    ?source,
                    pages_read = page_index,
                    "archived thread listing failed part way; keeping the pages already read"
                );
                return Ok(threads);
            }
        };

        threads.extend(page.threads);

        match page.cursor {
            Some(cursor) if page.has_more => before = Some(cursor),
            _ => return Ok(threads),
        }
    }

    warn!(
        max_pages,
        threads = threads.len(),
        "archived thread listing hit the page cap; older threads are skipped this pass"
    );
    Ok(threads)
}

/// Map a serenity error onto the scanner's failure taxonomy using the HTTP
/// status and Discord's JSON error code.
pub fn classify_serenity_error(source: &serenity::Error) -> GatewayError {
    match source {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            let status = response.status_code.as_u16();
            let code = response.error.code;
            let message = response.error.message.clone();

            if status == 403 || code == 50001 || code == 50013 {
                GatewayError::PermissionDenied(message)
            } else if status == 404 || code == 10003 || code == 10008 {
                GatewayError::NotFound(message)
            } else {
                GatewayError::Transient(message)
            }
        }
        other => GatewayError::Transient(other.to_string()),
    }
}

fn thread_state(channel: &GuildChannel) -> ThreadState {
    let metadata = channel.thread_metadata.as_ref();

    ThreadState {
        id: channel.id.get(),
        parent_id: channel.parent_id.map(|id| id.get()),
        name: channel.name.clone(),
        archived: metadata.is_some_and(|meta| meta.archived),
        locked: metadata.is_some_and(|meta| meta.locked),
        archived_at: metadata
            .and_then(|meta| meta.archive_timestamp)
            .map(|timestamp| timestamp.unix_timestamp()),
    }
}

/// Build a snapshot from a raw message payload, keeping `components`
/// untouched so nested containers and text displays stay searchable.
/// Returns `None` when the id, author or timestamp is missing.
pub fn message_snapshot_from_json(raw: &Value) -> Option<MessageSnapshot> {
    let id = snowflake(raw.get("id")?)?;
    let author = raw.get("author")?;
    let created_at = raw
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|timestamp| Timestamp::parse(timestamp).ok())?
        .unix_timestamp();

    let embeds = match raw.get("embeds") {
        Some(value) => match serde_json::from_value::<Vec<Embed>>(value.clone()) {
            Ok(embeds) => embeds.iter().map(embed_snapshot).collect(),
            Err(source) => {
                warn!(?source, message_id = id, "unreadable embeds; searching text and components only");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    Some(MessageSnapshot {
        id,
        author_id: snowflake(author.get("id")?)?,
        author_is_bot: author.get("bot").and_then(Value::as_bool).unwrap_or(false),
        created_at,
        content: raw
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        embeds,
        components: raw.get("components").cloned().unwrap_or(Value::Null),
    })
}

fn snowflake(value: &Value) -> Option<u64> {
    match value {
        Value::String(text) => text.parse().ok(),
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}

fn embed_snapshot(embed: &Embed) -> EmbedSnapshot {
    EmbedSnapshot {
        title: embed.title.clone(),
        description: embed.description.clone(),
        footer_text: embed.footer.as_ref().map(|footer| footer.text.clone()),
        author_name: embed.author.as_ref().map(|author| author.name.clone()),
        fields: embed
            .fields
            .iter()
            .map(|field| EmbedFieldSnapshot {
                name: field.name.clone(),
                value: field.value.clone(),
            })
            .collect(),
    }
}

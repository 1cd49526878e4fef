use std::time::Duration;

use poise::serenity_prelude as serenity;

use crate::embed::{DEFAULT_EMBED_COLOR, page_footer_text};

pub const PAGINATION_TIMEOUT_SECS: u64 = 60 * 3;

/// Static pieces of a paginated embed.
#[derive(Clone, Copy, Debug)]
pub struct PageStyle<'a> {
    pub title: &'a str,
    pub color: u32,
    pub note: Option<&'a str>,
}

impl<'a> PageStyle<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            color: DEFAULT_EMBED_COLOR,
            note: None,
        }
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn note(mut self, note: &'a str) -> Self {
        self.note = Some(note);
        self
    }
}

fn build_page_embed(
    style: PageStyle<'_>,
    description: &str,
    page: usize,
    total_pages: usize,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(style.title.to_owned())
        .color(style.color)
        .description(description.to_owned());

    let footer = page_footer_text(page, total_pages, style.note);
    if !footer.is_empty() {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
    }

    embed
}

fn pagination_components(
    prev_id: &str,
    next_id: &str,
    current_page: usize,
    total_pages: usize,
) -> Vec<serenity::CreateActionRow> {
    vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(prev_id)
            .label("Prev")
            .disabled(current_page == 0)
            .style(serenity::ButtonStyle::Secondary),
        serenity::CreateButton::new(next_id)
            .label("Next")
            .disabled(current_page + 1 >= total_pages)
            .style(serenity::ButtonStyle::Secondary),
    ])]
}

pub async fn paginate_embed_pages<U, E>(
    ctx: poise::Context<'_, U, E>,
    style: PageStyle<'_>,
    pages: &[String],
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    paginate_embed_pages_from(ctx, style, pages, 1).await
}

/// Send `pages` as one embed with Prev/Next buttons for the invoking user,
/// opening on the 1-based `start_page`.
///
/// Buttons are removed once the collector times out.
pub async fn paginate_embed_pages_from<U, E>(
    ctx: poise::Context<'_, U, E>,
    style: PageStyle<'_>,
    pages: &[String],
    start_page: usize,
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    if pages.is_empty() {
        return Ok(());
    }

    let total_pages = pages.len();
    let mut current_page = start_page.clamp(1, total_pages) - 1;

    if total_pages == 1 {
        ctx.send(poise::CreateReply::default().embed(build_page_embed(
            style, &pages[0], 1, 1,
        )))
        .await?;
        return Ok(());
    }

    let ctx_id = ctx.id();
    let prev_button_id = format!("{}_prev", ctx_id);
    let next_button_id = format!("{}_next", ctx_id);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(build_page_embed(
                    style,
                    &pages[current_page],
                    current_page + 1,
                    total_pages,
                ))
                .components(pagination_components(
                    &prev_button_id,
                    &next_button_id,
                    current_page,
                    total_pages,
                )),
        )
        .await?;

    let message = reply.message().await?;
    let message_id = message.id;
    let channel_id = message.channel_id;

    while let Some(press) = serenity::collector::ComponentInteractionCollector::new(ctx)
        .filter({
            let prefix = format!("{}", ctx_id);
            let author_id = ctx.author().id;
            move |interaction| {
                interaction.data.custom_id.starts_with(&prefix)
                    && interaction.user.id == author_id
                    && interaction.message.id == message_id
            }
        })
        .timeout(Duration::from_secs(PAGINATION_TIMEOUT_SECS))
        .await
    {
        if press.data.custom_id == next_button_id {
            current_page = (current_page + 1).min(total_pages - 1);
        } else if press.data.custom_id == prev_button_id {
            current_page = current_page.saturating_sub(1);
        } else {
            continue;
        }

        press
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .embed(build_page_embed(
                            style,
                            &pages[current_page],
                            current_page + 1,
                            total_pages,
                        ))
                        .components(pagination_components(
                            &prev_button_id,
                            &next_button_id,
                            current_page,
                            total_pages,
                        )),
                ),
            )
            .await?;
    }

    let _ = channel_id
        .edit_message(
            ctx.http(),
            message_id,
            serenity::EditMessage::new()
                .embed(build_page_embed(
                    style,
                    &pages[current_page],
                    current_page + 1,
                    total_pages,
                ))
                .components(vec![]),
        )
        .await;

    Ok(())
}

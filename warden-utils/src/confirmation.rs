use std::time::Duration;

use poise::serenity_prelude as serenity;

pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    TimedOut,
}

/// Ask the invoker to confirm with a button pair and settle the prompt.
///
/// The prompt message is edited to `outcome_text(result)` with the
/// buttons removed, whatever the answer was.
pub async fn confirm<U, E>(
    ctx: poise::Context<'_, U, E>,
    embed: serenity::CreateEmbed,
    confirm_label: &str,
    outcome_text: impl Fn(Confirmation) -> String,
) -> Result<Confirmation, serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let ctx_id = ctx.id();
    let confirm_id = format!("{}_confirm", ctx_id);
    let decline_id = format!("{}_decline", ctx_id);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(vec![serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(&confirm_id)
                        .label(confirm_label)
                        .style(serenity::ButtonStyle::Danger),
                    serenity::CreateButton::new(&decline_id)
                        .label("Cancel")
                        .style(serenity::ButtonStyle::Secondary),
                ])]),
        )
        .await?;

    let message = reply.message().await?.into_owned();
    let interaction = message
        .await_component_interaction(ctx)
        .author_id(ctx.author().id)
        .timeout(CONFIRMATION_TIMEOUT)
        .await;

    let Some(interaction) = interaction else {
        message
            .channel_id
            .edit_message(
                ctx.http(),
                message.id,
                serenity::EditMessage::new()
                    .content(outcome_text(Confirmation::TimedOut))
                    .embeds(vec![])
                    .components(vec![]),
            )
            .await?;
        return Ok(Confirmation::TimedOut);
    };

    let result = if interaction.data.custom_id == decline_id {
        Confirmation::Declined
    } else {
        Confirmation::Confirmed
    };

    interaction
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(outcome_text(result))
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(result)
}

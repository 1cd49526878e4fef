use poise::serenity_prelude as serenity;

/// Resolve a member's effective guild permissions from their roles.
///
/// The guild owner gets every permission.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let roles = guild_id.roles(http).await?;

    let mut resolved = serenity::Permissions::empty();
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    for role in roles.values() {
        if role.id == everyone_role_id || member.roles.contains(&role.id) {
            resolved |= role.permissions;
        }
    }

    Ok(resolved)
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(grants(perms, required))
}

/// Administrator implies everything.
pub fn grants(perms: serenity::Permissions, required: serenity::Permissions) -> bool {
    perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required)
}

pub const GUILD_ONLY: &str = "This command only works in servers.";
pub const OTHER_GUILD: &str = "This bot only manages threads in its configured server.";

/// Commands only act on the guild the bot was configured for.
pub fn guild_gate(
    invoked: Option<serenity::GuildId>,
    managed: serenity::GuildId,
) -> Result<serenity::GuildId, &'static str> {
    match invoked {
        None => Err(GUILD_ONLY),
        Some(guild_id) if guild_id != managed => Err(OTHER_GUILD),
        Some(guild_id) => Ok(guild_id),
    }
}

/// Gate a command on `required` inside the `managed` guild.
///
/// Returns the guild id when the invoker may proceed. Otherwise an
/// ephemeral explanation is sent and `None` is returned.
pub async fn require_permission<U, E>(
    ctx: poise::Context<'_, U, E>,
    managed: serenity::GuildId,
    required: serenity::Permissions,
) -> anyhow::Result<Option<serenity::GuildId>>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let guild_id = match guild_gate(ctx.guild_id(), managed) {
        Ok(guild_id) => guild_id,
        Err(reason) => {
            ctx.send(poise::CreateReply::default().content(reason).ephemeral(true))
                .await?;
            return Ok(None);
        }
    };

    if !has_user_permission(ctx.http(), guild_id, ctx.author().id, required).await? {
        ctx.send(
            poise::CreateReply::default()
                .content(format!(
                    "You need the {} permission to use this command.",
                    permission_label(required)
                ))
                .ephemeral(true),
        )
        .await?;
        return Ok(None);
    }

    Ok(Some(guild_id))
}

fn permission_label(perms: serenity::Permissions) -> String {
    let names: Vec<&str> = perms.iter_names().map(|(name, _flag)| name).collect();
    if names.is_empty() {
        "required".to_owned()
    } else {
        names.join(" + ")
    }
}

use anyhow::Context as _;
use warden_utils::time::now_unix_secs_i64;

use crate::cache::{CONTAINER_LIST_CACHE_TTL, containers_key, invalidate_containers};
use crate::database::Database;
use crate::model::containers::MonitoredContainer;

/// Start monitoring a channel. Returns `false` if it was already monitored.
pub async fn add_container(
    db: &Database,
    guild_id: u64,
    channel_id: u64,
    added_by: u64,
) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = i64::try_from(channel_id).context("channel_id out of i64 range")?;
    let added_by_i64 = i64::try_from(added_by).context("added_by out of i64 range")?;

    let result = sqlx::query(
        "INSERT INTO monitored_containers (guild_id, channel_id, added_by, added_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (guild_id, channel_id) DO NOTHING",
    )
    .bind(guild_id_i64)
    .bind(channel_id_i64)
    .bind(added_by_i64)
    .bind(now_unix_secs_i64())
    .execute(db.pool())
    .await?;

    invalidate_containers(db.cache(), guild_id).await?;

    Ok(result.rows_affected() > 0)
}

/// Stop monitoring a channel. Returns `true` if it was monitored.
pub async fn remove_container(db: &Database, guild_id: u64, channel_id: u64) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = i64::try_from(channel_id).context("channel_id out of i64 range")?;

    let result =
        sqlx::query("DELETE FROM monitored_containers WHERE guild_id = ?1 AND channel_id = ?2")
            .bind(guild_id_i64)
            .bind(channel_id_i64)
            .execute(db.pool())
            .await?;

    invalidate_containers(db.cache(), guild_id).await?;

    Ok(result.rows_affected() > 0)
}

/// Monitored containers in the order they were added.
pub async fn list_containers(db: &Database, guild_id: u64) -> anyhow::Result<Vec<MonitoredContainer>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let rows = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        "SELECT guild_id, channel_id, added_by, added_at
         FROM monitored_containers
         WHERE guild_id = ?1
         ORDER BY id ASC",
    )
    .bind(guild_id_i64)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|(gid, channel_id, added_by, added_at)| {
            Ok(MonitoredContainer {
                guild_id: u64::try_from(gid).context("guild_id out of u64 range")?,
                channel_id: u64::try_from(channel_id).context("channel_id out of u64 range")?,
                added_by: u64::try_from(added_by).context("added_by out of u64 range")?,
                added_at: u64::try_from(added_at).context("added_at out of u64 range")?,
            })
        })
        .collect()
}

/// Just the channel ids, in configuration order (used by the scanner).
pub async fn container_ids(db: &Database, guild_id: u64) -> anyhow::Result<Vec<u64>> {
    let cache_key = containers_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONTAINER_LIST_CACHE_TTL, || async {
            let containers = list_containers(db, guild_id).await?;
            Ok(containers
                .into_iter()
                .map(|container| container.channel_id)
                .collect::<Vec<u64>>())
        })
        .await
}

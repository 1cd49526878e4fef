use anyhow::Context as _;
use warden_utils::time::now_unix_secs_i64;

use crate::cache::{CONFIG_CACHE_TTL, invalidate_thread_settings, thread_settings_key};
use crate::database::Database;
use crate::model::thread_settings::{DELETE_DELAY_RANGE, SCAN_INTERVAL_RANGE, ThreadSettings};

/// Settings for a guild, falling back to the defaults when nothing is stored.
pub async fn get_thread_settings(db: &Database, guild_id: u64) -> anyhow::Result<ThreadSettings> {
    let cache_key = thread_settings_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

            let row = sqlx::query_as::<_, (i64, i64, Option<i64>)>(
                "SELECT scan_interval_minutes, delete_delay_days, log_channel_id
                 FROM guild_thread_settings WHERE guild_id = ?1",
            )
            .bind(guild_id_i64)
            .fetch_optional(db.pool())
            .await?;

            let Some((interval, delay, log_channel_id)) = row else {
                return Ok(ThreadSettings::defaults(guild_id));
            };

            let log_channel_id = log_channel_id
                .map(u64::try_from)
                .transpose()
                .context("log_channel_id out of u64 range")?;

            Ok(ThreadSettings::from_stored(
                guild_id,
                interval,
                delay,
                log_channel_id,
            ))
        })
        .await
}

pub async fn set_scan_interval(db: &Database, guild_id: u64, minutes: u64) -> anyhow::Result<()> {
    anyhow::ensure!(
        SCAN_INTERVAL_RANGE.contains(&minutes),
        "scan interval {minutes} outside {SCAN_INTERVAL_RANGE:?}"
    );
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let minutes_i64 = i64::try_from(minutes).context("interval out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_thread_settings (guild_id, scan_interval_minutes, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (guild_id) DO UPDATE SET
            scan_interval_minutes = excluded.scan_interval_minutes,
            updated_at = excluded.updated_at",
    )
    .bind(guild_id_i64)
    .bind(minutes_i64)
    .bind(now_unix_secs_i64())
    .execute(db.pool())
    .await?;

    invalidate_thread_settings(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_delete_delay(db: &Database, guild_id: u64, days: u64) -> anyhow::Result<()> {
    anyhow::ensure!(
        DELETE_DELAY_RANGE.contains(&days),
        "delete delay {days} outside {DELETE_DELAY_RANGE:?}"
    );
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let days_i64 = i64::try_from(days).context("delay out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_thread_settings (guild_id, delete_delay_days, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (guild_id) DO UPDATE SET
            delete_delay_days = excluded.delete_delay_days,
            updated_at = excluded.updated_at",
    )
    .bind(guild_id_i64)
    .bind(days_i64)
    .bind(now_unix_secs_i64())
    .execute(db.pool())
    .await?;

    invalidate_thread_settings(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_log_channel(db: &Database, guild_id: u64, channel_id: u64) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let channel_id_i64 = i64::try_from(channel_id).context("channel_id out of i64 range")?;

    sqlx::query(
        "INSERT INTO guild_thread_settings (guild_id, log_channel_id, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (guild_id) DO UPDATE SET
            log_channel_id = excluded.log_channel_id,
            updated_at = excluded.updated_at",
    )
    .bind(guild_id_i64)
    .bind(channel_id_i64)
    .bind(now_unix_secs_i64())
    .execute(db.pool())
    .await?;

    invalidate_thread_settings(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn clear_log_channel(db: &Database, guild_id: u64) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query(
        "UPDATE guild_thread_settings SET log_channel_id = NULL, updated_at = ?2
         WHERE guild_id = ?1",
    )
    .bind(guild_id_i64)
    .bind(now_unix_secs_i64())
    .execute(db.pool())
    .await?;

    invalidate_thread_settings(db.cache(), guild_id).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        clear_log_channel, get_thread_settings, set_delete_delay, set_log_channel,
        set_scan_interval,
    };
    use crate::model::thread_settings::ThreadSettings;
    use crate::test_support::memory_database;

    #[tokio::test]
    async fn missing_row_yields_defaults() {
        let db = memory_database().await;
        let settings = get_thread_settings(&db, 1).await.expect("settings");
        assert_eq!(settings, ThreadSettings::defaults(1));
    }

    #[tokio::test]
    async fn writes_are_created_lazily_and_merge() {
        let db = memory_database().await;

        set_scan_interval(&db, 1, 15).await.expect("interval");
        set_delete_delay(&db, 1, 3).await.expect("delay");
        set_log_channel(&db, 1, 555).await.expect("log channel");

        let settings = get_thread_settings(&db, 1).await.expect("settings");
        assert_eq!(settings.scan_interval_minutes, 15);
        assert_eq!(settings.delete_delay_days, 3);
        assert_eq!(settings.log_channel_id, Some(555));

        clear_log_channel(&db, 1).await.expect("clear");
        let settings = get_thread_settings(&db, 1).await.expect("settings");
        assert_eq!(settings.log_channel_id, None);
        assert_eq!(settings.scan_interval_minutes, 15);
    }

    #[tokio::test]
    async fn out_of_range_writes_are_rejected() {
        let db = memory_database().await;

        assert!(set_scan_interval(&db, 1, 0).await.is_err());
        assert!(set_delete_delay(&db, 1, 1_000).await.is_err());
        assert_eq!(
            get_thread_settings(&db, 1).await.expect("settings"),
            ThreadSettings::defaults(1)
        );
    }

    #[tokio::test]
    async fn guilds_are_isolated() {
        let db = memory_database().await;

        set_scan_interval(&db, 1, 5).await.expect("interval");
        let other = get_thread_settings(&db, 2).await.expect("settings");
        assert_eq!(other, ThreadSettings::defaults(2));
    }
}

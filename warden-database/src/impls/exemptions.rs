use std::collections::BTreeSet;

use anyhow::Context as _;
use warden_utils::time::now_unix_secs_i64;

use crate::database::Database;
use crate::model::exemptions::ExemptedThread;

/// Exempt a thread from automated reopen/delete. Returns `false` if it was
/// already exempt.
pub async fn add_exemption(
    db: &Database,
    guild_id: u64,
    thread_id: u64,
    admin_id: u64,
) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let thread_id_i64 = i64::try_from(thread_id).context("thread_id out of i64 range")?;
    let admin_id_i64 = i64::try_from(admin_id).context("admin_id out of i64 range")?;

    let result = sqlx::query(
        "INSERT INTO exempted_threads (thread_id, guild_id, exempted_by, exempted_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (thread_id) DO NOTHING",
    )
    .bind(thread_id_i64)
    .bind(guild_id_i64)
    .bind(admin_id_i64)
    .bind(now_unix_secs_i64())
    .execute(db.pool())
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns `true` if an exemption was removed.
pub async fn remove_exemption(db: &Database, guild_id: u64, thread_id: u64) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let thread_id_i64 = i64::try_from(thread_id).context("thread_id out of i64 range")?;

    let result = sqlx::query("DELETE FROM exempted_threads WHERE guild_id = ?1 AND thread_id = ?2")
        .bind(guild_id_i64)
        .bind(thread_id_i64)
        .execute(db.pool())
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Drop the exemption for a thread regardless of guild (thread deleted).
pub async fn forget_thread(db: &Database, thread_id: u64) -> anyhow::Result<bool> {
    let thread_id_i64 = i64::try_from(thread_id).context("thread_id out of i64 range")?;

    let result = sqlx::query("DELETE FROM exempted_threads WHERE thread_id = ?1")
        .bind(thread_id_i64)
        .execute(db.pool())
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_exempt(db: &Database, guild_id: u64, thread_id: u64) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let thread_id_i64 = i64::try_from(thread_id).context("thread_id out of i64 range")?;

    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM exempted_threads WHERE guild_id = ?1 AND thread_id = ?2",
    )
    .bind(guild_id_i64)
    .bind(thread_id_i64)
    .fetch_optional(db.pool())
    .await?;

    Ok(found.is_some())
}

pub async fn exempt_thread_ids(db: &Database, guild_id: u64) -> anyhow::Result<BTreeSet<u64>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let ids: Vec<i64> =
        sqlx::query_scalar("SELECT thread_id FROM exempted_threads WHERE guild_id = ?1")
            .bind(guild_id_i64)
            .fetch_all(db.pool())
            .await?;

    ids.into_iter()
        .map(|id| u64::try_from(id).context("thread_id out of u64 range"))
        .collect()
}

/// Exemptions for a guild, newest first.
pub async fn list_exemptions(db: &Database, guild_id: u64) -> anyhow::Result<Vec<ExemptedThread>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let rows = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        "SELECT guild_id, thread_id, exempted_by, exempted_at
         FROM exempted_threads
         WHERE guild_id = ?1
         ORDER BY exempted_at DESC, thread_id ASC",
    )
    .bind(guild_id_i64)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|(gid, thread_id, exempted_by, exempted_at)| {
            Ok(ExemptedThread {
                guild_id: u64::try_from(gid).context("guild_id out of u64 range")?,
                thread_id: u64::try_from(thread_id).context("thread_id out of u64 range")?,
                exempted_by: u64::try_from(exempted_by).context("exempted_by out of u64 range")?,
                exempted_at: u64::try_from(exempted_at).context("exempted_at out of u64 range")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{
        add_exemption, exempt_thread_ids, forget_thread, is_exempt, list_exemptions,
        remove_exemption,
    };
    use crate::database::{Database, MIGRATOR, connect_sqlite};
    use crate::test_support::memory_database;

    #[tokio::test]
    async fn is_exempt_tracks_latest_call() {
        let db = memory_database().await;

        assert!(!is_exempt(&db, 1, 10).await.expect("check"));

        assert!(add_exemption(&db, 1, 10, 99).await.expect("add"));
        assert!(is_exempt(&db, 1, 10).await.expect("check"));

        assert!(remove_exemption(&db, 1, 10).await.expect("remove"));
        assert!(!is_exempt(&db, 1, 10).await.expect("check"));

        assert!(add_exemption(&db, 1, 10, 99).await.expect("re-add"));
        assert!(is_exempt(&db, 1, 10).await.expect("check"));
    }

    #[tokio::test]
    async fn exemption_records_current_time() {
        let db = memory_database().await;
        let before = warden_utils::time::now_unix_secs();

        assert!(add_exemption(&db, 1, 10, 99).await.expect("add"));

        let rows = list_exemptions(&db, 1).await.expect("list");
        let after = warden_utils::time::now_unix_secs();
        assert!((before..=after).contains(&rows[0].exempted_at));
    }

    #[tokio::test]
    async fn duplicate_add_keeps_original_audit() {
        let db = memory_database().await;

        assert!(add_exemption(&db, 1, 10, 99).await.expect("add"));
        assert!(!add_exemption(&db, 1, 10, 42).await.expect("add again"));

        let rows = list_exemptions(&db, 1).await.expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].exempted_by, 99);
    }

    #[tokio::test]
    async fn ids_are_scoped_to_guild() {
        let db = memory_database().await;

        add_exemption(&db, 1, 10, 99).await.expect("add");
        add_exemption(&db, 1, 11, 99).await.expect("add");
        add_exemption(&db, 2, 20, 99).await.expect("add");

        assert_eq!(
            exempt_thread_ids(&db, 1).await.expect("ids"),
            BTreeSet::from([10, 11])
        );
        assert!(!is_exempt(&db, 2, 10).await.expect("check"));
        assert!(!remove_exemption(&db, 2, 10).await.expect("remove"));
    }

    #[tokio::test]
    async fn forget_thread_drops_row() {
        let db = memory_database().await;

        add_exemption(&db, 1, 10, 99).await.expect("add");
        assert!(forget_thread(&db, 10).await.expect("forget"));
        assert!(!forget_thread(&db, 10).await.expect("forget again"));
        assert!(exempt_thread_ids(&db, 1).await.expect("ids").is_empty());
    }

    #[tokio::test]
    async fn exemptions_survive_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("warden.db").display());

        {
            let pool = connect_sqlite(&url, 1).await.expect("connect");
            MIGRATOR.run(&pool).await.expect("migrate");
            let db = Database::new(pool.clone());
            add_exemption(&db, 1, 10, 99).await.expect("add");
            pool.close().await;
        }

        let pool = connect_sqlite(&url, 1).await.expect("reconnect");
        MIGRATOR.run(&pool).await.expect("migrate again");
        let db = Database::new(pool);

        assert!(is_exempt(&db, 1, 10).await.expect("check"));
    }
}

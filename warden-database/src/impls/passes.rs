use anyhow::Context as _;

use crate::database::Database;
use crate::model::passes::LifecyclePassRecord;

pub async fn record_pass(db: &Database, record: LifecyclePassRecord) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(record.guild_id).context("guild_id out of i64 range")?;
    let finished_at = i64::try_from(record.finished_at).context("finished_at out of i64 range")?;

    sqlx::query(
        "INSERT INTO lifecycle_passes (guild_id, finished_at, inspected, reopened, deleted, failed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (guild_id) DO UPDATE SET
            finished_at = excluded.finished_at,
            inspected = excluded.inspected,
            reopened = excluded.reopened,
            deleted = excluded.deleted,
            failed = excluded.failed",
    )
    .bind(guild_id_i64)
    .bind(finished_at)
    .bind(i64::try_from(record.inspected).context("inspected out of i64 range")?)
    .bind(i64::try_from(record.reopened).context("reopened out of i64 range")?)
    .bind(i64::try_from(record.deleted).context("deleted out of i64 range")?)
    .bind(i64::try_from(record.failed).context("failed out of i64 range")?)
    .execute(db.pool())
    .await?;

    Ok(())
}

pub async fn last_pass(db: &Database, guild_id: u64) -> anyhow::Result<Option<LifecyclePassRecord>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let row = sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
        "SELECT finished_at, inspected, reopened, deleted, failed
         FROM lifecycle_passes WHERE guild_id = ?1",
    )
    .bind(guild_id_i64)
    .fetch_optional(db.pool())
    .await?;

    row.map(|(finished_at, inspected, reopened, deleted, failed)| {
        Ok(LifecyclePassRecord {
            guild_id,
            finished_at: u64::try_from(finished_at).context("finished_at out of u64 range")?,
            inspected: u64::try_from(inspected).context("inspected out of u64 range")?,
            reopened: u64::try_from(reopened).context("reopened out of u64 range")?,
            deleted: u64::try_from(deleted).context("deleted out of u64 range")?,
            failed: u64::try_from(failed).context("failed out of u64 range")?,
        })
    })
    .transpose()
}

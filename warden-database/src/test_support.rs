use sqlx::sqlite::SqlitePoolOptions;

use crate::database::{Database, MIGRATOR};

/// Migrated in-memory database. One connection, since every in-memory
/// connection is its own database.
pub(crate) async fn memory_database() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    MIGRATOR.run(&pool).await.expect("migrations");
    Database::new(pool)
}

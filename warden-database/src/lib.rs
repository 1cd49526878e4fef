pub mod cache;
pub mod database;
pub mod impls;
pub mod model;
#[cfg(test)]
mod test_support;

pub use cache::CacheService;
pub use database::{Database, MIGRATOR, connect_sqlite};

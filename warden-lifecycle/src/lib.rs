/// Thread classification and the action each classification implies.
pub mod classify;
/// Process-wide scanner configuration.
pub mod config;
/// Closure marker detection.
pub mod detector;
/// The Discord seam used by the pass.
pub mod gateway;
/// One reconciliation pass over a guild.
pub mod reconcile;
/// Pass scheduling helpers.
pub mod schedule;
/// Serenity implementation of the gateway.
pub mod serenity_gateway;
/// Library-independent thread and message views.
pub mod snapshot;

pub use classify::{ThreadAction, ThreadClassification};
pub use config::LifecycleConfig;
pub use detector::{ClosedMarker, ClosureMatch, MarkerLocation};
pub use gateway::{FailureKind, GatewayError, ThreadGateway};
pub use reconcile::{GuildSnapshot, Outcome, PassMode, PassOptions, PassReport, ThreadVerdict, run_pass};
pub use serenity_gateway::SerenityGateway;
pub use snapshot::{EmbedFieldSnapshot, EmbedSnapshot, MessageSnapshot, ThreadState};

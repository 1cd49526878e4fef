pub mod containers;
pub mod exemptions;
pub mod passes;
pub mod thread_settings;

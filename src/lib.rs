// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod allocation;
pub mod app_dirs;
pub mod config;
pub mod events;
pub mod format;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod tips;
pub mod transport;
pub mod ui;
pub mod util;

//! Embeds a toolkit render window into a host that owns the GL context.
//!
//! - Loads GL entry points through a host-supplied lookup
//! - Builds one render surface (window, renderer, interactor, placeholder scene)
//! - Forwards host mouse and size input as toolkit interactor events
//! - Keeps a dirty flag the toolkit sets and `paint` clears
//!
//! Rust hosts use [`EmbeddedSurface`] directly; other hosts go through the
//! `vtk_*` functions in [`ffi`].

pub mod buttons;
pub mod config;
pub mod constants;
pub mod error;
pub mod ffi;
pub mod gl_loader;
pub mod gl_state;
pub mod host;
pub mod state;
pub mod surface;
pub mod toolkit;

use std::sync::Once;

use env_logger::{Builder, Env};

pub use config::EmbedderConfig;
pub use error::EmbedderError;
pub use gl_loader::{is_gl_loaded, load_gl};
pub use host::{GlProcResolver, RepaintRequester};
pub use surface::EmbeddedSurface;

// Hosts may load and unload us repeatedly within one process; the logger can only be set once.
static LOGGER_INIT: Once = Once::new();

/// Installs `env_logger` once per process. `RUST_LOG` wins over `default_filter`.
/// A logger the host installed first is left in place.
pub fn init_logging(default_filter: &str) {
    LOGGER_INIT.call_once(|| {
        let _ = Builder::from_env(Env::default().default_filter_or(default_filter)).try_init();
    });
}

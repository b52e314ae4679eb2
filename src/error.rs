//! Error type for the Rust-level embedding API.
//!
//! The C ABI treats every one of these as a contract violation and aborts;
//! Rust hosts get them back as values.

#[derive(Debug)]
pub enum EmbedderError {
    /// A surface was requested before the GL function table was loaded.
    GlNotLoaded,
    /// `create` was called while a surface already exists.
    SurfaceExists,
    /// An operation that needs a surface ran before `create` or after `destroy`.
    NoSurface,
    /// The host passed a null handle where one is required.
    NullHandle(&'static str),
    /// The toolkit (or its bridge library) could not be reached.
    ToolkitUnavailable(String),
    /// The toolkit refused to build part of the render surface.
    ToolkitFailed(String),
    /// The configuration file could not be read or parsed.
    InvalidConfig(String),
    /// A host callback called back into the C ABI while a call was in progress.
    ReentrantCall,
}

impl std::fmt::Display for EmbedderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedderError::GlNotLoaded => {
                write!(f, "GL functions must be loaded before creating a surface")
            }
            EmbedderError::SurfaceExists => {
                write!(f, "A render surface already exists; destroy it first")
            }
            EmbedderError::NoSurface => {
                write!(f, "No render surface exists (not created yet or already destroyed)")
            }
            EmbedderError::NullHandle(what) => write!(f, "Null {} handle provided", what),
            EmbedderError::ToolkitUnavailable(s) => write!(f, "Toolkit unavailable: {}", s),
            EmbedderError::ToolkitFailed(s) => write!(f, "Toolkit operation failed: {}", s),
            EmbedderError::InvalidConfig(s) => write!(f, "Invalid embedder config: {}", s),
            EmbedderError::ReentrantCall => {
                write!(f, "Re-entrant call into the embedder from a host callback")
            }
        }
    }
}

impl std::error::Error for EmbedderError {}

impl From<anyhow::Error> for EmbedderError {
    fn from(err: anyhow::Error) -> Self {
        EmbedderError::ToolkitUnavailable(format!("{:#}", err))
    }
}

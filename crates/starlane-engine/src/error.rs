//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that startup code can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: starlane_core::ConfigError,
    },

    /// Embedded resources could not be parsed.
    #[error("resource error: {source}")]
    Resources {
        /// The underlying world error.
        #[from]
        source: starlane_world::WorldError,
    },

    /// Generation or population failed.
    #[error("bootstrap error: {source}")]
    Bootstrap {
        /// The underlying bootstrap error.
        #[from]
        source: starlane_core::BootstrapError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: starlane_core::RunnerError,
    },
}

//! Error types for the `starlane-world` crate.
//!
//! Generation failures carry the hierarchical path of the failing subtree so
//! they can be diagnosed without regenerating the whole galaxy.

use core::fmt;

/// Hierarchical location of a generated node: `[sector, system, body]`,
/// truncated to the depth of the node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GenerationPath(pub Vec<u32>);

impl GenerationPath {
    /// Path of a sector.
    pub fn sector(sector: u32) -> Self {
        Self(vec![sector])
    }

    /// Path of a system.
    pub fn system(sector: u32, index: u32) -> Self {
        Self(vec![sector, index])
    }

    /// Path of a body orbiting a system.
    pub fn body(sector: u32, index: u32, slot: u32) -> Self {
        Self(vec![sector, index, slot])
    }

    /// Path components.
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for GenerationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        let mut first = true;
        for component in &self.0 {
            if !first {
                f.write_str("/")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors that can occur while configuring or generating the universe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// Generation parameters are invalid or out of range. Raised before any
    /// generation work begins, and for out-of-range path components.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// A subtree could not be generated. Siblings are unaffected.
    #[error("generation failed at {path}: {reason}")]
    Generation {
        /// The failing subtree.
        path: GenerationPath,
        /// What went wrong.
        reason: GenerationFailure,
    },

    /// An embedded resource bundle could not be parsed.
    #[error("resource bundle {bundle} is malformed: {message}")]
    Resource {
        /// Name of the bundle.
        bundle: &'static str,
        /// Parser message.
        message: String,
    },
}

/// Why a subtree failed to generate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationFailure {
    /// The name pool for the scope ran out of names.
    #[error("name pool exhausted after {drawn} names")]
    NamesExhausted {
        /// Names drawn before exhaustion.
        drawn: usize,
    },

    /// No position satisfying the minimum spacing was found in the retry budget.
    #[error("no position with minimum spacing found after {attempts} attempts")]
    SpacingInfeasible {
        /// Attempts made.
        attempts: u32,
    },
}

impl WorldError {
    /// Shorthand for a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// The failing path, for generation errors.
    pub const fn path(&self) -> Option<&GenerationPath> {
        match self {
            Self::Generation { path, .. } => Some(path),
            Self::Configuration { .. } | Self::Resource { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_display() {
        assert_eq!(GenerationPath::default().to_string(), "/");
        assert_eq!(GenerationPath::sector(2).to_string(), "/2");
        assert_eq!(GenerationPath::body(2, 5, 1).to_string(), "/2/5/1");
    }

    #[test]
    fn generation_error_reports_path() {
        let err = WorldError::Generation {
            path: GenerationPath::system(1, 3),
            reason: GenerationFailure::SpacingInfeasible { attempts: 64 },
        };
        assert_eq!(err.path(), Some(&GenerationPath::system(1, 3)));
        assert_eq!(
            err.to_string(),
            "generation failed at /1/3: no position with minimum spacing found after 64 attempts"
        );
        assert!(WorldError::config("bad").path().is_none());
    }
}

// Copyright 2025 Cowboy AI, LLC.

//! Error types for composition operations

use thiserror::Error;

/// Errors that can occur while composing or dispatching through a composite
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Explicit capability/route/delegate lists do not line up
    #[error("Malformed composition request: {reason}")]
    MalformedRequest {
        /// Why the request was rejected
        reason: String,
    },

    /// The delegate routed to a capability does not implement it
    #[error("Capability {capability} is not implemented by delegate {delegate} ({delegate_type})")]
    CapabilityNotImplemented {
        /// Name of the requested capability
        capability: &'static str,
        /// Position of the owning delegate
        delegate: usize,
        /// Name of the owning delegate's type
        delegate_type: &'static str,
    },

    /// The composite was asked for a capability it does not declare
    #[error("Capability not declared by composite: {0}")]
    CapabilityNotDeclared(&'static str),

    /// The blueprint backend failed for a composition key
    #[error("Blueprint build failed for {key}: {reason}")]
    BuildFailure {
        /// Rendered composition key
        key: String,
        /// Failure reported by the backend
        reason: String,
    },

    /// Invalid composition configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for composition operations
pub type CompositionResult<T> = Result<T, CompositionError>;

impl From<serde_json::Error> for CompositionError {
    fn from(err: serde_json::Error) -> Self {
        CompositionError::Configuration(err.to_string())
    }
}

impl CompositionError {
    /// Create a malformed request error
    pub fn malformed(reason: impl Into<String>) -> Self {
        CompositionError::MalformedRequest {
            reason: reason.into(),
        }
    }

    /// Create a build failure for a rendered key
    pub fn build_failure(key: impl ToString, reason: impl Into<String>) -> Self {
        CompositionError::BuildFailure {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Check if the caller must fix its inputs
    pub fn is_malformed(&self) -> bool {
        matches!(self, CompositionError::MalformedRequest { .. })
    }

    /// Check if this came from the blueprint backend
    pub fn is_build_failure(&self) -> bool {
        matches!(self, CompositionError::BuildFailure { .. })
    }

    /// Check if this is a capability mismatch at bind or dispatch time
    pub fn is_capability_error(&self) -> bool {
        matches!(
            self,
            CompositionError::CapabilityNotImplemented { .. }
                | CompositionError::CapabilityNotDeclared(_)
        )
    }
}

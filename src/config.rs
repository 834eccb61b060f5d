// Copyright 2025 Cowboy AI, LLC.

//! Configuration for a composition context

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::errors::{CompositionError, CompositionResult};

/// How operation-less (marker) capabilities are treated during auto-derivation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPolicy {
    /// Marker capabilities are routed like any other capability
    #[default]
    Include,
    /// Marker capabilities are left out of auto-derived routes
    Exclude,
}

impl MarkerPolicy {
    /// Check if a capability with this marker status should be routed
    pub fn admits(&self, is_marker: bool) -> bool {
        match self {
            MarkerPolicy::Include => true,
            MarkerPolicy::Exclude => !is_marker,
        }
    }
}

/// Composition context configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    /// Marker capability policy for auto-derived routes
    pub marker_capabilities: MarkerPolicy,
    /// Bound on cached route tables; unbounded when absent
    pub route_cache_capacity: Option<usize>,
    /// Name of the scope used when callers do not pass one
    pub default_scope: String,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            marker_capabilities: MarkerPolicy::Include,
            route_cache_capacity: None,
            default_scope: "default".to_string(),
        }
    }
}

impl CompositionConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> CompositionResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the context cannot honor
    pub fn validate(&self) -> CompositionResult<()> {
        if self.route_cache_capacity == Some(0) {
            return Err(CompositionError::Configuration(
                "route_cache_capacity must be at least 1".to_string(),
            ));
        }
        if self.default_scope.is_empty() {
            return Err(CompositionError::Configuration(
                "default_scope must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Route cache bound, if any
    pub fn route_capacity(&self) -> Option<NonZeroUsize> {
        self.route_cache_capacity.and_then(NonZeroUsize::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompositionConfig::default();
        assert_eq!(config.marker_capabilities, MarkerPolicy::Include);
        assert_eq!(config.route_capacity(), None);
        assert_eq!(config.default_scope, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            CompositionConfig::from_json(r#"{"marker_capabilities": "exclude", "route_cache_capacity": 64}"#)
                .unwrap();
        assert_eq!(config.marker_capabilities, MarkerPolicy::Exclude);
        assert_eq!(config.route_capacity(), NonZeroUsize::new(64));
        assert_eq!(config.default_scope, "default");
    }

    #[test]
    fn test_from_json_rejects_zero_capacity() {
        let err = CompositionConfig::from_json(r#"{"route_cache_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, CompositionError::Configuration(_)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = CompositionConfig::from_json("marker").unwrap_err();
        assert!(matches!(err, CompositionError::Configuration(_)));
    }

    #[test]
    fn test_marker_policy_admits() {
        assert!(MarkerPolicy::Include.admits(true));
        assert!(MarkerPolicy::Include.admits(false));
        assert!(!MarkerPolicy::Exclude.admits(true));
        assert!(MarkerPolicy::Exclude.admits(false));
    }
}

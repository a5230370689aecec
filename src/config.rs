//! Emitter configuration
//!
//! Replaces the original generator's module-level namespace and id state
//! with an explicit, caller-owned value. The id factory is a Python
//! expression injected into the emitted base class, so callers can swap
//! `uuid.uuid4` for a deterministic generator in tests.

use serde::{Deserialize, Serialize};

/// Configuration for the emitted Python module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Namespace prepended to synthesized instance URIs
    #[serde(default = "default_instance_namespace")]
    pub instance_namespace: String,

    /// Python expression called to mint a fresh instance id
    #[serde(default = "default_id_factory")]
    pub id_factory_expr: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            instance_namespace: default_instance_namespace(),
            id_factory_expr: default_id_factory(),
        }
    }
}

fn default_instance_namespace() -> String {
    "http://example.org/instance/".to_string()
}

fn default_id_factory() -> String {
    "uuid.uuid4".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EmitConfig::default();
        assert_eq!(config.instance_namespace, "http://example.org/instance/");
        assert_eq!(config.id_factory_expr, "uuid.uuid4");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EmitConfig =
            serde_json::from_str(r#"{"instance_namespace": "http://data.example.com/"}"#).unwrap();
        assert_eq!(config.instance_namespace, "http://data.example.com/");
        assert_eq!(config.id_factory_expr, "uuid.uuid4");
    }
}

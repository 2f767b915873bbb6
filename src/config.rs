//! Analyzer configuration
//!
//! Loaded from JSON by the host, e.g.
//!
//! ```json
//! { "std_builtins": true,
//!   "extra_builtins": [ { "name": "sqrt", "params": ["Double"], "ret": "Double" } ] }
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Options applied when preparing the global scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Register the standard built-ins (print, println, readLine)
    pub std_builtins: bool,
    /// Additional host functions visible to checked programs
    pub extra_builtins: Vec<BuiltinSpec>,
}

/// Signature of a host function, with types given by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinSpec {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "void_name")]
    pub ret: String,
}

fn void_name() -> String {
    "Void".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            std_builtins: true,
            extra_builtins: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse a configuration from JSON text
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid analyzer configuration")
    }

    /// Read a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = AnalyzerConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert!(config.std_builtins);
    }

    #[test]
    fn test_extra_builtins() {
        let config = AnalyzerConfig::from_json(
            r#"{ "std_builtins": false,
                 "extra_builtins": [ { "name": "sqrt", "params": ["Double"], "ret": "Double" },
                                     { "name": "beep" } ] }"#,
        )
        .unwrap();
        assert!(!config.std_builtins);
        assert_eq!(config.extra_builtins.len(), 2);
        assert_eq!(config.extra_builtins[1].ret, "Void");
        assert!(config.extra_builtins[1].params.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = AnalyzerConfig::from_json("{ \"std_builtins\": 3 }").unwrap_err();
        assert!(err.to_string().contains("invalid analyzer configuration"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalyzerConfig::load("/nonexistent/mel.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}

//! Analyzer configuration shared by the telemetry and telecommand analyzers

use serde::{Deserialize, Serialize};

use crate::metadata::Endianness;

/// Document-level inference settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Number of leading body paragraphs searched for the subsystem name
    pub paragraph_scan_limit: usize,
    /// System name used when nothing in the document identifies one
    pub default_system_name: String,
    /// Extra (subsystem keyword, abbreviation) pairs, checked before the
    /// built-in list
    pub extra_system_names: Vec<(String, String)>,
    /// Byte order assumed when the paragraphs never declare one
    pub default_endianness: Endianness,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            paragraph_scan_limit: 30,
            default_system_name: "SYS".to_string(),
            extra_system_names: Vec::new(),
            default_endianness: Endianness::Big,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.paragraph_scan_limit, 30);
        assert_eq!(config.default_system_name, "SYS");
        assert_eq!(config.default_endianness, Endianness::Big);
    }

    #[test]
    fn test_config_partial_json() {
        let config: AnalyzerConfig = serde_json::from_str(
            r#"{"paragraph_scan_limit": 5, "extra_system_names": [["光学载荷", "OPT"]]}"#,
        )
        .unwrap();
        assert_eq!(config.paragraph_scan_limit, 5);
        assert_eq!(config.default_system_name, "SYS");
        assert_eq!(
            config.extra_system_names,
            vec![("光学载荷".to_string(), "OPT".to_string())]
        );
    }
}

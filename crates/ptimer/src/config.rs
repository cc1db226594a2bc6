//! Serializable timer configuration

use crate::error::TimerResult;
use serde::{Deserialize, Serialize};

/// Timer settings that can be stored as data.
///
/// Only the built-in formatters can be named here; custom formatters are
/// attached through [`TimerBuilder::custom_fmt`](crate::TimerBuilder::custom_fmt).
/// The formatter name is not validated until the config is applied to a
/// builder and built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    /// Report prefix printed before the formatted duration.
    ///
    /// Used verbatim; the timer name is not appended to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explainer: Option<String>,

    /// Selector name of a built-in formatter (`time_fmt_ms`, `time_fmt_s`
    /// or `time_fmt_m`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_fmt: Option<String>,
}

impl TimerConfig {
    /// Create an empty configuration (all defaults).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> TimerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> TimerResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Builder method to set the explainer.
    pub fn with_explainer(mut self, explainer: impl Into<String>) -> Self {
        self.explainer = Some(explainer.into());
        self
    }

    /// Builder method to select a formatter by name.
    pub fn with_time_fmt(mut self, name: impl Into<String>) -> Self {
        self.time_fmt = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimerError;

    #[test]
    fn test_from_json() {
        let config =
            TimerConfig::from_json(r#"{"explainer": "Took ", "timeFmt": "time_fmt_s"}"#).unwrap();
        assert_eq!(config.explainer.as_deref(), Some("Took "));
        assert_eq!(config.time_fmt.as_deref(), Some("time_fmt_s"));
    }

    #[test]
    fn test_from_json_defaults() {
        let config = TimerConfig::from_json("{}").unwrap();
        assert_eq!(config, TimerConfig::new());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = TimerConfig::from_json("{\"timeFmt\": ").unwrap_err();
        assert!(matches!(err, TimerError::Serialization(_)));
    }

    #[test]
    fn test_unknown_name_accepted_until_build() {
        // Names are validated by the builder, not the parser
        let config = TimerConfig::from_json(r#"{"timeFmt": "time_fmt_h"}"#).unwrap();
        assert_eq!(config.time_fmt.as_deref(), Some("time_fmt_h"));
    }

    #[test]
    fn test_json_skips_unset_fields() {
        let json = TimerConfig::new().with_time_fmt("time_fmt_m").to_json().unwrap();
        assert_eq!(json, r#"{"timeFmt":"time_fmt_m"}"#);

        let back = TimerConfig::from_json(&json).unwrap();
        assert_eq!(back.time_fmt.as_deref(), Some("time_fmt_m"));
        assert!(back.explainer.is_none());
    }
}

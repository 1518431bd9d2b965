//! Script metadata banner.
//!
//! A packaged script leads with a single comment line holding its
//! metadata as JSON. Hosts strip the comment marker and parse the rest
//! to discover the script's contract before loading it.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptMetadata {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Parse the leading `//{...}` line of a packaged script.
pub fn parse_banner(line: &str) -> EngineResult<ScriptMetadata> {
    let body = line
        .trim_start()
        .strip_prefix("//")
        .ok_or_else(|| EngineError::BadBanner {
            reason: "banner must start with //".to_string(),
        })?;
    serde_json::from_str(body).map_err(|err| EngineError::BadBanner { reason: err.to_string() })
}

/// Render metadata back into a banner line.
pub fn render_banner(metadata: &ScriptMetadata) -> EngineResult<String> {
    let body = serde_json::to_string(metadata)
        .map_err(|err| EngineError::BadBanner { reason: err.to_string() })?;
    Ok(format!("//{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_round_trip() {
        let metadata = ScriptMetadata {
            name: "hamlet".to_string(),
            description: "wandering villagers".to_string(),
            plugins: vec!["base".to_string()],
            extra: None,
        };
        let banner = render_banner(&metadata).unwrap();
        assert!(banner.starts_with("//{"));
        assert_eq!(parse_banner(&banner).unwrap(), metadata);
    }

    #[test]
    fn rejects_missing_marker_and_bad_json() {
        assert!(matches!(
            parse_banner(r#"{"name":"x"}"#),
            Err(EngineError::BadBanner { .. })
        ));
        assert!(matches!(parse_banner("//not json"), Err(EngineError::BadBanner { .. })));
    }
}

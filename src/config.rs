//! Runtime configuration read from the host page.
//!
//! `index.html` may carry
//! `<meta name="case-graph-config" content='{"api_base_url": "/api"}'>`.
//! Missing keys take their defaults; a missing or broken tag yields the
//! default configuration.

use log::{Level, warn};
use serde::Deserialize;

pub const CONFIG_META_NAME: &str = "case-graph-config";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
	/// Prefix for every relationship store path, without trailing slash.
	pub api_base_url: String,
	pub log_level: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base_url: "/api".into(),
			log_level: "debug".into(),
		}
	}
}

impl AppConfig {
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		let mut config: AppConfig = serde_json::from_str(text)?;
		config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
		Ok(config)
	}

	/// Reads the config meta tag from the current document.
	pub fn from_document() -> Self {
		let content = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| {
				d.query_selector(&format!("meta[name=\"{CONFIG_META_NAME}\"]"))
					.ok()
					.flatten()
			})
			.and_then(|meta| meta.get_attribute("content"));
		let Some(content) = content else {
			return Self::default();
		};
		Self::from_json(&content).unwrap_or_else(|err| {
			warn!("ignoring malformed {CONFIG_META_NAME}: {err}");
			Self::default()
		})
	}

	pub fn level(&self) -> Level {
		self.log_level.parse().unwrap_or(Level::Debug)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = AppConfig::from_json(r#"{"api_base_url": "https://legal.example/api/"}"#).unwrap();
		assert_eq!(config.api_base_url, "https://legal.example/api");
		assert_eq!(config.level(), Level::Debug);
	}

	#[test]
	fn log_level_is_parsed() {
		let config = AppConfig::from_json(r#"{"log_level": "warn"}"#).unwrap();
		assert_eq!(config.level(), Level::Warn);
		assert_eq!(config.api_base_url, "/api");
	}

	#[test]
	fn garbage_is_rejected() {
		assert!(AppConfig::from_json("not json").is_err());
	}
}

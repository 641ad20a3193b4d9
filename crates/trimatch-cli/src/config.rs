use std::path::Path;

use serde::{Deserialize, Serialize};
use trimatch_ai::autoplay::AutoplayPacing;
use trimatch_engine::GameSettings;

use crate::util;

/// Contents of the JSON file passed with `--config`.
///
/// Every field is optional; missing ones keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub settings: GameSettings,
    pub pacing: AutoplayPacing,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => util::read_json_file("config", path)?,
            None => Self::default(),
        };
        config.settings.validate()?;
        log::debug!("loaded {config:?}");
        Ok(config)
    }
}

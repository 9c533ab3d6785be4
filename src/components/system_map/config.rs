//! Page-level configuration for the map.

use serde::Deserialize;

use super::error::{GraphError, Result};
use super::simulation::SimulationConfig;
use super::theme::ThemeName;

/// Everything a page can tune. Simulation fields sit at the top level of the
/// JSON object next to `theme`; anything omitted keeps its default.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapConfig {
	pub theme: ThemeName,
	#[serde(flatten)]
	pub simulation: SimulationConfig,
}

impl MapConfig {
	pub fn from_json(text: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(text).map_err(GraphError::InvalidJson)?;
		Ok(Self {
			simulation: config.simulation.sanitized(),
			..config
		})
	}
}

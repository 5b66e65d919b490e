//! Chart options and their TOML form.
//!
//! ```toml
//! house_system = "placidus"
//! ayanamsa = "lahiri"
//! node_mode = "true"
//! include_outer_planets = false
//! dasha_horizon_years = 120
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ayanamsa::AyanamsaModel;
use crate::ephemeris::NodeMode;
use crate::error::{ChartError, Result};
use crate::houses::HouseSystem;
use crate::CelestialBody;

pub const DEFAULT_DASHA_HORIZON_YEARS: f64 = 120.0;
const MAX_DASHA_HORIZON_YEARS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub house_system: HouseSystem,
    pub ayanamsa: AyanamsaModel,
    pub node_mode: NodeMode,
    pub include_outer_planets: bool,
    pub dasha_horizon_years: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            house_system: HouseSystem::default(),
            ayanamsa: AyanamsaModel::default(),
            node_mode: NodeMode::default(),
            include_outer_planets: false,
            dasha_horizon_years: DEFAULT_DASHA_HORIZON_YEARS,
        }
    }
}

/// Options as written by hand: names are free text until validated.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    house_system: Option<String>,
    ayanamsa: Option<String>,
    node_mode: Option<String>,
    include_outer_planets: Option<bool>,
    dasha_horizon_years: Option<f64>,
}

impl ChartOptions {
    /// Bodies charted under these options, Vedic nine first.
    pub fn bodies(&self) -> Vec<CelestialBody> {
        let mut bodies = CelestialBody::VEDIC.to_vec();
        if self.include_outer_planets {
            bodies.extend(CelestialBody::OUTER);
        }
        bodies
    }

    pub fn validate(&self) -> Result<()> {
        let years = self.dasha_horizon_years;
        if !years.is_finite() || years <= 0.0 || years > MAX_DASHA_HORIZON_YEARS {
            return Err(ChartError::Config(format!(
                "dasha_horizon_years must be in (0, {MAX_DASHA_HORIZON_YEARS}], got {years}"
            )));
        }
        Ok(())
    }

    /// Parses options from TOML; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: RawOptions = toml::from_str(s)?;
        let defaults = ChartOptions::default();
        let options = ChartOptions {
            house_system: raw
                .house_system
                .as_deref()
                .map(str::parse)
                .transpose()?
                .unwrap_or(defaults.house_system),
            ayanamsa: raw
                .ayanamsa
                .as_deref()
                .map(str::parse)
                .transpose()?
                .unwrap_or(defaults.ayanamsa),
            node_mode: raw
                .node_mode
                .as_deref()
                .map(str::parse)
                .transpose()?
                .unwrap_or(defaults.node_mode),
            include_outer_planets: raw
                .include_outer_planets
                .unwrap_or(defaults.include_outer_planets),
            dasha_horizon_years: raw.dasha_horizon_years.unwrap_or(defaults.dasha_horizon_years),
        };
        options.validate()?;
        Ok(options)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChartError::Config(format!("reading {}: {e}", path.display())))?;
        log::debug!("config: loading chart options from {}", path.display());
        Self::from_toml_str(&text)
    }
}

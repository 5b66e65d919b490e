//! Ayanamsa: the arc between the tropical and sidereal zodiacs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::time::{julian_centuries, terrestrial_time};
use crate::{normalize_degrees, JulianDay};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AyanamsaModel {
    /// Chitrapaksha; the Indian national calendar standard.
    #[default]
    Lahiri,
    Raman,
    Krishnamurti,
    FaganBradley,
    Yukteshwar,
}

impl AyanamsaModel {
    pub const ALL: [AyanamsaModel; 5] = [
        AyanamsaModel::Lahiri,
        AyanamsaModel::Raman,
        AyanamsaModel::Krishnamurti,
        AyanamsaModel::FaganBradley,
        AyanamsaModel::Yukteshwar,
    ];

    /// Value at J2000.0 in degrees.
    pub fn reference_j2000(self) -> f64 {
        match self {
            AyanamsaModel::Lahiri => 23.853,
            AyanamsaModel::Raman => 22.370,
            AyanamsaModel::Krishnamurti => 23.850,
            AyanamsaModel::FaganBradley => 24.736,
            AyanamsaModel::Yukteshwar => 22.376,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AyanamsaModel::Lahiri => "Lahiri",
            AyanamsaModel::Raman => "Raman",
            AyanamsaModel::Krishnamurti => "Krishnamurti",
            AyanamsaModel::FaganBradley => "Fagan-Bradley",
            AyanamsaModel::Yukteshwar => "Yukteshwar",
        }
    }
}

impl fmt::Display for AyanamsaModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AyanamsaModel {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "lahiri" | "chitrapaksha" => Ok(AyanamsaModel::Lahiri),
            "raman" | "bvraman" => Ok(AyanamsaModel::Raman),
            "krishnamurti" | "kp" => Ok(AyanamsaModel::Krishnamurti),
            "faganbradley" | "fagan" => Ok(AyanamsaModel::FaganBradley),
            "yukteshwar" | "sriyukteshwar" => Ok(AyanamsaModel::Yukteshwar),
            _ => Err(ChartError::UnknownAyanamsaModel(s.to_string())),
        }
    }
}

/// The ayanamsa a chart was computed with.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AyanamsaRecord {
    pub model: AyanamsaModel,
    pub value_deg: f64,
}

impl AyanamsaRecord {
    pub fn at(model: AyanamsaModel, jd_ut: JulianDay) -> Self {
        AyanamsaRecord {
            model,
            value_deg: ayanamsa_value(jd_ut, model),
        }
    }

    pub fn to_sidereal(&self, tropical: f64) -> f64 {
        to_sidereal(tropical, self.value_deg)
    }
}

/// General precession in longitude since J2000 (IAU 2006), degrees.
///
/// `t` is Julian centuries of TT since J2000.0.
pub fn general_precession_deg(t: f64) -> f64 {
    let arcsec = ((((-0.000_000_038_3 * t - 0.000_023_857) * t + 0.000_079_64) * t
        + 1.105_434_8)
        * t
        + 5028.796_195)
        * t;
    arcsec / 3600.0
}

/// Ayanamsa in degrees at a UT Julian Day.
pub fn ayanamsa_value(jd_ut: JulianDay, model: AyanamsaModel) -> f64 {
    let t = julian_centuries(terrestrial_time(jd_ut));
    model.reference_j2000() + general_precession_deg(t)
}

pub fn to_sidereal(tropical: f64, ayanamsa: f64) -> f64 {
    normalize_degrees(tropical - ayanamsa)
}

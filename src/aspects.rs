//! Major aspects between bodies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ChartOptions;
use crate::ephemeris::{EphemerisProvider, LowPrecisionEphemeris};
use crate::error::{ChartError, Result};
use crate::placement::BodyPosition;
use crate::{normalize_degrees, CelestialBody, JulianDay, ZodiacSign};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AspectType {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

impl AspectType {
    /// Ordered by exact angle.
    pub const ALL: [AspectType; 5] = [
        AspectType::Conjunction,
        AspectType::Sextile,
        AspectType::Square,
        AspectType::Trine,
        AspectType::Opposition,
    ];

    pub fn angle(self) -> f64 {
        match self {
            AspectType::Conjunction => 0.0,
            AspectType::Sextile => 60.0,
            AspectType::Square => 90.0,
            AspectType::Trine => 120.0,
            AspectType::Opposition => 180.0,
        }
    }

    pub fn max_orb(self) -> f64 {
        match self {
            AspectType::Sextile => 6.0,
            _ => 8.0,
        }
    }

    pub fn nature(self) -> AspectNature {
        match self {
            AspectType::Trine | AspectType::Sextile => AspectNature::Beneficial,
            AspectType::Square | AspectType::Opposition => AspectNature::Challenging,
            AspectType::Conjunction => AspectNature::Neutral,
        }
    }

    fn influences(self) -> [&'static str; 3] {
        match self {
            AspectType::Conjunction => [
                "intensifies and merges the energies",
                "creates a powerful focus of energy",
                "brings together different aspects of life",
            ],
            AspectType::Sextile => [
                "creates opportunities for growth",
                "facilitates easy flow of energy",
                "brings helpful circumstances",
            ],
            AspectType::Square => [
                "creates dynamic tension",
                "forces necessary changes",
                "highlights areas needing attention",
            ],
            AspectType::Trine => [
                "creates harmonious flow",
                "brings fortunate circumstances",
                "facilitates natural expression",
            ],
            AspectType::Opposition => [
                "creates awareness through tension",
                "highlights relationship dynamics",
                "brings issues to consciousness",
            ],
        }
    }
}

impl fmt::Display for AspectType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectNature {
    Beneficial,
    Challenging,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub body1: CelestialBody,
    pub body2: CelestialBody,
    pub aspect_type: AspectType,
    /// Shorter arc between the two bodies, `[0, 180]`.
    pub separation: f64,
    pub orb: f64,
    pub nature: AspectNature,
}

/// Shorter arc between two longitudes.
pub fn angular_separation(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(a - b);
    d.min(360.0 - d)
}

/// The aspect a separation forms, if any, with its orb.
///
/// When two aspects are in orb the tighter one wins; an exact tie goes to
/// the smaller angle.
pub fn classify(separation: f64) -> Option<(AspectType, f64)> {
    AspectType::ALL
        .iter()
        .map(|&kind| (kind, (separation - kind.angle()).abs()))
        .filter(|&(kind, orb)| orb <= kind.max_orb())
        .fold(None, |best: Option<(AspectType, f64)>, candidate| match best {
            Some(b) if b.1 <= candidate.1 => Some(b),
            _ => Some(candidate),
        })
}

fn aspect_between(
    body1: CelestialBody,
    lon1: f64,
    body2: CelestialBody,
    lon2: f64,
) -> Option<Aspect> {
    let separation = angular_separation(lon1, lon2);
    classify(separation).map(|(aspect_type, orb)| Aspect {
        body1,
        body2,
        aspect_type,
        separation,
        orb,
        nature: aspect_type.nature(),
    })
}

/// Every aspect among `positions`, at most one per unordered pair, in
/// input pair order.
pub fn find_aspects(positions: &[BodyPosition]) -> Vec<Aspect> {
    let mut aspects = Vec::new();
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            if let Some(aspect) = aspect_between(a.body, a.longitude, b.body, b.longitude) {
                aspects.push(aspect);
            }
        }
    }
    log::debug!("aspects: {} found among {} bodies", aspects.len(), positions.len());
    aspects
}

/// A current aspect from a sign's ruler, with a one-line reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitAspect {
    pub ruler: CelestialBody,
    pub other: CelestialBody,
    pub aspect_type: AspectType,
    pub orb: f64,
    pub influence: String,
}

/// Aspects the ruler of `sign` makes to every other body at `jd_ut`.
pub fn sign_transit_aspects(
    sign: ZodiacSign,
    jd_ut: JulianDay,
    options: &ChartOptions,
) -> Result<Vec<TransitAspect>> {
    let provider = LowPrecisionEphemeris::new(options.node_mode);
    sign_transit_aspects_with(&provider, sign, jd_ut, options)
}

pub fn sign_transit_aspects_with<P: EphemerisProvider>(
    provider: &P,
    sign: ZodiacSign,
    jd_ut: JulianDay,
    options: &ChartOptions,
) -> Result<Vec<TransitAspect>> {
    let ruler = sign.ruler();
    let positions = provider.positions_at(jd_ut, &options.bodies())?;
    let ruler_longitude = positions
        .iter()
        .find(|p| p.body == ruler)
        .map(|p| p.longitude)
        .ok_or_else(|| {
            ChartError::InternalComputationInvariant(format!(
                "ephemeris returned no position for {ruler}"
            ))
        })?;

    Ok(positions
        .iter()
        .filter(|p| p.body != ruler)
        .filter_map(|p| aspect_between(ruler, ruler_longitude, p.body, p.longitude))
        .map(|aspect| TransitAspect {
            influence: influence_sentence(&aspect),
            ruler,
            other: aspect.body2,
            aspect_type: aspect.aspect_type,
            orb: aspect.orb,
        })
        .collect())
}

/// Reading for an aspect; tighter orbs pick earlier phrases.
fn influence_sentence(aspect: &Aspect) -> String {
    let third = aspect.aspect_type.max_orb() / 3.0;
    let index = ((aspect.orb / third).floor() as usize).min(2);
    format!(
        "The {} between {} and {} {}.",
        aspect.aspect_type.to_string().to_lowercase(),
        aspect.body1,
        aspect.body2,
        aspect.aspect_type.influences()[index]
    )
}

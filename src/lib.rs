// src/lib.rs

//! Vedic natal chart engine.
//!
//! A chart is a pure function of a [`BirthInput`] and [`ChartOptions`]:
//! low-precision ephemeris → ayanamsa → houses → placements, then aspects,
//! Vimshottari dashas and yogas folded into one immutable [`Chart`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod aspects;
pub mod ayanamsa;
pub mod chart;
pub mod config;
pub mod dasha;
pub mod ephemeris;
pub mod error;
pub mod houses;
pub mod placement;
pub mod time;
pub mod yogas;

pub use aspects::{
    find_aspects, sign_transit_aspects, Aspect, AspectNature, AspectType, TransitAspect,
};
pub use ayanamsa::{ayanamsa_value, AyanamsaModel, AyanamsaRecord};
pub use chart::{compute_chart, compute_chart_with, Chart, HouseReading};
pub use config::ChartOptions;
pub use dasha::{vimshottari, DashaLevel, DashaPeriod};
pub use ephemeris::{EphemerisProvider, LowPrecisionEphemeris, NodeMode, TropicalPosition};
pub use error::{ChartError, Result};
pub use houses::{HouseCusp, HouseFrame, HouseSystem};
pub use placement::{BodyPosition, Dignity, NakshatraInfo};
pub use time::{BirthInput, BirthTime, ResolvedBirth};
pub use yogas::{detect_yogas, Yoga};

pub type JulianDay = f64;

/// Width of one nakshatra: 13°20′.
pub const NAKSHATRA_SPAN: f64 = 360.0 / 27.0;

/// Wraps any angle into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let r = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Wraps an angle difference into `(-180, 180]`.
pub fn wrap_signed_degrees(angle: f64) -> f64 {
    let r = normalize_degrees(angle);
    if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

// ---------------------------
// ## Enumerations
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CelestialBody {
    Sun,
    Moon,
    Mars,
    Mercury,
    Jupiter,
    Venus,
    Saturn,
    Rahu,
    Ketu,
    Uranus,
    Neptune,
    Pluto,
}

impl CelestialBody {
    /// The nine grahas of the Vedic chart.
    pub const VEDIC: [CelestialBody; 9] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Mars,
        CelestialBody::Mercury,
        CelestialBody::Jupiter,
        CelestialBody::Venus,
        CelestialBody::Saturn,
        CelestialBody::Rahu,
        CelestialBody::Ketu,
    ];

    /// Trans-Saturnian extension used by Western-style charts.
    pub const OUTER: [CelestialBody; 3] = [
        CelestialBody::Uranus,
        CelestialBody::Neptune,
        CelestialBody::Pluto,
    ];

    pub fn iter() -> impl Iterator<Item = CelestialBody> {
        Self::VEDIC.iter().chain(Self::OUTER.iter()).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Mars => "Mars",
            CelestialBody::Mercury => "Mercury",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Venus => "Venus",
            CelestialBody::Saturn => "Saturn",
            CelestialBody::Rahu => "Rahu",
            CelestialBody::Ketu => "Ketu",
            CelestialBody::Uranus => "Uranus",
            CelestialBody::Neptune => "Neptune",
            CelestialBody::Pluto => "Pluto",
        }
    }

    pub fn is_node(self) -> bool {
        matches!(self, CelestialBody::Rahu | CelestialBody::Ketu)
    }

    /// Sun through Saturn: the bodies classical yoga rules count.
    pub fn is_classical(self) -> bool {
        matches!(
            self,
            CelestialBody::Sun
                | CelestialBody::Moon
                | CelestialBody::Mars
                | CelestialBody::Mercury
                | CelestialBody::Jupiter
                | CelestialBody::Venus
                | CelestialBody::Saturn
        )
    }

    pub fn is_natural_benefic(self) -> bool {
        matches!(
            self,
            CelestialBody::Jupiter | CelestialBody::Venus | CelestialBody::Mercury
        )
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries = 0,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    pub fn from_longitude(longitude: f64) -> Self {
        let index = (normalize_degrees(longitude) / 30.0).floor() as usize;
        Self::ALL[index.min(11)]
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sign `n` places after this one (`n = 6` is the opposite sign).
    pub fn offset(self, n: usize) -> Self {
        Self::from_index(self.index() + n)
    }

    pub fn opposite(self) -> Self {
        self.offset(6)
    }

    /// Classical seven-planet rulership.
    pub fn ruler(self) -> CelestialBody {
        match self {
            ZodiacSign::Aries | ZodiacSign::Scorpio => CelestialBody::Mars,
            ZodiacSign::Taurus | ZodiacSign::Libra => CelestialBody::Venus,
            ZodiacSign::Gemini | ZodiacSign::Virgo => CelestialBody::Mercury,
            ZodiacSign::Cancer => CelestialBody::Moon,
            ZodiacSign::Leo => CelestialBody::Sun,
            ZodiacSign::Sagittarius | ZodiacSign::Pisces => CelestialBody::Jupiter,
            ZodiacSign::Capricorn | ZodiacSign::Aquarius => CelestialBody::Saturn,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ZodiacSign {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        ZodiacSign::ALL
            .iter()
            .copied()
            .find(|sign| sign.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChartError::InvalidBirthInput(format!("unknown zodiac sign '{s}'")))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nakshatra {
    Ashwini,
    Bharani,
    Krittika,
    Rohini,
    Mrigashira,
    Ardra,
    Punarvasu,
    Pushya,
    Ashlesha,
    Magha,
    PurvaPhalguni,
    UttaraPhalguni,
    Hasta,
    Chitra,
    Swati,
    Vishakha,
    Anuradha,
    Jyeshtha,
    Moola,
    PurvaAshadha,
    UttaraAshadha,
    Shravana,
    Dhanishta,
    Shatabhisha,
    PurvaBhadrapada,
    UttaraBhadrapada,
    Revati,
}

impl Nakshatra {
    pub const ALL: [Nakshatra; 27] = [
        Nakshatra::Ashwini,
        Nakshatra::Bharani,
        Nakshatra::Krittika,
        Nakshatra::Rohini,
        Nakshatra::Mrigashira,
        Nakshatra::Ardra,
        Nakshatra::Punarvasu,
        Nakshatra::Pushya,
        Nakshatra::Ashlesha,
        Nakshatra::Magha,
        Nakshatra::PurvaPhalguni,
        Nakshatra::UttaraPhalguni,
        Nakshatra::Hasta,
        Nakshatra::Chitra,
        Nakshatra::Swati,
        Nakshatra::Vishakha,
        Nakshatra::Anuradha,
        Nakshatra::Jyeshtha,
        Nakshatra::Moola,
        Nakshatra::PurvaAshadha,
        Nakshatra::UttaraAshadha,
        Nakshatra::Shravana,
        Nakshatra::Dhanishta,
        Nakshatra::Shatabhisha,
        Nakshatra::PurvaBhadrapada,
        Nakshatra::UttaraBhadrapada,
        Nakshatra::Revati,
    ];

    pub fn from_longitude(longitude: f64) -> Nakshatra {
        Self::ALL[Self::index_of(longitude)]
    }

    /// Zero-based nakshatra index of a sidereal longitude.
    pub fn index_of(longitude: f64) -> usize {
        ((normalize_degrees(longitude) / NAKSHATRA_SPAN).floor() as usize).min(26)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Vimshottari lord: the nine-lord sequence repeats three times round the zodiac.
    pub fn lord(self) -> CelestialBody {
        dasha::VIMSHOTTARI_SEQUENCE[self.index() % 9].0
    }

    /// Start of this nakshatra in sidereal longitude.
    pub fn start(self) -> f64 {
        self.index() as f64 * NAKSHATRA_SPAN
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

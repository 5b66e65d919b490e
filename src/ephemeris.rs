//! Low-precision geocentric ephemeris.
//!
//! Planets come from Keplerian elements with linear rates (E. M. Standish,
//! "Keplerian Elements for Approximate Positions of the Major Planets",
//! the 1800–2050 table). The Moon uses the principal periodic terms of
//! ELP-2000/82 as tabulated by Meeus, *Astronomical Algorithms* ch. 47, and
//! the lunar nodes use the Meeus mean-node polynomial. Longitudes are
//! tropical, referred to the mean equinox of date. Accuracy is on the order
//! of a few arcminutes for the planets and about 0.05° for the Moon,
//! comfortably finer than a nakshatra pada.

use serde::{Deserialize, Serialize};

use crate::ayanamsa::general_precession_deg;
use crate::error::{ChartError, Result};
use crate::time::{julian_centuries, terrestrial_time};
use crate::{normalize_degrees, wrap_signed_degrees, CelestialBody, JulianDay};

/// First day the element table is valid for: 1800-01-01T00:00 UT.
pub const EPHEMERIS_MIN_JD: JulianDay = 2_378_496.5;
/// End of the element table: 2051-01-01T00:00 UT (exclusive).
pub const EPHEMERIS_MAX_JD: JulianDay = 2_470_172.5;

/// Half-width of the central difference used for daily motion.
const SPEED_HALF_STEP_DAYS: f64 = 0.5;

/// Light travel time for one astronomical unit, in days.
const LIGHT_TIME_DAYS_PER_AU: f64 = 0.005_775_518_3;

/// Annual aberration applied to the Sun's longitude, degrees.
const SOLAR_ABERRATION_DEG: f64 = -20.4898 / 3600.0;

/// Which lunar node Rahu follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    /// Smooth polynomial motion; always retrograde.
    #[default]
    Mean,
    /// Mean node plus the principal short-period perturbations.
    True,
}

impl std::str::FromStr for NodeMode {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(NodeMode::Mean),
            "true" | "osculating" => Ok(NodeMode::True),
            other => Err(ChartError::Config(format!("unknown node mode '{other}'"))),
        }
    }
}

/// Geocentric tropical position of one body at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TropicalPosition {
    pub body: CelestialBody,
    /// Ecliptic longitude, mean equinox of date, `[0, 360)`.
    pub longitude: f64,
    /// Ecliptic latitude in degrees.
    pub latitude: f64,
    /// Daily motion in longitude, degrees/day; negative means retrograde.
    pub speed: f64,
}

/// Source of geocentric tropical positions.
///
/// Implementations must be pure: the same Julian Day always yields the
/// same positions.
pub trait EphemerisProvider {
    fn positions_at(
        &self,
        jd_ut: JulianDay,
        bodies: &[CelestialBody],
    ) -> Result<Vec<TropicalPosition>>;
}

/// Keplerian-element ephemeris valid 1800–2050.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowPrecisionEphemeris {
    node_mode: NodeMode,
}

impl LowPrecisionEphemeris {
    pub fn new(node_mode: NodeMode) -> Self {
        LowPrecisionEphemeris { node_mode }
    }

    pub fn node_mode(&self) -> NodeMode {
        self.node_mode
    }

    /// Longitude and latitude of one body at a Terrestrial Time Julian Day.
    fn ecliptic_of_date(&self, body: CelestialBody, jd_tt: JulianDay) -> Result<(f64, f64)> {
        let t = julian_centuries(jd_tt);
        let position = match body {
            CelestialBody::Sun => {
                let earth = heliocentric(&EARTH_MOON_BARYCENTER, t);
                let (lon, lat) = spherical([-earth[0], -earth[1], -earth[2]]);
                let r = norm(earth);
                (
                    normalize_degrees(lon + general_precession_deg(t) + SOLAR_ABERRATION_DEG / r),
                    lat,
                )
            }
            CelestialBody::Moon => moon_longitude_latitude(t),
            CelestialBody::Rahu => (self.rahu_longitude(t), 0.0),
            CelestialBody::Ketu => (normalize_degrees(self.rahu_longitude(t) + 180.0), 0.0),
            planet => {
                let elements = planet_elements(planet).ok_or_else(|| {
                    ChartError::InternalComputationInvariant(format!(
                        "{planet} has no orbital elements"
                    ))
                })?;
                let (lon, lat) = geocentric_planet(elements, t);
                (normalize_degrees(lon + general_precession_deg(t)), lat)
            }
        };
        Ok(position)
    }

    fn rahu_longitude(&self, t: f64) -> f64 {
        match self.node_mode {
            NodeMode::Mean => mean_node_longitude(t),
            NodeMode::True => true_node_longitude(t),
        }
    }
}

impl EphemerisProvider for LowPrecisionEphemeris {
    fn positions_at(
        &self,
        jd_ut: JulianDay,
        bodies: &[CelestialBody],
    ) -> Result<Vec<TropicalPosition>> {
        check_range(jd_ut)?;
        let jd_tt = terrestrial_time(jd_ut);

        let positions = bodies
            .iter()
            .map(|&body| {
                let (longitude, latitude) = self.ecliptic_of_date(body, jd_tt)?;
                let (before, _) = self.ecliptic_of_date(body, jd_tt - SPEED_HALF_STEP_DAYS)?;
                let (after, _) = self.ecliptic_of_date(body, jd_tt + SPEED_HALF_STEP_DAYS)?;
                let speed = wrap_signed_degrees(after - before) / (2.0 * SPEED_HALF_STEP_DAYS);
                Ok(TropicalPosition {
                    body,
                    longitude,
                    latitude,
                    speed,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::trace!("ephemeris: {} bodies at jd {:.5}", positions.len(), jd_ut);
        Ok(positions)
    }
}

/// Fails with `DateOutOfRange` outside the element table's validity window.
pub fn check_range(jd_ut: JulianDay) -> Result<()> {
    if !jd_ut.is_finite() || !(EPHEMERIS_MIN_JD..EPHEMERIS_MAX_JD).contains(&jd_ut) {
        return Err(ChartError::DateOutOfRange {
            julian_day: jd_ut,
            min: EPHEMERIS_MIN_JD,
            max: EPHEMERIS_MAX_JD,
        });
    }
    Ok(())
}

// ---------------------------
// ## Keplerian elements
// ---------------------------

/// Elements at J2000 and their rates per Julian century.
///
/// Angles in degrees, semi-major axis in AU, referred to the mean ecliptic
/// and equinox of J2000.
struct OrbitalElements {
    semi_major_axis: [f64; 2],
    eccentricity: [f64; 2],
    inclination: [f64; 2],
    mean_longitude: [f64; 2],
    perihelion_longitude: [f64; 2],
    node_longitude: [f64; 2],
}

#[rustfmt::skip]
const MERCURY: OrbitalElements = OrbitalElements {
    semi_major_axis: [0.38709927, 0.00000037],
    eccentricity: [0.20563593, 0.00001906],
    inclination: [7.00497902, -0.00594749],
    mean_longitude: [252.25032350, 149472.67411175],
    perihelion_longitude: [77.45779628, 0.16047689],
    node_longitude: [48.33076593, -0.12534081],
};

#[rustfmt::skip]
const VENUS: OrbitalElements = OrbitalElements {
    semi_major_axis: [0.72333566, 0.00000390],
    eccentricity: [0.00677672, -0.00004107],
    inclination: [3.39467605, -0.00078890],
    mean_longitude: [181.97909950, 58517.81538729],
    perihelion_longitude: [131.60246718, 0.00268329],
    node_longitude: [76.67984255, -0.27769418],
};

#[rustfmt::skip]
const EARTH_MOON_BARYCENTER: OrbitalElements = OrbitalElements {
    semi_major_axis: [1.00000261, 0.00000562],
    eccentricity: [0.01671123, -0.00004392],
    inclination: [-0.00001531, -0.01294668],
    mean_longitude: [100.46457166, 35999.37244981],
    perihelion_longitude: [102.93768193, 0.32327364],
    node_longitude: [0.0, 0.0],
};

#[rustfmt::skip]
const MARS: OrbitalElements = OrbitalElements {
    semi_major_axis: [1.52371034, 0.00001847],
    eccentricity: [0.09339410, 0.00007882],
    inclination: [1.84969142, -0.00813131],
    mean_longitude: [-4.55343205, 19140.30268499],
    perihelion_longitude: [-23.94362959, 0.44441088],
    node_longitude: [49.55953891, -0.29257343],
};

#[rustfmt::skip]
const JUPITER: OrbitalElements = OrbitalElements {
    semi_major_axis: [5.20288700, -0.00011607],
    eccentricity: [0.04838624, -0.00013253],
    inclination: [1.30439695, -0.00183714],
    mean_longitude: [34.39644051, 3034.74612775],
    perihelion_longitude: [14.72847983, 0.21252668],
    node_longitude: [100.47390909, 0.20469106],
};

#[rustfmt::skip]
const SATURN: OrbitalElements = OrbitalElements {
    semi_major_axis: [9.53667594, -0.00125060],
    eccentricity: [0.05386179, -0.00050991],
    inclination: [2.48599187, 0.00193609],
    mean_longitude: [49.95424423, 1222.49362201],
    perihelion_longitude: [92.59887831, -0.41897216],
    node_longitude: [113.66242448, -0.28867794],
};

#[rustfmt::skip]
const URANUS: OrbitalElements = OrbitalElements {
    semi_major_axis: [19.18916464, -0.00196176],
    eccentricity: [0.04725744, -0.00004397],
    inclination: [0.77263783, -0.00242939],
    mean_longitude: [313.23810451, 428.48202785],
    perihelion_longitude: [170.95427630, 0.40805281],
    node_longitude: [74.01692503, 0.04240589],
};

#[rustfmt::skip]
const NEPTUNE: OrbitalElements = OrbitalElements {
    semi_major_axis: [30.06992276, 0.00026291],
    eccentricity: [0.00859048, 0.00005105],
    inclination: [1.77004347, 0.00035372],
    mean_longitude: [-55.12002969, 218.45945325],
    perihelion_longitude: [44.96476227, -0.32241464],
    node_longitude: [131.78422574, -0.00508664],
};

#[rustfmt::skip]
const PLUTO: OrbitalElements = OrbitalElements {
    semi_major_axis: [39.48211675, -0.00031596],
    eccentricity: [0.24882730, 0.00005170],
    inclination: [17.14001206, 0.00004818],
    mean_longitude: [238.92903833, 145.20780515],
    perihelion_longitude: [224.06891629, -0.04062942],
    node_longitude: [110.30393684, -0.01183482],
};

/// Heliocentric elements; `None` for the Sun, the Moon and the nodes.
fn planet_elements(body: CelestialBody) -> Option<&'static OrbitalElements> {
    match body {
        CelestialBody::Mercury => Some(&MERCURY),
        CelestialBody::Venus => Some(&VENUS),
        CelestialBody::Mars => Some(&MARS),
        CelestialBody::Jupiter => Some(&JUPITER),
        CelestialBody::Saturn => Some(&SATURN),
        CelestialBody::Uranus => Some(&URANUS),
        CelestialBody::Neptune => Some(&NEPTUNE),
        CelestialBody::Pluto => Some(&PLUTO),
        CelestialBody::Sun | CelestialBody::Moon | CelestialBody::Rahu | CelestialBody::Ketu => {
            None
        }
    }
}

fn at(element: [f64; 2], t: f64) -> f64 {
    element[0] + element[1] * t
}

/// Solves Kepler's equation `E - e sin E = M` by Newton iteration, radians.
fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> f64 {
    let mut ecc = mean_anomaly + e * mean_anomaly.sin();
    for _ in 0..30 {
        let delta = (ecc - e * ecc.sin() - mean_anomaly) / (1.0 - e * ecc.cos());
        ecc -= delta;
        if delta.abs() < 1e-12 {
            break;
        }
    }
    ecc
}

/// Heliocentric ecliptic J2000 rectangular coordinates in AU.
fn heliocentric(el: &OrbitalElements, t: f64) -> [f64; 3] {
    let a = at(el.semi_major_axis, t);
    let e = at(el.eccentricity, t);
    let i = at(el.inclination, t).to_radians();
    let l = at(el.mean_longitude, t);
    let varpi = at(el.perihelion_longitude, t);
    let node = at(el.node_longitude, t);

    let omega = (varpi - node).to_radians();
    let node = node.to_radians();
    let mean_anomaly = wrap_signed_degrees(l - varpi).to_radians();

    let ecc = eccentric_anomaly(mean_anomaly, e);
    let xp = a * (ecc.cos() - e);
    let yp = a * (1.0 - e * e).sqrt() * ecc.sin();

    let (so, co) = omega.sin_cos();
    let (sn, cn) = node.sin_cos();
    let (si, ci) = i.sin_cos();

    [
        (co * cn - so * sn * ci) * xp + (-so * cn - co * sn * ci) * yp,
        (co * sn + so * cn * ci) * xp + (-so * sn + co * cn * ci) * yp,
        (so * si) * xp + (co * si) * yp,
    ]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Longitude `[0, 360)` and latitude of a rectangular ecliptic vector.
fn spherical(v: [f64; 3]) -> (f64, f64) {
    let lon = normalize_degrees(v[1].atan2(v[0]).to_degrees());
    let lat = v[2].atan2((v[0] * v[0] + v[1] * v[1]).sqrt()).to_degrees();
    (lon, lat)
}

/// Geocentric J2000 longitude/latitude, corrected once for light time.
fn geocentric_planet(el: &OrbitalElements, t: f64) -> (f64, f64) {
    let earth = heliocentric(&EARTH_MOON_BARYCENTER, t);
    let relative = |planet: [f64; 3]| {
        [
            planet[0] - earth[0],
            planet[1] - earth[1],
            planet[2] - earth[2],
        ]
    };

    let first = relative(heliocentric(el, t));
    let tau = LIGHT_TIME_DAYS_PER_AU * norm(first) / crate::time::DAYS_PER_JULIAN_CENTURY;
    spherical(relative(heliocentric(el, t - tau)))
}

// ---------------------------
// ## Moon and nodes
// ---------------------------

/// Delaunay-style arguments of Meeus ch. 47, degrees.
struct LunarArguments {
    mean_longitude: f64,
    elongation: f64,
    sun_anomaly: f64,
    moon_anomaly: f64,
    latitude_argument: f64,
    eccentricity_factor: f64,
}

fn lunar_arguments(t: f64) -> LunarArguments {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    LunarArguments {
        mean_longitude: 218.3164477 + 481_267.881_234_21 * t - 0.0015786 * t2 + t3 / 538_841.0
            - t4 / 65_194_000.0,
        elongation: 297.8501921 + 445_267.111_403_4 * t - 0.0018819 * t2 + t3 / 545_868.0
            - t4 / 113_065_000.0,
        sun_anomaly: 357.5291092 + 35_999.050_290_9 * t - 0.0001536 * t2 + t3 / 24_490_000.0,
        moon_anomaly: 134.9633964 + 477_198.867_505_5 * t + 0.0087414 * t2 + t3 / 69_699.0
            - t4 / 14_712_000.0,
        latitude_argument: 93.2720950 + 483_202.017_523_3 * t - 0.0036539 * t2
            - t3 / 3_526_000.0
            + t4 / 863_310_000.0,
        eccentricity_factor: 1.0 - 0.002516 * t - 0.0000074 * t2,
    }
}

// Multipliers of D, M, M', F and the coefficient in 1e-6 degrees.
#[rustfmt::skip]
const MOON_LONGITUDE_TERMS: [(i8, i8, i8, i8, f64); 34] = [
    (0, 0, 1, 0, 6_288_774.0),
    (2, 0, -1, 0, 1_274_027.0),
    (2, 0, 0, 0, 658_314.0),
    (0, 0, 2, 0, 213_618.0),
    (0, 1, 0, 0, -185_116.0),
    (0, 0, 0, 2, -114_332.0),
    (2, 0, -2, 0, 58_793.0),
    (2, -1, -1, 0, 57_066.0),
    (2, 0, 1, 0, 53_322.0),
    (2, -1, 0, 0, 45_758.0),
    (0, 1, -1, 0, -40_923.0),
    (1, 0, 0, 0, -34_720.0),
    (0, 1, 1, 0, -30_383.0),
    (2, 0, 0, -2, 15_327.0),
    (0, 0, 1, 2, -12_528.0),
    (0, 0, 1, -2, 10_980.0),
    (4, 0, -1, 0, 10_675.0),
    (0, 0, 3, 0, 10_034.0),
    (4, 0, -2, 0, 8_548.0),
    (2, 1, -1, 0, -7_888.0),
    (2, 1, 0, 0, -6_766.0),
    (1, 0, -1, 0, -5_163.0),
    (1, 1, 0, 0, 4_987.0),
    (2, -1, 1, 0, 4_036.0),
    (2, 0, 2, 0, 3_994.0),
    (4, 0, 0, 0, 3_861.0),
    (2, 0, -3, 0, 3_665.0),
    (0, 1, -2, 0, -2_689.0),
    (2, 0, -1, 2, -2_602.0),
    (2, -1, -2, 0, 2_390.0),
    (1, 0, 1, 0, -2_348.0),
    (2, -2, 0, 0, 2_236.0),
    (0, 1, 2, 0, -2_120.0),
    (0, 2, 0, 0, -2_069.0),
];

#[rustfmt::skip]
const MOON_LATITUDE_TERMS: [(i8, i8, i8, i8, f64); 15] = [
    (0, 0, 0, 1, 5_128_122.0),
    (0, 0, 1, 1, 280_602.0),
    (0, 0, 1, -1, 277_693.0),
    (2, 0, 0, -1, 173_237.0),
    (2, 0, -1, 1, 55_413.0),
    (2, 0, -1, -1, 46_271.0),
    (2, 0, 0, 1, 32_573.0),
    (0, 0, 2, 1, 17_198.0),
    (2, 0, 1, -1, 9_266.0),
    (0, 0, 2, -1, 8_822.0),
    (2, -1, 0, -1, 8_216.0),
    (2, 0, -2, -1, 4_324.0),
    (2, 0, 1, 1, 4_200.0),
    (2, 1, 0, -1, -3_359.0),
    (2, -1, -1, 1, 2_463.0),
];

fn periodic_sum(terms: &[(i8, i8, i8, i8, f64)], args: &LunarArguments) -> f64 {
    terms
        .iter()
        .map(|&(d, m, mp, f, coefficient)| {
            let angle = (f64::from(d) * args.elongation
                + f64::from(m) * args.sun_anomaly
                + f64::from(mp) * args.moon_anomaly
                + f64::from(f) * args.latitude_argument)
                .to_radians();
            // terms in the Sun's anomaly shrink with Earth's eccentricity
            let e_factor = args.eccentricity_factor.powi(i32::from(m.unsigned_abs()));
            coefficient * e_factor * angle.sin()
        })
        .sum()
}

/// Geocentric Moon, mean equinox of date, degrees.
fn moon_longitude_latitude(t: f64) -> (f64, f64) {
    let args = lunar_arguments(t);
    let a1 = (119.75 + 131.849 * t).to_radians();
    let a2 = (53.09 + 479_264.290 * t).to_radians();
    let a3 = (313.45 + 481_266.484 * t).to_radians();
    let lp = args.mean_longitude.to_radians();
    let mp = args.moon_anomaly.to_radians();
    let f = args.latitude_argument.to_radians();

    let sigma_l = periodic_sum(&MOON_LONGITUDE_TERMS, &args)
        + 3958.0 * a1.sin()
        + 1962.0 * (lp - f).sin()
        + 318.0 * a2.sin();
    let sigma_b = periodic_sum(&MOON_LATITUDE_TERMS, &args) - 2235.0 * lp.sin()
        + 382.0 * a3.sin()
        + 175.0 * (a1 - f).sin()
        + 175.0 * (a1 + f).sin()
        + 127.0 * (lp - mp).sin()
        - 115.0 * (lp + mp).sin();

    (
        normalize_degrees(args.mean_longitude + sigma_l / 1e6),
        sigma_b / 1e6,
    )
}

/// Mean longitude of the Moon's ascending node, degrees.
pub fn mean_node_longitude(t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let t4 = t3 * t;
    normalize_degrees(
        125.044_547_9 - 1934.136_289_1 * t + 0.002_075_4 * t2 + t3 / 467_441.0
            - t4 / 60_616_000.0,
    )
}

/// Mean node plus the five largest short-period terms (Meeus p. 343).
pub fn true_node_longitude(t: f64) -> f64 {
    let args = lunar_arguments(t);
    let d = args.elongation.to_radians();
    let m = args.sun_anomaly.to_radians();
    let mp = args.moon_anomaly.to_radians();
    let f = args.latitude_argument.to_radians();
    normalize_degrees(
        mean_node_longitude(t) - 1.4979 * (2.0 * (d - f)).sin() - 0.1500 * m.sin()
            - 0.1226 * (2.0 * d).sin()
            + 0.1176 * (2.0 * f).sin()
            - 0.0801 * (2.0 * (mp - f)).sin(),
    )
}

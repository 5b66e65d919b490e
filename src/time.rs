//! Birth input validation and the time scales the ephemeris runs on.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::JulianDay;

/// Julian Day of the Unix epoch, 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_JD: JulianDay = 2_440_587.5;

/// J2000.0 epoch, 2000-01-01T12:00:00 TT.
pub const J2000_JD: JulianDay = 2_451_545.0;

pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Largest accepted timezone offset, ±14 h.
const MAX_TZ_OFFSET_MINUTES: i32 = 14 * 60;

/// Local time of birth. Unknown times are charted for local noon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthTime {
    Known(NaiveTime),
    Unknown,
}

impl BirthTime {
    /// Parses `HH:MM`, `HH:MM:SS`, or `unknown` / empty.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("unknown") {
            return Ok(BirthTime::Unknown);
        }
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(BirthTime::Known)
            .map_err(|_| ChartError::InvalidBirthInput(format!("unparseable birth time '{s}'")))
    }

    pub fn is_known(&self) -> bool {
        matches!(self, BirthTime::Known(_))
    }
}

/// What the caller knows about a birth, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthInput {
    pub name: String,
    pub date: NaiveDate,
    pub time: BirthTime,
    pub place: String,
    /// Geographic latitude, north positive.
    pub latitude: f64,
    /// Geographic longitude, east positive.
    pub longitude: f64,
    /// Offset of local civil time from UTC, east positive.
    pub timezone_offset_minutes: i32,
}

/// A validated birth: coordinates checked, instant fixed in UT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBirth {
    pub instant: DateTime<Utc>,
    pub julian_day: JulianDay,
    pub latitude: f64,
    pub longitude: f64,
    pub time_known: bool,
}

impl BirthInput {
    /// Builds an input from the loosely-typed strings a web form sends.
    pub fn from_strings(
        name: &str,
        date: &str,
        time: &str,
        place: &str,
        latitude: f64,
        longitude: f64,
        timezone_offset_minutes: i32,
    ) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| {
                ChartError::InvalidBirthInput(format!("unparseable birth date '{date}'"))
            })?;
        Ok(BirthInput {
            name: name.to_string(),
            date,
            time: BirthTime::parse(time)?,
            place: place.to_string(),
            latitude,
            longitude,
            timezone_offset_minutes,
        })
    }

    /// Range-checks the coordinates and resolves date + time + zone to one UT instant.
    pub fn resolve(&self) -> Result<ResolvedBirth> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ChartError::InvalidBirthInput(format!(
                "latitude {} outside -90..=90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ChartError::InvalidBirthInput(format!(
                "longitude {} outside -180..=180",
                self.longitude
            )));
        }
        if self.timezone_offset_minutes.abs() > MAX_TZ_OFFSET_MINUTES {
            return Err(ChartError::InvalidBirthInput(format!(
                "timezone offset {} minutes outside ±{}",
                self.timezone_offset_minutes, MAX_TZ_OFFSET_MINUTES
            )));
        }

        let local_time = match self.time {
            BirthTime::Known(t) => t,
            BirthTime::Unknown => NaiveTime::from_hms_opt(12, 0, 0).ok_or_else(|| {
                ChartError::InternalComputationInvariant("local noon is not a valid time".into())
            })?,
        };
        let offset = FixedOffset::east_opt(self.timezone_offset_minutes * 60).ok_or_else(|| {
            ChartError::InvalidBirthInput(format!(
                "timezone offset {} minutes is not representable",
                self.timezone_offset_minutes
            ))
        })?;
        let local = self.date.and_time(local_time);
        let instant = offset
            .from_local_datetime(&local)
            .single()
            .ok_or_else(|| {
                ChartError::InvalidBirthInput(format!("ambiguous local time {local}"))
            })?
            .with_timezone(&Utc);

        Ok(ResolvedBirth {
            instant,
            julian_day: julian_day(instant),
            latitude: self.latitude,
            longitude: self.longitude,
            time_known: self.time.is_known(),
        })
    }
}

/// Julian Day (UT) of an instant, millisecond resolution.
pub fn julian_day(instant: DateTime<Utc>) -> JulianDay {
    UNIX_EPOCH_JD + instant.timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Inverse of [`julian_day`], rounded to the millisecond.
pub fn datetime_from_julian_day(jd: JulianDay) -> Result<DateTime<Utc>> {
    let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(ChartError::InternalComputationInvariant(format!(
            "julian day {jd} has no calendar instant"
        )));
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64).ok_or_else(|| {
        ChartError::InternalComputationInvariant(format!("julian day {jd} has no calendar instant"))
    })
}

/// Decimal Gregorian year of a Julian Day, good enough for ΔT lookup.
fn decimal_year(jd: JulianDay) -> f64 {
    2000.0 + (jd - J2000_JD) / 365.25
}

/// ΔT = TT − UT in seconds, Espenak & Meeus polynomial fits.
///
/// Covers 1800–2050 piecewise; outside that the nearest segment is
/// extrapolated, which the ephemeris range check never lets happen.
pub fn delta_t_seconds(jd_ut: JulianDay) -> f64 {
    let y = decimal_year(jd_ut);
    if y < 1860.0 {
        let t = y - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t.powi(2) + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if y < 1900.0 {
        let t = y - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t.powi(2) + 0.01680668 * t.powi(3)
            - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3)
            - 0.000197 * t.powi(4)
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3)
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else {
        let t = y - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t.powi(2)
    }
}

/// Terrestrial Time Julian Day for a UT Julian Day.
pub fn terrestrial_time(jd_ut: JulianDay) -> JulianDay {
    jd_ut + delta_t_seconds(jd_ut) / 86_400.0
}

/// Julian centuries since J2000.0 on whatever scale `jd` is on.
pub fn julian_centuries(jd: JulianDay) -> f64 {
    (jd - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

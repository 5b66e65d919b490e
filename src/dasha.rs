//! Vimshottari dasha: planetary periods keyed off the Moon's nakshatra.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::placement::NakshatraInfo;
use crate::time::datetime_from_julian_day;
use crate::{CelestialBody, JulianDay};

pub const VIMSHOTTARI_TOTAL_YEARS: f64 = 120.0;
pub const VIMSHOTTARI_YEAR_DAYS: f64 = 365.25;

/// Slivers shorter than this (about 0.1 s) come from rounding and are dropped.
const PERIOD_EPSILON_DAYS: f64 = 1e-6;

/// Lords in running order with their Mahadasha lengths in years.
pub const VIMSHOTTARI_SEQUENCE: [(CelestialBody, f64); 9] = [
    (CelestialBody::Ketu, 7.0),
    (CelestialBody::Venus, 20.0),
    (CelestialBody::Sun, 6.0),
    (CelestialBody::Moon, 10.0),
    (CelestialBody::Mars, 7.0),
    (CelestialBody::Rahu, 18.0),
    (CelestialBody::Jupiter, 16.0),
    (CelestialBody::Saturn, 19.0),
    (CelestialBody::Mercury, 17.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashaLevel {
    Mahadasha,
    Antardasha,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashaPeriod {
    pub lord: CelestialBody,
    pub level: DashaLevel,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub start_jd: JulianDay,
    pub end_jd: JulianDay,
    pub significance: String,
    pub sub_periods: Vec<DashaPeriod>,
}

impl DashaPeriod {
    pub fn duration_years(&self) -> f64 {
        (self.end_jd - self.start_jd) / VIMSHOTTARI_YEAR_DAYS
    }

    pub fn contains(&self, jd: JulianDay) -> bool {
        (self.start_jd..self.end_jd).contains(&jd)
    }
}

/// Theme of a planet's period.
pub fn significance(lord: CelestialBody) -> &'static str {
    match lord {
        CelestialBody::Sun => "Period of authority and recognition",
        CelestialBody::Moon => "Period of emotional growth and intuition",
        CelestialBody::Mars => "Period of energy and initiative",
        CelestialBody::Mercury => "Period of communication and learning",
        CelestialBody::Jupiter => "Period of expansion and wisdom",
        CelestialBody::Venus => "Period of pleasure and creativity",
        CelestialBody::Saturn => "Period of discipline and responsibility",
        CelestialBody::Rahu => "Period of material growth and unconventional paths",
        CelestialBody::Ketu => "Period of spiritual growth and detachment",
        CelestialBody::Uranus | CelestialBody::Neptune | CelestialBody::Pluto => {
            "Period outside the Vimshottari sequence"
        }
    }
}

fn years(lord: CelestialBody) -> Result<(usize, f64)> {
    VIMSHOTTARI_SEQUENCE
        .iter()
        .position(|(body, _)| *body == lord)
        .map(|i| (i, VIMSHOTTARI_SEQUENCE[i].1))
        .ok_or_else(|| {
            ChartError::InternalComputationInvariant(format!("{lord} has no Vimshottari period"))
        })
}

fn period(
    lord: CelestialBody,
    level: DashaLevel,
    start_jd: JulianDay,
    end_jd: JulianDay,
    significance: String,
    sub_periods: Vec<DashaPeriod>,
) -> Result<DashaPeriod> {
    Ok(DashaPeriod {
        lord,
        level,
        start: datetime_from_julian_day(start_jd)?,
        end: datetime_from_julian_day(end_jd)?,
        start_jd,
        end_jd,
        significance,
        sub_periods,
    })
}

/// Mahadashas with their Antardashas from birth to `birth + horizon_years`.
///
/// The first Mahadasha belongs to the lord of the Moon's nakshatra and runs
/// only for the balance left at birth. Each period is computed on its
/// nominal span, then clipped to the `[birth, horizon]` window, so the
/// returned periods are contiguous and tile the window exactly.
pub fn vimshottari(
    moon_longitude: f64,
    birth_jd: JulianDay,
    horizon_years: f64,
) -> Result<Vec<DashaPeriod>> {
    if !horizon_years.is_finite() || horizon_years <= 0.0 {
        return Err(ChartError::Config(format!(
            "dasha horizon must be a positive number of years, got {horizon_years}"
        )));
    }

    let nakshatra = NakshatraInfo::from_longitude(moon_longitude);
    let (first, first_years) = years(nakshatra.lord)?;
    let horizon_jd = birth_jd + horizon_years * VIMSHOTTARI_YEAR_DAYS;

    let mut nominal_start =
        birth_jd - nakshatra.elapsed_fraction() * first_years * VIMSHOTTARI_YEAR_DAYS;
    let mut periods = Vec::new();
    for k in 0.. {
        if nominal_start >= horizon_jd - PERIOD_EPSILON_DAYS {
            break;
        }
        let (lord, maha_years) = VIMSHOTTARI_SEQUENCE[(first + k) % 9];
        let nominal_end = nominal_start + maha_years * VIMSHOTTARI_YEAR_DAYS;
        let (start, end) = clip(nominal_start, nominal_end, birth_jd, horizon_jd);

        if end - start > PERIOD_EPSILON_DAYS {
            let subs = antardashas(lord, maha_years, nominal_start, nominal_end, start, end)?;
            periods.push(period(
                lord,
                DashaLevel::Mahadasha,
                start,
                end,
                significance(lord).to_string(),
                subs,
            )?);
        }
        nominal_start = nominal_end;
    }

    log::debug!(
        "dasha: {} mahadashas from {} (balance {:.3} of {} years)",
        periods.len(),
        nakshatra.lord,
        1.0 - nakshatra.elapsed_fraction(),
        first_years
    );
    Ok(periods)
}

/// Clips a nominal span to the window. Ends within rounding distance of the
/// window edges snap onto them, so a dropped sliver never leaves a gap.
fn clip(
    nominal_start: JulianDay,
    nominal_end: JulianDay,
    window_start: JulianDay,
    window_end: JulianDay,
) -> (JulianDay, JulianDay) {
    let start = if nominal_start <= window_start + PERIOD_EPSILON_DAYS {
        window_start
    } else {
        nominal_start
    };
    let end = if nominal_end >= window_end - PERIOD_EPSILON_DAYS {
        window_end
    } else {
        nominal_end
    };
    (start, end)
}

fn antardashas(
    maha_lord: CelestialBody,
    maha_years: f64,
    maha_start: JulianDay,
    maha_end: JulianDay,
    window_start: JulianDay,
    window_end: JulianDay,
) -> Result<Vec<DashaPeriod>> {
    let (first, _) = years(maha_lord)?;
    let mut subs = Vec::with_capacity(9);
    let mut nominal_start = maha_start;
    for k in 0..9 {
        let (lord, sub_years) = VIMSHOTTARI_SEQUENCE[(first + k) % 9];
        let nominal_end = if k == 8 {
            maha_end
        } else {
            nominal_start + maha_years * sub_years / VIMSHOTTARI_TOTAL_YEARS * VIMSHOTTARI_YEAR_DAYS
        };
        let (start, end) = clip(nominal_start, nominal_end, window_start, window_end);
        if end - start > PERIOD_EPSILON_DAYS {
            subs.push(period(
                lord,
                DashaLevel::Antardasha,
                start,
                end,
                format!("{} within the {} Mahadasha", significance(lord), maha_lord),
                Vec::new(),
            )?);
        }
        nominal_start = nominal_end;
    }
    Ok(subs)
}

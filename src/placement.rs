//! Placing bodies in the sidereal zodiac: sign, house, dignity and nakshatra.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ayanamsa::AyanamsaRecord;
use crate::ephemeris::TropicalPosition;
use crate::error::{ChartError, Result};
use crate::houses::HouseFrame;
use crate::{normalize_degrees, CelestialBody, Nakshatra, ZodiacSign, NAKSHATRA_SPAN};

const PADA_SPAN: f64 = NAKSHATRA_SPAN / 4.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dignity {
    Exaltation,
    Domicile,
    Fall,
    Detriment,
    Neutral,
}

impl Dignity {
    /// Exalted or in its own sign.
    pub fn is_strong(self) -> bool {
        matches!(self, Dignity::Exaltation | Dignity::Domicile)
    }
}

impl fmt::Display for Dignity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Sign of exaltation. Fall is always the opposite sign.
pub fn exaltation_sign(body: CelestialBody) -> Option<ZodiacSign> {
    match body {
        CelestialBody::Sun => Some(ZodiacSign::Aries),
        CelestialBody::Moon => Some(ZodiacSign::Taurus),
        CelestialBody::Mars => Some(ZodiacSign::Capricorn),
        CelestialBody::Mercury => Some(ZodiacSign::Virgo),
        CelestialBody::Jupiter => Some(ZodiacSign::Cancer),
        CelestialBody::Venus => Some(ZodiacSign::Pisces),
        CelestialBody::Saturn => Some(ZodiacSign::Libra),
        CelestialBody::Rahu => Some(ZodiacSign::Taurus),
        CelestialBody::Ketu => Some(ZodiacSign::Scorpio),
        CelestialBody::Uranus | CelestialBody::Neptune | CelestialBody::Pluto => None,
    }
}

/// Signs a body rules: classical rulership for the seven planets, modern
/// rulership for the outer three, none for the nodes.
pub fn domicile_signs(body: CelestialBody) -> Vec<ZodiacSign> {
    match body {
        CelestialBody::Uranus => vec![ZodiacSign::Aquarius],
        CelestialBody::Neptune => vec![ZodiacSign::Pisces],
        CelestialBody::Pluto => vec![ZodiacSign::Scorpio],
        CelestialBody::Rahu | CelestialBody::Ketu => Vec::new(),
        classical => ZodiacSign::ALL
            .iter()
            .copied()
            .filter(|sign| sign.ruler() == classical)
            .collect(),
    }
}

/// Essential dignity of `body` in `sign`.
///
/// Exaltation beats domicile, and fall beats detriment, so Mercury in Virgo
/// is exalted and Mercury in Pisces is in fall.
pub fn dignity(body: CelestialBody, sign: ZodiacSign) -> Dignity {
    let exaltation = exaltation_sign(body);
    let domiciles = domicile_signs(body);
    if exaltation == Some(sign) {
        Dignity::Exaltation
    } else if domiciles.contains(&sign) {
        Dignity::Domicile
    } else if exaltation.map(ZodiacSign::opposite) == Some(sign) {
        Dignity::Fall
    } else if domiciles.iter().any(|d| d.opposite() == sign) {
        Dignity::Detriment
    } else {
        Dignity::Neutral
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct NakshatraInfo {
    pub nakshatra: Nakshatra,
    /// Quarter of the nakshatra, 1 through 4.
    pub pada: u8,
    pub lord: CelestialBody,
    /// Arc already traversed inside the nakshatra, degrees.
    pub degree: f64,
}

impl NakshatraInfo {
    pub fn from_longitude(longitude: f64) -> Self {
        let nakshatra = Nakshatra::from_longitude(longitude);
        let degree = (normalize_degrees(longitude) - nakshatra.start()).clamp(0.0, NAKSHATRA_SPAN);
        let pada = ((degree / PADA_SPAN).floor() as u8 + 1).min(4);
        NakshatraInfo {
            nakshatra,
            pada,
            lord: nakshatra.lord(),
            degree,
        }
    }

    /// Fraction of the nakshatra already traversed, `[0, 1]`.
    pub fn elapsed_fraction(&self) -> f64 {
        self.degree / NAKSHATRA_SPAN
    }
}

/// A body fully placed in the sidereal chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    pub body: CelestialBody,
    /// Sidereal longitude, `[0, 360)`.
    pub longitude: f64,
    pub latitude: f64,
    /// Degrees per day.
    pub speed: f64,
    pub sign: ZodiacSign,
    pub degree: f64,
    pub house: u8,
    pub dignity: Dignity,
    pub retrograde: bool,
    pub nakshatra: NakshatraInfo,
}

/// House (1–12) whose arc `[cusp_n, cusp_n+1)` holds `longitude`.
pub fn house_of(cusps: &[f64; 12], longitude: f64) -> Result<u8> {
    let longitude = normalize_degrees(longitude);
    for (i, start) in cusps.iter().enumerate() {
        let end = cusps[(i + 1) % 12];
        let width = normalize_degrees(end - start);
        if normalize_degrees(longitude - start) < width {
            return Ok(i as u8 + 1);
        }
    }
    Err(ChartError::InternalComputationInvariant(format!(
        "longitude {longitude:.6} falls in no house arc of {cusps:?}"
    )))
}

/// Converts tropical ephemeris output into placed sidereal positions.
pub fn resolve_positions(
    tropical: &[TropicalPosition],
    ayanamsa: &AyanamsaRecord,
    frame: &HouseFrame,
) -> Result<Vec<BodyPosition>> {
    let cusps = frame.cusp_longitudes();
    tropical
        .iter()
        .map(|pos| {
            let longitude = ayanamsa.to_sidereal(pos.longitude);
            let sign = ZodiacSign::from_longitude(longitude);
            Ok(BodyPosition {
                body: pos.body,
                longitude,
                latitude: pos.latitude,
                speed: pos.speed,
                sign,
                degree: longitude % 30.0,
                house: house_of(&cusps, longitude)?,
                dignity: dignity(pos.body, sign),
                retrograde: pos.speed < 0.0,
                nakshatra: NakshatraInfo::from_longitude(longitude),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ayanamsa::AyanamsaModel;
    use crate::houses::{house_frame, HouseSystem};
    use approx::assert_abs_diff_eq;

    #[test]
    fn dignity_table() {
        use CelestialBody::*;
        use ZodiacSign::*;
        assert_eq!(dignity(Sun, Aries), Dignity::Exaltation);
        assert_eq!(dignity(Sun, Leo), Dignity::Domicile);
        assert_eq!(dignity(Sun, Libra), Dignity::Fall);
        assert_eq!(dignity(Sun, Aquarius), Dignity::Detriment);
        assert_eq!(dignity(Sun, Gemini), Dignity::Neutral);
        assert_eq!(dignity(Mercury, Virgo), Dignity::Exaltation);
        assert_eq!(dignity(Mercury, Pisces), Dignity::Fall);
        assert_eq!(dignity(Mercury, Sagittarius), Dignity::Detriment);
        assert_eq!(dignity(Jupiter, Capricorn), Dignity::Fall);
        assert_eq!(dignity(Saturn, Aquarius), Dignity::Domicile);
        assert_eq!(dignity(Venus, Virgo), Dignity::Fall);
        assert_eq!(dignity(Mars, Cancer), Dignity::Fall);
        assert_eq!(dignity(Moon, Scorpio), Dignity::Fall);
        assert_eq!(dignity(Rahu, Taurus), Dignity::Exaltation);
        assert_eq!(dignity(Ketu, Taurus), Dignity::Fall);
        assert_eq!(dignity(Rahu, Leo), Dignity::Neutral);
        assert_eq!(dignity(Pluto, Scorpio), Dignity::Domicile);
        assert_eq!(dignity(Uranus, Leo), Dignity::Detriment);
    }

    #[test]
    fn dignity_of_every_graha_in_every_sign() {
        use Dignity::{Detriment as T, Domicile as D, Exaltation as X, Fall as F, Neutral as N};
        // Aries through Pisces
        let table: [(CelestialBody, [Dignity; 12]); 9] = [
            (CelestialBody::Sun, [X, N, N, N, D, N, F, N, N, N, T, N]),
            (CelestialBody::Moon, [N, X, N, D, N, N, N, F, N, T, N, N]),
            (CelestialBody::Mars, [D, T, N, F, N, N, T, D, N, X, N, N]),
            (CelestialBody::Mercury, [N, N, D, N, N, X, N, N, T, N, N, F]),
            (CelestialBody::Jupiter, [N, N, T, X, N, T, N, N, D, F, N, D]),
            (CelestialBody::Venus, [T, D, N, N, N, F, D, T, N, N, N, X]),
            (CelestialBody::Saturn, [F, N, N, T, T, N, X, N, N, D, D, N]),
            (CelestialBody::Rahu, [N, X, N, N, N, N, N, F, N, N, N, N]),
            (CelestialBody::Ketu, [N, F, N, N, N, N, N, X, N, N, N, N]),
        ];
        for (body, row) in table {
            for (sign, expected) in ZodiacSign::ALL.into_iter().zip(row) {
                assert_eq!(dignity(body, sign), expected, "{body} in {sign}");
            }
        }
    }

    #[test]
    fn nakshatra_and_pada() {
        let info = NakshatraInfo::from_longitude(0.0);
        assert_eq!(info.nakshatra, Nakshatra::Ashwini);
        assert_eq!(info.pada, 1);
        assert_eq!(info.lord, CelestialBody::Ketu);

        // 196.4° is in Swati, 9.73° in: third pada
        let info = NakshatraInfo::from_longitude(196.4);
        assert_eq!(info.nakshatra, Nakshatra::Swati);
        assert_eq!(info.pada, 3);
        assert_eq!(info.lord, CelestialBody::Rahu);
        assert_abs_diff_eq!(info.degree, 196.4 - 14.0 * NAKSHATRA_SPAN, epsilon = 1e-9);

        let info = NakshatraInfo::from_longitude(359.999);
        assert_eq!(info.nakshatra, Nakshatra::Revati);
        assert_eq!(info.pada, 4);
    }

    #[test]
    fn house_arcs_wrap_through_aries() {
        let cusps: [f64; 12] = std::array::from_fn(|i| normalize_degrees(345.0 + 30.0 * i as f64));
        assert_eq!(house_of(&cusps, 345.0).unwrap(), 1);
        assert_eq!(house_of(&cusps, 5.0).unwrap(), 1);
        assert_eq!(house_of(&cusps, 15.0).unwrap(), 2);
        assert_eq!(house_of(&cusps, 344.999).unwrap(), 12);
    }

    #[test]
    fn degenerate_cusps_are_an_invariant_violation() {
        let cusps = [10.0; 12];
        assert!(matches!(
            house_of(&cusps, 50.0),
            Err(ChartError::InternalComputationInvariant(_))
        ));
    }

    #[test]
    fn resolve_marks_retrograde_and_shifts_by_ayanamsa() {
        let ayanamsa = AyanamsaRecord {
            model: AyanamsaModel::Lahiri,
            value_deg: 24.0,
        };
        let frame = house_frame(2_451_545.0, 28.6, 77.2, HouseSystem::WholeSign, 24.0).unwrap();
        let tropical = [
            TropicalPosition {
                body: CelestialBody::Mars,
                longitude: 14.0,
                latitude: 1.0,
                speed: -0.2,
            },
            TropicalPosition {
                body: CelestialBody::Sun,
                longitude: 40.0,
                latitude: 0.0,
                speed: 1.0,
            },
        ];
        let placed = resolve_positions(&tropical, &ayanamsa, &frame).unwrap();
        assert_abs_diff_eq!(placed[0].longitude, 350.0, epsilon = 1e-9);
        assert_eq!(placed[0].sign, ZodiacSign::Pisces);
        assert!(placed[0].retrograde);
        assert_eq!(placed[1].sign, ZodiacSign::Aries);
        assert_eq!(placed[1].dignity, Dignity::Exaltation);
        assert!(!placed[1].retrograde);
        for p in &placed {
            assert!((1..=12).contains(&p.house));
        }
    }
}

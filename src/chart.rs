//! Chart assembly: the single entry point that runs the whole pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aspects::{find_aspects, Aspect};
use crate::ayanamsa::AyanamsaRecord;
use crate::config::ChartOptions;
use crate::dasha::{vimshottari, DashaPeriod};
use crate::ephemeris::{EphemerisProvider, LowPrecisionEphemeris};
use crate::error::{ChartError, Result};
use crate::houses::{house_frame, HouseCusp, HouseFrame};
use crate::placement::{resolve_positions, BodyPosition};
use crate::time::BirthInput;
use crate::yogas::{detect_yogas, Yoga};
use crate::{CelestialBody, JulianDay, ZodiacSign};

/// A computed natal chart. Built once by [`compute_chart`], never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub input: BirthInput,
    pub options: ChartOptions,
    /// Birth instant in UT; local noon when the time was unknown.
    pub instant: DateTime<Utc>,
    pub julian_day: JulianDay,
    pub time_known: bool,
    pub ayanamsa: AyanamsaRecord,
    pub ascendant: f64,
    pub ascendant_sign: ZodiacSign,
    pub midheaven: f64,
    pub positions: Vec<BodyPosition>,
    pub houses: [HouseCusp; 12],
    pub aspects: Vec<Aspect>,
    pub dashas: Vec<DashaPeriod>,
    pub yogas: Vec<Yoga>,
    pub house_readings: Vec<HouseReading>,
    pub general_reading: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseReading {
    pub house: u8,
    pub sign: ZodiacSign,
    pub occupants: Vec<CelestialBody>,
    pub theme: String,
    pub text: String,
}

impl Chart {
    pub fn position(&self, body: CelestialBody) -> Option<&BodyPosition> {
        self.positions.iter().find(|p| p.body == body)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn check_invariants(&self) -> Result<()> {
        let broken = |what: String| Err(ChartError::InternalComputationInvariant(what));
        let in_circle = |lon: f64| lon.is_finite() && (0.0..360.0).contains(&lon);

        for cusp in &self.houses {
            if !in_circle(cusp.longitude) {
                return broken(format!("cusp {} at {}", cusp.house, cusp.longitude));
            }
        }
        for body in self.options.bodies() {
            let placed: Vec<_> = self.positions.iter().filter(|p| p.body == body).collect();
            let [p] = placed.as_slice() else {
                return broken(format!("{body} placed {} times", placed.len()));
            };
            let valid =
                in_circle(p.longitude) && p.speed.is_finite() && (1..=12).contains(&p.house);
            if !valid {
                return broken(format!(
                    "{body} placed at {} in house {}",
                    p.longitude, p.house
                ));
            }
        }
        for pair in self.dashas.windows(2) {
            if pair[0].end_jd != pair[1].start_jd {
                return broken(format!("gap between {} and {} dashas", pair[0].lord, pair[1].lord));
            }
        }
        if !in_circle(self.ascendant) || !in_circle(self.midheaven) {
            return broken(format!("angles asc={} mc={}", self.ascendant, self.midheaven));
        }
        Ok(())
    }
}

/// Computes a chart with the built-in low-precision ephemeris.
pub fn compute_chart(input: &BirthInput, options: &ChartOptions) -> Result<Chart> {
    let provider = LowPrecisionEphemeris::new(options.node_mode);
    compute_chart_with(&provider, input, options)
}

/// Computes a chart from any ephemeris source.
pub fn compute_chart_with<P: EphemerisProvider>(
    provider: &P,
    input: &BirthInput,
    options: &ChartOptions,
) -> Result<Chart> {
    options.validate()?;
    let birth = input.resolve()?;
    log::debug!(
        "chart: '{}' at {} (jd {:.6}), {} / {}",
        input.name,
        birth.instant,
        birth.julian_day,
        options.house_system,
        options.ayanamsa
    );

    let tropical = provider.positions_at(birth.julian_day, &options.bodies())?;
    let ayanamsa = AyanamsaRecord::at(options.ayanamsa, birth.julian_day);
    let frame = house_frame(
        birth.julian_day,
        birth.latitude,
        birth.longitude,
        options.house_system,
        ayanamsa.value_deg,
    )?;
    let positions = resolve_positions(&tropical, &ayanamsa, &frame)?;

    let aspects = find_aspects(&positions);
    let moon = positions
        .iter()
        .find(|p| p.body == CelestialBody::Moon)
        .ok_or_else(|| ChartError::InternalComputationInvariant("no Moon position".into()))?;
    let dashas = vimshottari(moon.longitude, birth.julian_day, options.dasha_horizon_years)?;
    let yogas = detect_yogas(&positions);

    let house_readings = interpret_houses(&frame, &positions);
    let general_reading = general_reading(&frame, &positions, &yogas, &dashas);

    if !birth.time_known {
        log::warn!("chart: birth time unknown, houses and ascendant use local noon");
    }

    let chart = Chart {
        input: input.clone(),
        options: *options,
        instant: birth.instant,
        julian_day: birth.julian_day,
        time_known: birth.time_known,
        ayanamsa,
        ascendant: frame.ascendant,
        ascendant_sign: frame.ascendant_sign,
        midheaven: frame.midheaven,
        positions,
        houses: frame.cusps,
        aspects,
        dashas,
        yogas,
        house_readings,
        general_reading,
    };
    chart.check_invariants()?;
    log::debug!(
        "chart: {} positions, {} aspects, {} dashas, {} yogas",
        chart.positions.len(),
        chart.aspects.len(),
        chart.dashas.len(),
        chart.yogas.len()
    );
    Ok(chart)
}

// ---------------------------
// ## Readings
// ---------------------------

fn house_theme(house: u8) -> &'static str {
    match house {
        1 => "personality and self-expression",
        2 => "finances and values",
        3 => "communication and learning",
        4 => "home and family",
        5 => "creativity and pleasure",
        6 => "health and service",
        7 => "relationships and partnerships",
        8 => "transformation and shared resources",
        9 => "philosophy and higher learning",
        10 => "career and public image",
        11 => "friendships and goals",
        _ => "spirituality and unconscious",
    }
}

fn interpret_houses(frame: &HouseFrame, positions: &[BodyPosition]) -> Vec<HouseReading> {
    frame
        .cusps
        .iter()
        .map(|cusp| {
            let occupants: Vec<_> = positions
                .iter()
                .filter(|p| p.house == cusp.house)
                .map(|p| p.body)
                .collect();
            let influence = if occupants.is_empty() {
                "no planetary influence".to_string()
            } else {
                let names: Vec<_> = occupants.iter().map(|b| b.name()).collect();
                format!("influence of {}", names.join(", "))
            };
            let theme = house_theme(cusp.house);
            HouseReading {
                house: cusp.house,
                sign: cusp.sign,
                text: format!(
                    "House {} in {} shows {}. This house represents {}. \
                     The influence of {} brings specific qualities to these matters.",
                    cusp.house, cusp.sign, influence, theme, cusp.sign
                ),
                theme: theme.to_string(),
                occupants,
            }
        })
        .collect()
}

fn general_reading(
    frame: &HouseFrame,
    positions: &[BodyPosition],
    yogas: &[Yoga],
    dashas: &[DashaPeriod],
) -> String {
    let dignified = positions.iter().filter(|p| p.dignity.is_strong()).count();
    let mut text = format!(
        "Your birth chart shows a unique combination of planetary placements with {} rising. \
         {} planets are in their dignity, indicating natural strengths in these areas. \
         {} yogas are present in your chart, suggesting special abilities and opportunities.",
        frame.ascendant_sign,
        dignified,
        yogas.len()
    );
    if let Some(first) = dashas.first() {
        text.push_str(&format!(
            " Life opens in the {} Mahadasha: {}.",
            first.lord,
            first.significance.to_lowercase()
        ));
    }
    text
}

//! Classical yoga detection over placed bodies.
//!
//! Every rule is a pure predicate over the house and dignity of each body,
//! so the result does not depend on the order positions are supplied in.
//! Counts "from the Moon" or "from the Sun" are inclusive house counts:
//! the body's own house is the 1st.

use serde::{Deserialize, Serialize};

use crate::placement::BodyPosition;
use crate::CelestialBody;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Yoga {
    pub name: String,
    pub description: String,
    pub influence: String,
    /// Participating bodies in canonical order.
    pub bodies: Vec<CelestialBody>,
}

struct YogaRule {
    name: &'static str,
    description: &'static str,
    influence: &'static str,
    detect: fn(&Placements) -> Option<Vec<CelestialBody>>,
}

/// Lookup view over a chart's positions.
struct Placements<'a> {
    positions: &'a [BodyPosition],
}

impl<'a> Placements<'a> {
    fn house(&self, body: CelestialBody) -> Option<u8> {
        self.positions.iter().find(|p| p.body == body).map(|p| p.house)
    }

    fn get(&self, body: CelestialBody) -> Option<&'a BodyPosition> {
        self.positions.iter().find(|p| p.body == body)
    }

    /// Classical planets, minus `exclude`, standing in the `nth` house from `from`.
    fn classical_in(
        &self,
        from: CelestialBody,
        nth: u8,
        exclude: &[CelestialBody],
    ) -> Vec<CelestialBody> {
        let Some(base) = self.house(from) else {
            return Vec::new();
        };
        self.positions
            .iter()
            .filter(|p| p.body.is_classical() && p.body != from && !exclude.contains(&p.body))
            .filter(|p| count_from(base, p.house) == nth)
            .map(|p| p.body)
            .collect()
    }
}

/// Inclusive count of houses from `from` to `to`: same house is 1.
fn count_from(from: u8, to: u8) -> u8 {
    ((i16::from(to) - i16::from(from)).rem_euclid(12) + 1) as u8
}

fn is_kendra(house: u8) -> bool {
    matches!(house, 1 | 4 | 7 | 10)
}

fn conjoined(p: &Placements, a: CelestialBody, b: CelestialBody) -> Option<Vec<CelestialBody>> {
    (p.house(a)? == p.house(b)?).then(|| vec![a, b])
}

fn mahapurusha(p: &Placements, body: CelestialBody) -> Option<Vec<CelestialBody>> {
    let pos = p.get(body)?;
    (pos.dignity.is_strong() && is_kendra(pos.house)).then(|| vec![body])
}

/// Flanking yogas around `centre`: which of the 2nd and 12th houses hold planets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flank {
    Second,
    Twelfth,
    Both,
    Neither,
}

fn flank(
    p: &Placements,
    centre: CelestialBody,
    exclude: &[CelestialBody],
) -> Option<(Flank, Vec<CelestialBody>)> {
    p.house(centre)?;
    let second = p.classical_in(centre, 2, exclude);
    let twelfth = p.classical_in(centre, 12, exclude);
    let kind = match (second.is_empty(), twelfth.is_empty()) {
        (false, true) => Flank::Second,
        (true, false) => Flank::Twelfth,
        (false, false) => Flank::Both,
        (true, true) => Flank::Neither,
    };
    let mut bodies = vec![centre];
    bodies.extend(second);
    bodies.extend(twelfth);
    Some((kind, bodies))
}

fn lunar_flank(p: &Placements, wanted: Flank) -> Option<Vec<CelestialBody>> {
    let (kind, bodies) = flank(p, CelestialBody::Moon, &[CelestialBody::Sun])?;
    (kind == wanted).then_some(bodies)
}

fn solar_flank(p: &Placements, wanted: Flank) -> Option<Vec<CelestialBody>> {
    let (kind, bodies) = flank(p, CelestialBody::Sun, &[CelestialBody::Moon])?;
    (kind == wanted).then_some(bodies)
}

const YOGA_RULES: &[YogaRule] = &[
    YogaRule {
        name: "Gaja Kesari Yoga",
        description: "Jupiter in a kendra (1st, 4th, 7th or 10th) from the Moon",
        influence: "Brings wisdom, wealth, and recognition",
        detect: |p| {
            let moon = p.house(CelestialBody::Moon)?;
            let jupiter = p.house(CelestialBody::Jupiter)?;
            is_kendra(count_from(moon, jupiter))
                .then(|| vec![CelestialBody::Moon, CelestialBody::Jupiter])
        },
    },
    YogaRule {
        name: "Budha-Aditya Yoga",
        description: "Sun and Mercury in the same house",
        influence: "Enhances intellectual capabilities and leadership qualities",
        detect: |p| conjoined(p, CelestialBody::Sun, CelestialBody::Mercury),
    },
    YogaRule {
        name: "Chandra-Mangala Yoga",
        description: "Moon and Mars in the same house",
        influence: "Gives drive in earning and a resourceful, enterprising temperament",
        detect: |p| conjoined(p, CelestialBody::Moon, CelestialBody::Mars),
    },
    YogaRule {
        name: "Ruchaka Yoga",
        description: "Mars in its own or exaltation sign in a kendra",
        influence: "Confers courage, physical strength and command",
        detect: |p| mahapurusha(p, CelestialBody::Mars),
    },
    YogaRule {
        name: "Bhadra Yoga",
        description: "Mercury in its own or exaltation sign in a kendra",
        influence: "Sharpens intellect, speech and skill in trade",
        detect: |p| mahapurusha(p, CelestialBody::Mercury),
    },
    YogaRule {
        name: "Hamsa Yoga",
        description: "Jupiter in its own or exaltation sign in a kendra",
        influence: "Brings righteousness, learning and respect",
        detect: |p| mahapurusha(p, CelestialBody::Jupiter),
    },
    YogaRule {
        name: "Malavya Yoga",
        description: "Venus in its own or exaltation sign in a kendra",
        influence: "Brings comfort, refinement and artistic talent",
        detect: |p| mahapurusha(p, CelestialBody::Venus),
    },
    YogaRule {
        name: "Sasa Yoga",
        description: "Saturn in its own or exaltation sign in a kendra",
        influence: "Gives authority through perseverance and organisation",
        detect: |p| mahapurusha(p, CelestialBody::Saturn),
    },
    YogaRule {
        name: "Sunapha Yoga",
        description: "Planets other than the Sun in the 2nd from the Moon, none in the 12th",
        influence: "Self-earned wealth and a good reputation",
        detect: |p| lunar_flank(p, Flank::Second),
    },
    YogaRule {
        name: "Anapha Yoga",
        description: "Planets other than the Sun in the 12th from the Moon, none in the 2nd",
        influence: "Good health, poise and a contented disposition",
        detect: |p| lunar_flank(p, Flank::Twelfth),
    },
    YogaRule {
        name: "Durudhara Yoga",
        description: "Planets other than the Sun on both sides of the Moon",
        influence: "Generosity, comforts and support from others",
        detect: |p| lunar_flank(p, Flank::Both),
    },
    YogaRule {
        name: "Kemadruma Yoga",
        description: "No planets other than the Sun in the 2nd or 12th from the Moon",
        influence: "Calls for self-reliance through periods of isolation",
        detect: |p| lunar_flank(p, Flank::Neither),
    },
    YogaRule {
        name: "Adhi Yoga",
        description: "Two or more natural benefics in the 6th, 7th or 8th from the Moon",
        influence: "Leadership, prosperity and victory over opponents",
        detect: |p| {
            let moon = p.house(CelestialBody::Moon)?;
            let benefics: Vec<_> = p
                .positions
                .iter()
                .filter(|b| b.body.is_natural_benefic())
                .filter(|b| matches!(count_from(moon, b.house), 6..=8))
                .map(|b| b.body)
                .collect();
            (benefics.len() >= 2).then(|| {
                let mut bodies = vec![CelestialBody::Moon];
                bodies.extend(benefics);
                bodies
            })
        },
    },
    YogaRule {
        name: "Vesi Yoga",
        description: "Planets other than the Moon in the 2nd from the Sun, none in the 12th",
        influence: "Balanced outlook, truthfulness and steady fortune",
        detect: |p| solar_flank(p, Flank::Second),
    },
    YogaRule {
        name: "Vasi Yoga",
        description: "Planets other than the Moon in the 12th from the Sun, none in the 2nd",
        influence: "Charity, skill and recognition from authority",
        detect: |p| solar_flank(p, Flank::Twelfth),
    },
    YogaRule {
        name: "Ubhayachari Yoga",
        description: "Planets other than the Moon on both sides of the Sun",
        influence: "Eloquence, wealth and a commanding presence",
        detect: |p| solar_flank(p, Flank::Both),
    },
    YogaRule {
        name: "Amala Yoga",
        description: "A natural benefic in the 10th house",
        influence: "Lasting reputation through virtuous conduct",
        detect: |p| {
            let benefics: Vec<_> = p
                .positions
                .iter()
                .filter(|b| b.body.is_natural_benefic() && b.house == 10)
                .map(|b| b.body)
                .collect();
            (!benefics.is_empty()).then_some(benefics)
        },
    },
];

/// Every yoga whose rule holds, in rule-table order.
pub fn detect_yogas(positions: &[BodyPosition]) -> Vec<Yoga> {
    let placements = Placements { positions };
    let yogas: Vec<Yoga> = YOGA_RULES
        .iter()
        .filter_map(|rule| {
            let mut bodies = (rule.detect)(&placements)?;
            bodies.sort();
            bodies.dedup();
            Some(Yoga {
                name: rule.name.to_string(),
                description: rule.description.to_string(),
                influence: rule.influence.to_string(),
                bodies,
            })
        })
        .collect();
    log::debug!("yogas: {} of {} rules hold", yogas.len(), YOGA_RULES.len());
    yogas
}

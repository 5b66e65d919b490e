use approx::assert_abs_diff_eq;
use aztro_chart::dasha::VIMSHOTTARI_YEAR_DAYS;
use aztro_chart::placement::dignity;
use aztro_chart::{
    compute_chart, compute_chart_with, AspectNature, AspectType, BirthInput, BirthTime,
    CelestialBody, ChartError, ChartOptions, Dignity, EphemerisProvider, HouseSystem, JulianDay,
    Nakshatra, NodeMode, TropicalPosition, ZodiacSign,
};

fn delhi_2000() -> BirthInput {
    BirthInput::from_strings("Test", "2000-01-01", "12:00", "Delhi", 28.6139, 77.2090, 330).unwrap()
}

#[test]
fn identical_input_gives_identical_chart_and_json() {
    let options = ChartOptions {
        house_system: HouseSystem::Placidus,
        include_outer_planets: true,
        node_mode: NodeMode::True,
        ..ChartOptions::default()
    };
    let a = compute_chart(&delhi_2000(), &options).unwrap();
    let b = compute_chart(&delhi_2000(), &options).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
}

#[test]
fn delhi_first_mahadasha_follows_the_moon_nakshatra() {
    let chart = compute_chart(&delhi_2000(), &ChartOptions::default()).unwrap();
    let moon = chart.position(CelestialBody::Moon).unwrap();
    assert_eq!(moon.nakshatra.nakshatra, Nakshatra::Swati);
    assert_abs_diff_eq!(moon.longitude, 196.4, epsilon = 1.0);
    assert_eq!(moon.nakshatra.lord, CelestialBody::Rahu);
    assert_eq!(chart.dashas[0].lord, CelestialBody::Rahu);
    assert_eq!(chart.dashas[0].start, chart.instant);
}

#[test]
fn dasha_periods_are_contiguous_and_cover_the_horizon() {
    let chart = compute_chart(&delhi_2000(), &ChartOptions::default()).unwrap();
    for pair in chart.dashas.windows(2) {
        assert_eq!(pair[0].end_jd, pair[1].start_jd);
        assert!(pair[0].start_jd < pair[0].end_jd);
    }
    let span = chart.dashas.last().unwrap().end_jd - chart.dashas[0].start_jd;
    assert_abs_diff_eq!(span / VIMSHOTTARI_YEAR_DAYS, 120.0, epsilon = 1e-6);
}

#[test]
fn nine_consecutive_mahadashas_make_one_hundred_twenty_years() {
    let options = ChartOptions {
        dasha_horizon_years: 240.0,
        ..ChartOptions::default()
    };
    let chart = compute_chart(&delhi_2000(), &options).unwrap();
    let full_cycle: f64 = chart.dashas[1..10].iter().map(|d| d.duration_years()).sum();
    assert_abs_diff_eq!(full_cycle, 120.0, epsilon = 1e-6);
}

#[test]
fn aspects_stay_within_their_orbs() {
    let options = ChartOptions {
        include_outer_planets: true,
        ..ChartOptions::default()
    };
    for date in ["1950-03-14", "1975-08-02", "1999-12-31", "2024-06-21"] {
        let input = BirthInput::from_strings("x", date, "08:15", "", 51.5, -0.12, 0).unwrap();
        let chart = compute_chart(&input, &options).unwrap();
        for aspect in &chart.aspects {
            assert!((0.0..=180.0).contains(&aspect.separation));
            assert!(aspect.orb <= aspect.aspect_type.max_orb());
            assert_ne!(aspect.body1, aspect.body2);
        }
    }
}

#[test]
fn cusps_increase_around_the_circle() {
    for system in [
        HouseSystem::Placidus,
        HouseSystem::Koch,
        HouseSystem::Porphyry,
        HouseSystem::Equal,
        HouseSystem::WholeSign,
    ] {
        let options = ChartOptions {
            house_system: system,
            ..ChartOptions::default()
        };
        let chart = compute_chart(&delhi_2000(), &options).unwrap();
        let total: f64 = (0..12)
            .map(|i| {
                let gap = (chart.houses[(i + 1) % 12].longitude - chart.houses[i].longitude)
                    .rem_euclid(360.0);
                assert!(gap > 0.0, "{system}: cusp {} not after cusp {}", i + 2, i + 1);
                gap
            })
            .sum();
        assert_abs_diff_eq!(total, 360.0, epsilon = 1e-6);
    }
}

#[test]
fn every_position_is_placed_consistently() {
    let options = ChartOptions {
        include_outer_planets: true,
        ..ChartOptions::default()
    };
    let chart = compute_chart(&delhi_2000(), &options).unwrap();
    assert_eq!(chart.positions.len(), 12);
    for p in &chart.positions {
        assert!((0.0..360.0).contains(&p.longitude));
        assert_eq!(p.sign, ZodiacSign::from_longitude(p.longitude));
        assert_eq!(p.dignity, dignity(p.body, p.sign));
        assert_eq!(p.retrograde, p.speed < 0.0);
        assert!((1..=4).contains(&p.nakshatra.pada));
    }
    let rahu = chart.position(CelestialBody::Rahu).unwrap();
    let ketu = chart.position(CelestialBody::Ketu).unwrap();
    assert_abs_diff_eq!((ketu.longitude - rahu.longitude).rem_euclid(360.0), 180.0, epsilon = 1e-9);
}

#[test]
fn dignity_table_spot_checks() {
    assert_eq!(dignity(CelestialBody::Saturn, ZodiacSign::Libra), Dignity::Exaltation);
    assert_eq!(dignity(CelestialBody::Saturn, ZodiacSign::Aries), Dignity::Fall);
    assert_eq!(dignity(CelestialBody::Moon, ZodiacSign::Cancer), Dignity::Domicile);
    assert_eq!(dignity(CelestialBody::Moon, ZodiacSign::Capricorn), Dignity::Detriment);
    assert_eq!(dignity(CelestialBody::Venus, ZodiacSign::Aries), Dignity::Detriment);
}

/// Ephemeris returning fixed longitudes whatever the date.
struct Fixed(Vec<(CelestialBody, f64)>);

impl EphemerisProvider for Fixed {
    fn positions_at(
        &self,
        _jd: JulianDay,
        bodies: &[CelestialBody],
    ) -> aztro_chart::Result<Vec<TropicalPosition>> {
        Ok(bodies
            .iter()
            .map(|&body| {
                let longitude = self
                    .0
                    .iter()
                    .find(|(b, _)| *b == body)
                    .map(|(_, lon)| *lon)
                    .unwrap_or(0.0);
                TropicalPosition {
                    body,
                    longitude,
                    latitude: 0.0,
                    speed: 1.0,
                }
            })
            .collect())
    }
}

#[test]
fn near_opposition_is_classified_as_challenging() {
    let provider = Fixed(vec![
        (CelestialBody::Sun, 10.0),
        (CelestialBody::Moon, 187.5),
        (CelestialBody::Mars, 45.0),
        (CelestialBody::Mercury, 75.0),
        (CelestialBody::Jupiter, 250.0),
        (CelestialBody::Venus, 300.0),
        (CelestialBody::Saturn, 140.0),
        (CelestialBody::Rahu, 160.0),
        (CelestialBody::Ketu, 340.0),
    ]);
    let chart = compute_chart_with(&provider, &delhi_2000(), &ChartOptions::default()).unwrap();
    let sun_moon = chart
        .aspects
        .iter()
        .find(|a| a.body1 == CelestialBody::Sun && a.body2 == CelestialBody::Moon)
        .unwrap();
    assert_eq!(sun_moon.aspect_type, AspectType::Opposition);
    assert_eq!(sun_moon.nature, AspectNature::Challenging);
    assert_abs_diff_eq!(sun_moon.orb, 2.5, epsilon = 1e-9);
}

#[test]
fn placidus_is_undefined_near_the_pole() {
    let mut input = delhi_2000();
    input.latitude = 80.0;
    let options = ChartOptions {
        house_system: HouseSystem::Placidus,
        ..ChartOptions::default()
    };
    assert_eq!(
        compute_chart(&input, &options).unwrap_err(),
        ChartError::HouseSystemUndefinedAtLatitude {
            system: HouseSystem::Placidus,
            latitude: 80.0
        }
    );
    // Whole Sign still works there
    assert!(compute_chart(&input, &ChartOptions::default()).is_ok());
}

#[test]
fn porphyry_inside_the_polar_circle_keeps_twelve_ordered_houses() {
    let options = ChartOptions {
        house_system: HouseSystem::Porphyry,
        ..ChartOptions::default()
    };
    for hour in 0..24 {
        let time = format!("{hour:02}:00");
        let input = BirthInput::from_strings("x", "2000-01-01", &time, "", 80.0, 20.0, 0).unwrap();
        let chart = compute_chart(&input, &options).unwrap();
        let total: f64 = (0..12)
            .map(|i| {
                let gap = (chart.houses[(i + 1) % 12].longitude - chart.houses[i].longitude)
                    .rem_euclid(360.0);
                assert!(gap > 0.0, "{time}: cusp {} not after cusp {}", i + 2, i + 1);
                gap
            })
            .sum();
        assert_abs_diff_eq!(total, 360.0, epsilon = 1e-6);
        let rising_arc = (chart.ascendant - chart.midheaven).rem_euclid(360.0);
        assert!(rising_arc > 0.0 && rising_arc < 180.0, "{time}: {rising_arc}");
    }
}

#[test]
fn dates_outside_the_ephemeris_are_rejected() {
    let input = BirthInput::from_strings("x", "1750-05-01", "10:00", "", 0.0, 0.0, 0).unwrap();
    assert!(matches!(
        compute_chart(&input, &ChartOptions::default()),
        Err(ChartError::DateOutOfRange { .. })
    ));
}

#[test]
fn unknown_birth_time_uses_local_noon() {
    let mut input = delhi_2000();
    input.time = BirthTime::Unknown;
    let chart = compute_chart(&input, &ChartOptions::default()).unwrap();
    assert!(!chart.time_known);
    let known = compute_chart(&delhi_2000(), &ChartOptions::default()).unwrap();
    assert_eq!(chart.instant, known.instant);
}

#[test]
fn chart_round_trips_through_json() {
    let chart = compute_chart(&delhi_2000(), &ChartOptions::default()).unwrap();
    let json = chart.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["houses"].as_array().unwrap().len(), 12);
    assert_eq!(value["positions"].as_array().unwrap().len(), 9);
    assert!(value["general_reading"].as_str().unwrap().contains("planets are in their dignity"));
}

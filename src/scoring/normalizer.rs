//! Slider normalization.
//!
//! Wellness entry must never be blocked by one bad field, so nothing here
//! returns an error: unusable readings fall back to the configured default.

use serde_json::Value;

use crate::config::EngineConfig;
use crate::models::enums::Metric;
use crate::models::{RawSliders, Sliders, SLIDER_MAX, SLIDER_MIN};

/// Normalize all six readings into `SLIDER_MIN..=SLIDER_MAX`.
pub fn normalize_sliders(raw: &RawSliders, config: &EngineConfig) -> Sliders {
    let read = |metric: Metric| {
        let value = raw.get(metric);
        if value.is_some() && parse_reading(value).is_none() {
            tracing::debug!(metric = metric.as_str(), "Unparseable slider reading, using default");
        }
        normalize_reading(value, config)
    };
    Sliders {
        pain: read(Metric::Pain),
        mood: read(Metric::Mood),
        energy: read(Metric::Energy),
        clarity: read(Metric::Clarity),
        appetite: read(Metric::Appetite),
        sleep: read(Metric::Sleep),
    }
}

/// Normalize a single reading: parse, round, clamp; default on failure.
pub fn normalize_reading(value: Option<&Value>, config: &EngineConfig) -> u8 {
    let min = f64::from(SLIDER_MIN);
    let max = f64::from(SLIDER_MAX);
    match parse_reading(value) {
        Some(v) => v.round().clamp(min, max) as u8,
        None => config.default_slider.clamp(SLIDER_MIN, SLIDER_MAX),
    }
}

fn parse_reading(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn in_range_integers_pass_through() {
        let raw = RawSliders::from_levels(2, 8, 8, 8, 8, 8);
        let sliders = normalize_sliders(&raw, &config());
        assert_eq!(
            sliders,
            Sliders { pain: 2, mood: 8, energy: 8, clarity: 8, appetite: 8, sleep: 8 }
        );
    }

    #[test]
    fn missing_readings_default_to_six() {
        let sliders = normalize_sliders(&RawSliders::default(), &config());
        for metric in Metric::ALL {
            assert_eq!(sliders.get(metric), 6);
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(normalize_reading(Some(&json!(42)), &config()), 10);
        assert_eq!(normalize_reading(Some(&json!(-3)), &config()), 1);
        assert_eq!(normalize_reading(Some(&json!(0)), &config()), 1);
    }

    #[test]
    fn floats_round_to_nearest_before_clamping() {
        assert_eq!(normalize_reading(Some(&json!(7.4)), &config()), 7);
        assert_eq!(normalize_reading(Some(&json!(7.6)), &config()), 8);
        assert_eq!(normalize_reading(Some(&json!(10.4)), &config()), 10);
        assert_eq!(normalize_reading(Some(&json!(0.6)), &config()), 1);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        assert_eq!(normalize_reading(Some(&json!(" 3 ")), &config()), 3);
        assert_eq!(normalize_reading(Some(&json!("9.2")), &config()), 9);
    }

    #[test]
    fn garbage_degrades_to_default() {
        assert_eq!(normalize_reading(Some(&json!("very bad")), &config()), 6);
        assert_eq!(normalize_reading(Some(&json!("")), &config()), 6);
        assert_eq!(normalize_reading(Some(&json!(true)), &config()), 6);
        assert_eq!(normalize_reading(Some(&json!(null)), &config()), 6);
        assert_eq!(normalize_reading(Some(&json!([1, 2])), &config()), 6);
        assert_eq!(normalize_reading(Some(&json!("NaN")), &config()), 6);
        assert_eq!(normalize_reading(None, &config()), 6);
    }

    #[test]
    fn legacy_level_keys_are_accepted() {
        let raw: RawSliders = serde_json::from_value(json!({
            "pain_level": 4,
            "mood": "7",
            "sleep_level": 11.2
        }))
        .unwrap();
        let sliders = normalize_sliders(&raw, &config());
        assert_eq!(sliders.pain, 4);
        assert_eq!(sliders.mood, 7);
        assert_eq!(sliders.sleep, 10);
        assert_eq!(sliders.energy, 6);
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::enums::Metric;

/// Lowest accepted slider reading. Mirrored by the CHECK constraints in
/// `001_initial.sql`.
pub const SLIDER_MIN: u8 = 1;
/// Highest accepted slider reading.
pub const SLIDER_MAX: u8 = 10;

/// Slider readings as they arrive from a client form.
///
/// Values may be missing, strings, floats or out of range. They are only
/// trusted after passing through `scoring::normalize_sliders`.
///
/// Deserialization never fails: `null` or a non-object yields no readings,
/// and each metric takes the first non-null of `<metric>` and the legacy
/// `<metric>_level` key.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawSliders {
    pub pain: Option<Value>,
    pub mood: Option<Value>,
    pub energy: Option<Value>,
    pub clarity: Option<Value>,
    pub appetite: Option<Value>,
    pub sleep: Option<Value>,
}

impl<'de> Deserialize<'de> for RawSliders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => Self::from_map(&map),
            _ => Self::default(),
        })
    }
}

impl RawSliders {
    fn from_map(map: &Map<String, Value>) -> Self {
        let read = |metric: Metric| {
            let legacy = format!("{}_level", metric.as_str());
            [map.get(metric.as_str()), map.get(&legacy)]
                .into_iter()
                .flatten()
                .find(|v| !v.is_null())
                .cloned()
        };
        Self {
            pain: read(Metric::Pain),
            mood: read(Metric::Mood),
            energy: read(Metric::Energy),
            clarity: read(Metric::Clarity),
            appetite: read(Metric::Appetite),
            sleep: read(Metric::Sleep),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<&Value> {
        match metric {
            Metric::Pain => self.pain.as_ref(),
            Metric::Mood => self.mood.as_ref(),
            Metric::Energy => self.energy.as_ref(),
            Metric::Clarity => self.clarity.as_ref(),
            Metric::Appetite => self.appetite.as_ref(),
            Metric::Sleep => self.sleep.as_ref(),
        }
    }

    /// Convenience for callers that already hold integer readings.
    pub fn from_levels(pain: i64, mood: i64, energy: i64, clarity: i64, appetite: i64, sleep: i64) -> Self {
        Self {
            pain: Some(Value::from(pain)),
            mood: Some(Value::from(mood)),
            energy: Some(Value::from(energy)),
            clarity: Some(Value::from(clarity)),
            appetite: Some(Value::from(appetite)),
            sleep: Some(Value::from(sleep)),
        }
    }
}

/// Six normalized slider readings, each in `SLIDER_MIN..=SLIDER_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sliders {
    pub pain: u8,
    pub mood: u8,
    pub energy: u8,
    pub clarity: u8,
    pub appetite: u8,
    pub sleep: u8,
}

impl Sliders {
    pub fn get(&self, metric: Metric) -> u8 {
        match metric {
            Metric::Pain => self.pain,
            Metric::Mood => self.mood,
            Metric::Energy => self.energy,
            Metric::Clarity => self.clarity,
            Metric::Appetite => self.appetite,
            Metric::Sleep => self.sleep,
        }
    }

    /// Reading on the "higher is better" scale: pain is mirrored within
    /// `SLIDER_MIN..=SLIDER_MAX`, so 1 becomes 10.
    pub fn oriented(&self, metric: Metric) -> i32 {
        let value = i32::from(self.get(metric));
        if metric.is_inverted() {
            i32::from(SLIDER_MIN + SLIDER_MAX) - value
        } else {
            value
        }
    }
}

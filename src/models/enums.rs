use serde::{Deserialize, Serialize};

/// Macro to generate a snake_case serde enum with an `as_str` accessor
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }
    };
}

str_enum!(Metric {
    Pain => "pain",
    Mood => "mood",
    Energy => "energy",
    Clarity => "clarity",
    Appetite => "appetite",
    Sleep => "sleep",
});

impl Metric {
    /// All six wellness dimensions, in storage column order.
    pub const ALL: [Metric; 6] = [
        Metric::Pain,
        Metric::Mood,
        Metric::Energy,
        Metric::Clarity,
        Metric::Appetite,
        Metric::Sleep,
    ];

    /// Pain is the only dimension where a lower reading is better.
    pub fn is_inverted(&self) -> bool {
        matches!(self, Metric::Pain)
    }

    /// Human label used in feedback text.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Pain => "Pain",
            Metric::Mood => "Mood",
            Metric::Energy => "Energy",
            Metric::Clarity => "Clarity",
            Metric::Appetite => "Appetite",
            Metric::Sleep => "Sleep",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde_name() {
        for variant in Metric::ALL {
            let json = serde_json::to_value(variant).unwrap();
            assert_eq!(json, serde_json::Value::from(variant.as_str()));
        }
    }

    #[test]
    fn only_pain_is_inverted() {
        let inverted: Vec<_> = Metric::ALL.iter().filter(|m| m.is_inverted()).collect();
        assert_eq!(inverted, vec![&Metric::Pain]);
    }
}

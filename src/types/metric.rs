//! Numeric sensor channels

use serde::{Deserialize, Serialize};

/// A numeric channel of a sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    EnergyConsumption,
    Humidity,
    Pressure,
    Temperature,
    Vibration,
    PredictedRemainingLife,
}

/// Metrics shown as KPI cards, in display order.
pub const KPI_METRICS: [Metric; 5] = [
    Metric::EnergyConsumption,
    Metric::Humidity,
    Metric::Pressure,
    Metric::Temperature,
    Metric::Vibration,
];

impl Metric {
    /// Every channel the loader looks for.
    pub const ALL: [Self; 6] = [
        Self::EnergyConsumption,
        Self::Humidity,
        Self::Pressure,
        Self::Temperature,
        Self::Vibration,
        Self::PredictedRemainingLife,
    ];

    /// CSV column name.
    pub const fn column(self) -> &'static str {
        match self {
            Self::EnergyConsumption => "energy_consumption",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
            Self::Vibration => "vibration",
            Self::PredictedRemainingLife => "predicted_remaining_life",
        }
    }

    /// Card title: the column name, title-cased with spaces.
    pub fn label(self) -> String {
        self.column()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::EnergyConsumption => "⚡",
            Self::Humidity => "💧",
            Self::Pressure => "🌀",
            Self::Temperature => "🌡️",
            Self::Vibration => "💥",
            Self::PredictedRemainingLife => "⏳",
        }
    }

    /// Position in `SensorReading::metrics`.
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::EnergyConsumption => 0,
            Self::Humidity => 1,
            Self::Pressure => 2,
            Self::Temperature => 3,
            Self::Vibration => 4,
            Self::PredictedRemainingLife => 5,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_title_cased() {
        assert_eq!(Metric::EnergyConsumption.label(), "Energy Consumption");
        assert_eq!(Metric::Vibration.label(), "Vibration");
        assert_eq!(Metric::PredictedRemainingLife.label(), "Predicted Remaining Life");
    }

    #[test]
    fn test_indices_are_unique() {
        let mut seen = [false; 6];
        for m in Metric::ALL {
            assert!(!seen[m.index()], "duplicate index for {m}");
            seen[m.index()] = true;
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyConfig {
    /// Fracciones de tolerancia probadas en orden; la última es la más ancha.
    pub tolerance_ladder: Vec<f64>,
    pub window_start_hour: u32,
    pub window_end_hour: u32,
    pub method_version: String,
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            tolerance_ladder: vec![0.10, 0.15],
            window_start_hour: 18,
            window_end_hour: 23,
            method_version: "v1".to_string(),
        }
    }
}

impl WeeklyConfig {
    pub fn widest_fraction(&self) -> Option<f64> {
        self.tolerance_ladder.last().copied()
    }
}

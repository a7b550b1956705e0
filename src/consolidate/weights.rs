//! Per-engine vote weights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ir::DimensionType;

/// Weight profile of one recognition engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineProfile {
    /// Relative reliability of the engine.
    pub base_weight: f64,
    /// Extra weight for dimension types the engine reads particularly well.
    pub specialties: BTreeMap<DimensionType, f64>,
}

impl EngineProfile {
    pub fn new(base_weight: f64) -> Self {
        Self {
            base_weight,
            specialties: BTreeMap::new(),
        }
    }

    pub fn with_specialty(mut self, dimension_type: DimensionType, bonus: f64) -> Self {
        self.specialties.insert(dimension_type, bonus);
        self
    }
}

/// Vote weight table keyed by lowercase engine name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineWeights {
    pub engines: BTreeMap<String, EngineProfile>,
    /// Weight given to engines missing from the table.
    pub default_weight: f64,
}

impl Default for EngineWeights {
    fn default() -> Self {
        let engines = [
            (
                "edocr2",
                EngineProfile::new(0.40)
                    .with_specialty(DimensionType::Diameter, 0.15)
                    .with_specialty(DimensionType::Tolerance, 0.15)
                    .with_specialty(DimensionType::Thread, 0.10),
            ),
            ("paddleocr", EngineProfile::new(0.25)),
            ("easyocr", EngineProfile::new(0.20)),
            ("tesseract", EngineProfile::new(0.20)),
        ]
        .into_iter()
        .map(|(name, profile)| (name.to_string(), profile))
        .collect();

        Self {
            engines,
            default_weight: 0.10,
        }
    }
}

impl EngineWeights {
    /// A table with no known engines; every engine gets `default_weight`.
    pub fn empty(default_weight: f64) -> Self {
        Self {
            engines: BTreeMap::new(),
            default_weight,
        }
    }

    /// Adds or replaces an engine profile.
    pub fn with_engine(mut self, name: &str, profile: EngineProfile) -> Self {
        self.engines.insert(name.to_lowercase(), profile);
        self
    }

    fn profile(&self, engine: &str) -> Option<&EngineProfile> {
        self.engines
            .get(engine)
            .or_else(|| self.engines.get(&engine.to_lowercase()))
    }

    /// True when the engine has its own profile.
    pub fn is_known(&self, engine: &str) -> bool {
        self.profile(engine).is_some()
    }

    /// Base weight, or `default_weight` for unknown engines.
    pub fn base_weight(&self, engine: &str) -> f64 {
        self.profile(engine)
            .map(|p| p.base_weight)
            .unwrap_or(self.default_weight)
    }

    /// Specialty bonus for `dimension_type`, zero when none applies.
    pub fn specialty_bonus(&self, engine: &str, dimension_type: DimensionType) -> f64 {
        self.profile(engine)
            .and_then(|p| p.specialties.get(&dimension_type).copied())
            .unwrap_or(0.0)
    }

    /// `base_weight + specialty_bonus`.
    pub fn vote_weight(&self, engine: &str, dimension_type: DimensionType) -> f64 {
        self.base_weight(engine) + self.specialty_bonus(engine, dimension_type)
    }
}

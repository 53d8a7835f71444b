// Scoring weights and the what-if override boundary.
//
// The weights are the designated adjustable parameters of the composite
// formula. Overrides arrive as an explicit configuration value, are
// validated up front (the offending field is named in the error), and
// produce a new weight set — the original is never mutated, so concurrent
// what-if queries can't interfere.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Weights for the composite score formula:
///
/// `final = semantic*w_sem + must*w_must + nice*w_nice - penalty*w_cons`
///
/// The positive weights sum to 1.0 by default so an ideal candidate with a
/// clean timeline scores exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub semantic: f64,
    pub must_have: f64,
    pub nice_to_have: f64,
    pub consistency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            semantic: 0.40,
            must_have: 0.40,
            nice_to_have: 0.20,
            consistency: 1.0,
        }
    }
}

/// A partial weight override, as received at the what-if boundary.
///
/// Field names follow the external contract: `semanticWeight`,
/// `mustHaveWeight`, `niceToHaveWeight`, `consistencyWeight`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct WeightOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_have_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice_to_have_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency_weight: Option<f64>,
}

impl WeightOverrides {
    pub fn is_empty(&self) -> bool {
        self.semantic_weight.is_none()
            && self.must_have_weight.is_none()
            && self.nice_to_have_weight.is_none()
            && self.consistency_weight.is_none()
    }
}

impl ScoringWeights {
    /// Apply a validated override on top of these weights.
    ///
    /// Each provided value must be a finite number >= 0; anything else is
    /// rejected with the offending field named, leaving the base weights
    /// untouched.
    pub fn with_overrides(&self, overrides: &WeightOverrides) -> Result<Self, EngineError> {
        let mut next = self.clone();
        if let Some(v) = overrides.semantic_weight {
            next.semantic = validated("semanticWeight", v)?;
        }
        if let Some(v) = overrides.must_have_weight {
            next.must_have = validated("mustHaveWeight", v)?;
        }
        if let Some(v) = overrides.nice_to_have_weight {
            next.nice_to_have = validated("niceToHaveWeight", v)?;
        }
        if let Some(v) = overrides.consistency_weight {
            next.consistency = validated("consistencyWeight", v)?;
        }
        Ok(next)
    }
}

fn validated(field: &str, value: f64) -> Result<f64, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::config(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(EngineError::config(field, "must not be negative"));
    }
    Ok(value)
}

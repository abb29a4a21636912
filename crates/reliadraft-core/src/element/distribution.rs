//! Statistical distributions attached to reliability blocks.
//!
//! A [`Distribution`] pairs a distribution name with its parameter values.
//! The parameter key set is always exactly the canonical set for the name:
//! the map is private, renaming replaces it wholesale, and deserialization
//! rejects mismatched pairs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised when editing a distribution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    #[error("{name} has no parameter named '{parameter}'")]
    UnknownParameter {
        name: DistributionName,
        parameter: String,
    },
    #[error("parameter '{parameter}' must be finite, got {value}")]
    NonFinite { parameter: String, value: f64 },
    #[error("{name} expects parameters {expected:?}, got {actual:?}")]
    ParameterMismatch {
        name: DistributionName,
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

/// Supported distribution families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistributionName {
    #[default]
    DefaultNone,
    Weibull,
    Weibull3P,
    Normal,
    Exponential1P,
    Exponential2P,
}

impl DistributionName {
    pub const ALL: [DistributionName; 6] = [
        DistributionName::DefaultNone,
        DistributionName::Weibull,
        DistributionName::Weibull3P,
        DistributionName::Normal,
        DistributionName::Exponential1P,
        DistributionName::Exponential2P,
    ];

    /// Canonical parameters and their default values.
    pub fn default_parameters(self) -> &'static [(&'static str, f64)] {
        match self {
            DistributionName::DefaultNone => &[],
            DistributionName::Weibull => &[("beta", 1.5), ("eta", 1000.0)],
            DistributionName::Weibull3P => &[("beta", 10.0), ("eta", 1000.0), ("gamma", 40.0)],
            DistributionName::Normal => &[("mean", 250.0), ("sd", 50.0)],
            DistributionName::Exponential1P => &[("lambda", 10.0)],
            DistributionName::Exponential2P => &[("lambda", 10.0), ("t", 10.0)],
        }
    }

    /// Canonical parameter names.
    pub fn parameter_names(self) -> impl Iterator<Item = &'static str> {
        self.default_parameters().iter().map(|(name, _)| *name)
    }

    pub fn has_parameter(self, parameter: &str) -> bool {
        self.parameter_names().any(|name| name == parameter)
    }
}

impl fmt::Display for DistributionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistributionName::DefaultNone => "DefaultNone",
            DistributionName::Weibull => "Weibull",
            DistributionName::Weibull3P => "Weibull3P",
            DistributionName::Normal => "Normal",
            DistributionName::Exponential1P => "Exponential1P",
            DistributionName::Exponential2P => "Exponential2P",
        };
        f.write_str(name)
    }
}

/// A named distribution with parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDistribution")]
pub struct Distribution {
    distribution_name: DistributionName,
    parameters: BTreeMap<String, f64>,
}

/// Unvalidated wire shape.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDistribution {
    distribution_name: DistributionName,
    #[serde(default)]
    parameters: BTreeMap<String, f64>,
}

impl TryFrom<RawDistribution> for Distribution {
    type Error = DistributionError;

    fn try_from(raw: RawDistribution) -> Result<Self, Self::Error> {
        Distribution::with_parameters(raw.distribution_name, raw.parameters)
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self::new(DistributionName::DefaultNone)
    }
}

impl Distribution {
    /// Create a distribution with the canonical default parameters.
    pub fn new(name: DistributionName) -> Self {
        Self {
            distribution_name: name,
            parameters: canonical_parameters(name),
        }
    }

    /// Create a distribution from explicit values. The key set must match
    /// the canonical set for `name` exactly.
    pub fn with_parameters(
        name: DistributionName,
        parameters: BTreeMap<String, f64>,
    ) -> Result<Self, DistributionError> {
        let expected: Vec<String> = name.parameter_names().map(str::to_string).collect();
        let mut expected_sorted = expected.clone();
        expected_sorted.sort();
        let actual: Vec<String> = parameters.keys().cloned().collect();
        if actual != expected_sorted {
            return Err(DistributionError::ParameterMismatch {
                name,
                expected,
                actual,
            });
        }
        if let Some((parameter, value)) = parameters.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DistributionError::NonFinite {
                parameter: parameter.clone(),
                value: *value,
            });
        }
        Ok(Self {
            distribution_name: name,
            parameters,
        })
    }

    pub fn name(&self) -> DistributionName {
        self.distribution_name
    }

    pub fn parameters(&self) -> &BTreeMap<String, f64> {
        &self.parameters
    }

    pub fn parameter(&self, parameter: &str) -> Option<f64> {
        self.parameters.get(parameter).copied()
    }

    /// Switch to another distribution family. Parameters are reset to the
    /// new family's defaults even when the name is unchanged.
    pub fn set_name(&mut self, name: DistributionName) {
        self.distribution_name = name;
        self.parameters = canonical_parameters(name);
    }

    /// Builder form of [`Distribution::set_name`].
    pub fn renamed(mut self, name: DistributionName) -> Self {
        self.set_name(name);
        self
    }

    /// Set one parameter value. Only canonical parameters are accepted.
    pub fn set_parameter(&mut self, parameter: &str, value: f64) -> Result<(), DistributionError> {
        if !value.is_finite() {
            return Err(DistributionError::NonFinite {
                parameter: parameter.to_string(),
                value,
            });
        }
        match self.parameters.get_mut(parameter) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(DistributionError::UnknownParameter {
                name: self.distribution_name,
                parameter: parameter.to_string(),
            }),
        }
    }
}

fn canonical_parameters(name: DistributionName) -> BTreeMap<String, f64> {
    name.default_parameters()
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weibull_defaults() {
        let dist = Distribution::new(DistributionName::Weibull);
        assert_eq!(dist.parameters().len(), 2);
        assert_eq!(dist.parameter("beta"), Some(1.5));
        assert_eq!(dist.parameter("eta"), Some(1000.0));
    }

    #[test]
    fn test_set_name_resets_parameters() {
        let mut dist = Distribution::new(DistributionName::Normal);
        dist.set_parameter("mean", 10.0).unwrap();
        dist.set_name(DistributionName::Weibull);
        let keys: Vec<&str> = dist.parameters().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["beta", "eta"]);

        dist.set_name(DistributionName::DefaultNone);
        assert!(dist.parameters().is_empty());
    }

    #[test]
    fn test_set_unknown_parameter_rejected() {
        let mut dist = Distribution::new(DistributionName::Exponential1P);
        let err = dist.set_parameter("beta", 2.0).unwrap_err();
        assert!(matches!(err, DistributionError::UnknownParameter { .. }));
        assert_eq!(dist.parameters().len(), 1);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut dist = Distribution::new(DistributionName::Normal);
        assert!(dist.set_parameter("sd", f64::NAN).is_err());
        assert_eq!(dist.parameter("sd"), Some(50.0));
    }

    #[test]
    fn test_with_parameters_checks_keys() {
        let mut params = BTreeMap::new();
        params.insert("beta".to_string(), 2.0);
        assert!(Distribution::with_parameters(DistributionName::Weibull, params.clone()).is_err());

        params.insert("eta".to_string(), 500.0);
        let dist = Distribution::with_parameters(DistributionName::Weibull, params).unwrap();
        assert_eq!(dist.parameter("eta"), Some(500.0));
    }

    #[test]
    fn test_deserialize_rejects_mismatch() {
        let json = r#"{"distributionName":"Weibull","parameters":{"mean":1.0}}"#;
        assert!(serde_json::from_str::<Distribution>(json).is_err());

        let json = r#"{"distributionName":"Normal","parameters":{"mean":1.0,"sd":2.0}}"#;
        let dist: Distribution = serde_json::from_str(json).unwrap();
        assert_eq!(dist.name(), DistributionName::Normal);
    }

    #[test]
    fn test_serialized_shape() {
        let dist = Distribution::new(DistributionName::Exponential2P);
        let json = serde_json::to_value(&dist).unwrap();
        assert_eq!(json["distributionName"], "Exponential2P");
        assert_eq!(json["parameters"]["lambda"], 10.0);
        assert_eq!(json["parameters"]["t"], 10.0);
    }
}

//! Reliability block attributes.

use super::distribution::{Distribution, DistributionName};
use serde::{Deserialize, Serialize};

/// Time unit for block ages and durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Units {
    #[default]
    Hour,
}

/// Preventive maintenance policy. Serialized as 0 / 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PreventiveMaintenanceType {
    /// Fixed calendar interval.
    #[default]
    TimeBased,
    /// Interval counted from the block's age.
    AgeBased,
}

impl From<PreventiveMaintenanceType> for u8 {
    fn from(kind: PreventiveMaintenanceType) -> Self {
        match kind {
            PreventiveMaintenanceType::TimeBased => 0,
            PreventiveMaintenanceType::AgeBased => 1,
        }
    }
}

impl TryFrom<u8> for PreventiveMaintenanceType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PreventiveMaintenanceType::TimeBased),
            1 => Ok(PreventiveMaintenanceType::AgeBased),
            other => Err(format!("invalid preventive maintenance type: {other}")),
        }
    }
}

/// Maintenance and failure metadata carried by a block node.
///
/// `Default` yields the values a freshly opened property form starts from:
/// Weibull failures, Normal corrective repairs, no preventive maintenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockElement {
    pub name: String,
    pub description: String,
    pub units: Units,
    pub initial_age: f64,
    pub failure_distribution: Distribution,
    pub corrective_maintenance_distribution: Distribution,
    /// Restoration factor applied by corrective maintenance.
    #[serde(rename = "RF_corrective")]
    pub rf_corrective: f64,
    pub preventive_maintenance_distribution: Distribution,
    pub preventive_maintenance_type: PreventiveMaintenanceType,
    pub maintenance_duration: f64,
    /// Restoration factor applied by preventive maintenance.
    #[serde(rename = "RF_preventive")]
    pub rf_preventive: f64,
}

impl Default for BlockElement {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            units: Units::Hour,
            initial_age: 0.0,
            failure_distribution: Distribution::new(DistributionName::Weibull),
            corrective_maintenance_distribution: Distribution::new(DistributionName::Normal),
            rf_corrective: 0.0,
            preventive_maintenance_distribution: Distribution::new(DistributionName::DefaultNone),
            preventive_maintenance_type: PreventiveMaintenanceType::TimeBased,
            maintenance_duration: 0.0,
            rf_preventive: 0.0,
        }
    }
}

impl BlockElement {
    /// Create a named block with default maintenance data.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

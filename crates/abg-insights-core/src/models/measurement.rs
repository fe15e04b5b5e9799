//! Arterial blood gas measurement and range validation.

use std::ops::RangeInclusive;

use abg_insights_llm::BloodGasValues;
use serde::{Deserialize, Serialize};

/// Accepted physiologic ranges, all closed intervals.
pub struct MeasurementRanges;

impl MeasurementRanges {
    pub const PH: RangeInclusive<f64> = 6.8..=7.8;
    /// mmHg
    pub const PCO2: RangeInclusive<f64> = 10.0..=100.0;
    /// mEq/L
    pub const HCO3: RangeInclusive<f64> = 5.0..=50.0;
    /// mmHg
    pub const PAO2: RangeInclusive<f64> = 40.0..=600.0;
    /// mEq/L
    pub const BASE_EXCESS: RangeInclusive<f64> = -30.0..=30.0;
}

/// A single ABG reading. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Acidity index
    pub ph: f64,
    /// Carbon dioxide partial pressure (mmHg)
    pub pco2: f64,
    /// Bicarbonate concentration (mEq/L)
    pub hco3: f64,
    /// Oxygen partial pressure (mmHg)
    pub pao2: f64,
    /// Base excess (mEq/L)
    pub base_excess: f64,
}

impl Measurement {
    pub fn new(ph: f64, pco2: f64, hco3: f64, pao2: f64, base_excess: f64) -> Self {
        Self {
            ph,
            pco2,
            hco3,
            pao2,
            base_excess,
        }
    }

    /// Check every field against its physiologic range.
    pub fn is_valid(&self) -> bool {
        self.out_of_range_fields().is_empty()
    }

    /// Names of the fields outside their range (NaN counts as outside).
    pub fn out_of_range_fields(&self) -> Vec<&'static str> {
        [
            ("ph", self.ph, MeasurementRanges::PH),
            ("pco2", self.pco2, MeasurementRanges::PCO2),
            ("hco3", self.hco3, MeasurementRanges::HCO3),
            ("pao2", self.pao2, MeasurementRanges::PAO2),
            ("base_excess", self.base_excess, MeasurementRanges::BASE_EXCESS),
        ]
        .into_iter()
        .filter(|(_, value, range)| !range.contains(value))
        .map(|(name, _, _)| name)
        .collect()
    }
}

/// Validate a measurement. Pure; no partial validity.
pub fn validate(measurement: &Measurement) -> bool {
    measurement.is_valid()
}

impl From<&Measurement> for BloodGasValues {
    fn from(m: &Measurement) -> Self {
        BloodGasValues {
            ph: m.ph,
            pco2: m.pco2,
            hco3: m.hco3,
            pao2: m.pao2,
            base_excess: m.base_excess,
        }
    }
}

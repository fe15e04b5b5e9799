//! Rule-based acid-base and oxygenation classification.
//!
//! Deterministic companion to the AI interpretation, using standard
//! reference bands:
//! - pH 7.35-7.45
//! - pCO2 35-45 mmHg
//! - HCO3 22-26 mEq/L

use serde::{Deserialize, Serialize};

use super::measurement::Measurement;

const PH_LOW: f64 = 7.35;
const PH_HIGH: f64 = 7.45;
const PH_MIDPOINT: f64 = 7.40;
const PCO2_LOW: f64 = 35.0;
const PCO2_HIGH: f64 = 45.0;
const HCO3_LOW: f64 = 22.0;
const HCO3_HIGH: f64 = 26.0;

/// Primary acid-base disorder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AcidBaseStatus {
    Normal,
    MetabolicAcidosis,
    MetabolicAlkalosis,
    RespiratoryAcidosis,
    RespiratoryAlkalosis,
    /// Respiratory and metabolic components push the same way
    MixedDisorder,
}

/// Degree to which the secondary component offsets the primary disorder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompensationStatus {
    Uncompensated,
    PartiallyCompensated,
    FullyCompensated,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OxygenationStatus {
    /// PaO2 >= 80 mmHg
    Normal,
    /// 60-79 mmHg
    HypoxemiaMild,
    /// 40-59 mmHg
    HypoxemiaModerate,
    /// < 40 mmHg
    HypoxemiaSevere,
}

/// Combined classification of a measurement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assessment {
    pub acid_base: AcidBaseStatus,
    pub compensation: CompensationStatus,
    pub oxygenation: OxygenationStatus,
}

/// Which way a component pushes the pH.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shift {
    Acid,
    Base,
    None,
}

fn respiratory_shift(pco2: f64) -> Shift {
    if pco2 > PCO2_HIGH {
        Shift::Acid
    } else if pco2 < PCO2_LOW {
        Shift::Base
    } else {
        Shift::None
    }
}

fn metabolic_shift(hco3: f64) -> Shift {
    if hco3 < HCO3_LOW {
        Shift::Acid
    } else if hco3 > HCO3_HIGH {
        Shift::Base
    } else {
        Shift::None
    }
}

/// Classify a measurement. Pure and total.
pub fn assess(measurement: &Measurement) -> Assessment {
    let (acid_base, compensation) = classify_acid_base(measurement);
    Assessment {
        acid_base,
        compensation,
        oxygenation: classify_oxygenation(measurement.pao2),
    }
}

fn classify_acid_base(m: &Measurement) -> (AcidBaseStatus, CompensationStatus) {
    let resp = respiratory_shift(m.pco2);
    let meta = metabolic_shift(m.hco3);

    if resp != Shift::None && resp == meta {
        return (AcidBaseStatus::MixedDisorder, CompensationStatus::Uncompensated);
    }

    let ph_shift = if m.ph < PH_LOW {
        Shift::Acid
    } else if m.ph > PH_HIGH {
        Shift::Base
    } else {
        Shift::None
    };

    if ph_shift == Shift::None {
        if resp == Shift::None && meta == Shift::None {
            return (AcidBaseStatus::Normal, CompensationStatus::Uncompensated);
        }
        // Normal pH with abnormal components: the side of 7.40 names the primary.
        let leaning = if m.ph < PH_MIDPOINT {
            Shift::Acid
        } else {
            Shift::Base
        };
        let status = primary_for(leaning, resp, meta);
        return (status, CompensationStatus::FullyCompensated);
    }

    let status = primary_for(ph_shift, resp, meta);
    let secondary = match status {
        AcidBaseStatus::RespiratoryAcidosis | AcidBaseStatus::RespiratoryAlkalosis => meta,
        _ => resp,
    };
    let compensation = if secondary != Shift::None && secondary != ph_shift {
        CompensationStatus::PartiallyCompensated
    } else {
        CompensationStatus::Uncompensated
    };
    (status, compensation)
}

/// Pick the component that explains a pH shift in `direction`.
fn primary_for(direction: Shift, resp: Shift, meta: Shift) -> AcidBaseStatus {
    match direction {
        Shift::Acid if resp == Shift::Acid => AcidBaseStatus::RespiratoryAcidosis,
        Shift::Acid if meta == Shift::Acid => AcidBaseStatus::MetabolicAcidosis,
        Shift::Base if resp == Shift::Base => AcidBaseStatus::RespiratoryAlkalosis,
        Shift::Base if meta == Shift::Base => AcidBaseStatus::MetabolicAlkalosis,
        // pH moved without a component to explain it
        Shift::Acid => AcidBaseStatus::MetabolicAcidosis,
        Shift::Base => AcidBaseStatus::MetabolicAlkalosis,
        Shift::None => AcidBaseStatus::Normal,
    }
}

fn classify_oxygenation(pao2: f64) -> OxygenationStatus {
    if pao2 >= 80.0 {
        OxygenationStatus::Normal
    } else if pao2 >= 60.0 {
        OxygenationStatus::HypoxemiaMild
    } else if pao2 >= 40.0 {
        OxygenationStatus::HypoxemiaModerate
    } else {
        OxygenationStatus::HypoxemiaSevere
    }
}

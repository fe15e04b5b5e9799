//! Prompts for arterial blood gas interpretation.
//!
//! The full-analysis prompt asks for a single reply with three `##` headed
//! sections, which [`crate::sections::parse_sections`] splits back apart.

use serde::{Deserialize, Serialize};

/// Heading label for the interpretation section.
pub const INTERPRETATION_HEADING: &str = "INTERPRETATION";
/// Heading label for the suggested conditions section.
pub const CONDITIONS_HEADING: &str = "SUGGESTED CONDITIONS";
/// Heading label for the treatment recommendations section.
pub const TREATMENT_HEADING: &str = "TREATMENT RECOMMENDATIONS";

/// System context shared by every prompt.
pub const SYSTEM_PROMPT: &str = "You are an expert medical AI assistant specializing in Arterial Blood Gas (ABG) interpretation.";

/// Clinical disclaimer appended to treatment-related prompts.
pub const DISCLAIMER: &str = "IMPORTANT DISCLAIMER: These suggestions assist clinical decision-making but are not \
definitive treatment plans. The treating physician must consider the full clinical context.";

/// Blood gas values as rendered into prompts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodGasValues {
    pub ph: f64,
    pub pco2: f64,
    pub hco3: f64,
    pub pao2: f64,
    pub base_excess: f64,
}

impl BloodGasValues {
    /// Render the values as the bullet list every prompt embeds.
    pub fn to_bullets(&self) -> String {
        format!(
            "- pH: {}\n- pCO2: {} mmHg\n- HCO3: {} mEq/L\n- PaO2: {} mmHg\n- BE: {} mEq/L",
            self.ph, self.pco2, self.hco3, self.pao2, self.base_excess
        )
    }
}

/// Single-call prompt producing all three sections at once.
pub fn make_full_analysis_prompt(values: &BloodGasValues) -> String {
    format!(
        r#"{system}

Analyze the following ABG values comprehensively:
{values}

Provide three sections in your response:

## {interpretation}
Provide detailed interpretation including:
- Primary acid-base disorder
- Compensation status
- Oxygenation status
- Clinical significance

## {conditions}
List 3-5 most likely underlying conditions with brief explanations

## {treatment}
Provide initial treatment recommendations including:
- Immediate interventions
- Supportive care
- Monitoring parameters
- When to escalate care

{disclaimer}

Format with clear section headers and bullet points."#,
        system = SYSTEM_PROMPT,
        values = values.to_bullets(),
        interpretation = INTERPRETATION_HEADING,
        conditions = CONDITIONS_HEADING,
        treatment = TREATMENT_HEADING,
        disclaimer = DISCLAIMER,
    )
}

/// Staged prompt: interpretation only.
pub fn make_interpretation_prompt(values: &BloodGasValues) -> String {
    format!(
        r#"{}

Analyze the following ABG values:
{}

Please provide a detailed interpretation including:
1. Primary acid-base disorder (acidosis/alkalosis, metabolic/respiratory)
2. Compensation status (uncompensated, partially compensated, fully compensated)
3. Oxygenation status
4. Clinical significance

Format your response clearly with bullet points and be concise but thorough."#,
        SYSTEM_PROMPT,
        values.to_bullets()
    )
}

/// Staged prompt: underlying conditions given an interpretation.
pub fn make_conditions_prompt(values: &BloodGasValues, interpretation: &str) -> String {
    format!(
        r#"Based on the following ABG values and interpretation, suggest possible underlying medical conditions:

ABG Values:
{}

Interpretation: {}

List 3-5 most likely underlying conditions that could cause this ABG pattern.
For each condition, provide:
- Condition name
- Brief explanation of why this condition matches the ABG pattern
- Key clinical features to look for

Be specific and clinically relevant. This is for medical professionals."#,
        values.to_bullets(),
        interpretation
    )
}

/// Staged prompt: treatment recommendations given interpretation and conditions.
pub fn make_treatment_prompt(
    values: &BloodGasValues,
    interpretation: &str,
    conditions: &str,
) -> String {
    format!(
        r#"Based on the following ABG analysis, provide treatment recommendations:

ABG Values:
{}

Interpretation: {}

Suggested Conditions: {}

Provide initial treatment recommendations including:
1. Immediate interventions needed
2. Supportive care measures
3. Monitoring parameters
4. When to escalate care

{}

Be specific, actionable, and prioritize patient safety."#,
        values.to_bullets(),
        interpretation,
        conditions,
        DISCLAIMER
    )
}

use serde::Serialize;

/// Whole quantities print without a decimal part, fractional ones with one.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

/// Per-recruiter figures keyed by the display labels used everywhere the
/// summary is shown, which differ from the worksheet indicator labels.
#[derive(Debug, Clone, Serialize)]
pub struct RecruiterHighlightsView {
    pub recruiter: String,
    #[serde(rename = "Candidats contactés")]
    pub contacted: f64,
    #[serde(rename = "Entretiens Salariés")]
    pub salaried_interviews: f64,
    #[serde(rename = "Entretiens Sous-Traitants")]
    pub subcontractor_interviews: f64,
    #[serde(rename = "Recrutements")]
    pub recruitments: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestPerformerView {
    pub recruiter: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateSummaryView {
    pub total_contacted: f64,
    pub total_interviews: f64,
    pub total_salaried_interviews: f64,
    pub total_subcontractor_interviews: f64,
    pub total_recruitments: f64,
    pub recruiters: Vec<RecruiterHighlightsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_contact: Option<BestPerformerView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_recruitment: Option<BestPerformerView>,
}

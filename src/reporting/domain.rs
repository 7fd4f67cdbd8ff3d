use serde::Serialize;
use std::collections::BTreeMap;

/// Recruiter worksheets expected in the quarterly workbook, one sheet each.
pub const RECRUITERS: [&str; 4] = ["Inès", "Mariéme", "Pauline", "Samya"];

/// Months covered by the reporting quarter, in worksheet column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Month {
    Juillet,
    Aout,
    Septembre,
}

impl Month {
    pub const fn ordered() -> [Self; 3] {
        [Self::Juillet, Self::Aout, Self::Septembre]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Juillet => "Juillet",
            Self::Aout => "Août",
            Self::Septembre => "Septembre",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Juillet => 0,
            Self::Aout => 1,
            Self::Septembre => 2,
        }
    }
}

/// Closed set of indicators the system consumes anywhere.
///
/// Worksheet labels are mapped onto this enum at the extraction boundary;
/// rows carrying any other label never make it into a [`RecruiterTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kpi {
    CandidatesContacted,
    SalariedCandidateInterviews,
    SubcontractorCandidateInterviews,
    SalariedRecruitments,
    SubcontractorIntegrations,
    Interviews,
    Recruitments,
    SalariedInterviews,
    SubcontractorInterviews,
}

impl Kpi {
    /// Exact worksheet label, matched verbatim after trimming.
    pub const fn source_label(self) -> &'static str {
        match self {
            Self::CandidatesContacted => "Nb de candidats contactés",
            Self::SalariedCandidateInterviews => "Nb d'entretiens candidats Salariés",
            Self::SubcontractorCandidateInterviews => "Nb d'entretiens candidats Sous-Traitants",
            Self::SalariedRecruitments => "Nb de candidats recrutés Salariés",
            Self::SubcontractorIntegrations => "Nb de candidats intégrés Sous Traitants",
            Self::Interviews => "Nb d'entretiens",
            Self::Recruitments => "Nb de recrutements",
            Self::SalariedInterviews => "Nb d'entretiens salariés",
            Self::SubcontractorInterviews => "Nb d'entretiens sous-traitants",
        }
    }

    /// Display name shown in chart selection prompts and chart captions.
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::CandidatesContacted => "Candidats contactés",
            Self::Interviews => "Entretiens (salariés + sous-traitants)",
            Self::Recruitments => "Recrutements aboutis",
            Self::SalariedInterviews => "Entretiens avec salariés",
            Self::SubcontractorInterviews => "Entretiens avec sous-traitants",
            other => other.source_label(),
        }
    }

    pub fn from_source_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::all()
            .into_iter()
            .find(|kpi| kpi.source_label() == trimmed)
    }

    /// Indicators offered in the chart selection prompt.
    pub const fn chart_options() -> [Self; 5] {
        [
            Self::CandidatesContacted,
            Self::Interviews,
            Self::Recruitments,
            Self::SalariedInterviews,
            Self::SubcontractorInterviews,
        ]
    }

    const fn all() -> [Self; 9] {
        [
            Self::CandidatesContacted,
            Self::SalariedCandidateInterviews,
            Self::SubcontractorCandidateInterviews,
            Self::SalariedRecruitments,
            Self::SubcontractorIntegrations,
            Self::Interviews,
            Self::Recruitments,
            Self::SalariedInterviews,
            Self::SubcontractorInterviews,
        ]
    }
}

/// Three monthly values plus the quarter total for one indicator.
///
/// The total is the worksheet's own total cell when it holds a value,
/// otherwise the sum of the monthly values. A worksheet total that
/// disagrees with the monthly sum is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlySeries {
    months: [f64; 3],
    total: f64,
}

impl MonthlySeries {
    pub const fn new(months: [f64; 3], total: f64) -> Self {
        Self { months, total }
    }

    /// Builds a series whose total is the sum of the monthly values.
    pub fn from_months(months: [f64; 3]) -> Self {
        Self {
            months,
            total: months.iter().sum(),
        }
    }

    pub const fn months(&self) -> [f64; 3] {
        self.months
    }

    pub const fn month(&self, month: Month) -> f64 {
        self.months[month.index()]
    }

    pub const fn quarter_total(&self) -> f64 {
        self.total
    }
}

/// Per-recruiter matrix of indicator values, built once per load.
pub type RecruiterTable = BTreeMap<Kpi, MonthlySeries>;

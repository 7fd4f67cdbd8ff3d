use super::views::{AggregateSummaryView, BestPerformerView, RecruiterHighlightsView};
use crate::reporting::domain::{Kpi, MonthlySeries, RecruiterTable};
use crate::reporting::repository::KpiRepository;
use std::collections::BTreeMap;

/// Recruiter currently leading one metric. Absent while every recruiter
/// is still at zero, so "no leader yet" stays distinguishable from a
/// genuine zero-valued leader.
#[derive(Debug, Clone, PartialEq)]
pub struct BestPerformer {
    pub name: String,
    pub value: f64,
}

/// Quarter figures derived for one recruiter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecruiterHighlights {
    pub contacted: f64,
    pub salaried_interviews: f64,
    pub subcontractor_interviews: f64,
    pub recruitments: f64,
}

/// Global totals, per-recruiter figures, and best-performer slots.
/// Transient: recomputed from the repository on every request.
#[derive(Debug, Default)]
pub struct AggregateSummary {
    pub contacted: f64,
    pub interviews: f64,
    pub salaried_interviews: f64,
    pub subcontractor_interviews: f64,
    pub recruitments: f64,
    pub recruiters: BTreeMap<String, RecruiterHighlights>,
    pub best_contact: Option<BestPerformer>,
    pub best_recruitment: Option<BestPerformer>,
}

impl AggregateSummary {
    pub fn compute(repository: &KpiRepository) -> Self {
        let mut summary = Self::default();

        for (name, table) in repository.tables() {
            let contacted = quarter_value(table, Kpi::CandidatesContacted);
            let salaried = quarter_value(table, Kpi::SalariedCandidateInterviews);
            let subcontracted = quarter_value(table, Kpi::SubcontractorCandidateInterviews);
            let recruited = quarter_value(table, Kpi::SalariedRecruitments)
                + quarter_value(table, Kpi::SubcontractorIntegrations);

            summary.contacted += contacted;
            summary.salaried_interviews += salaried;
            summary.subcontractor_interviews += subcontracted;
            summary.interviews += salaried + subcontracted;
            summary.recruitments += recruited;

            summary.recruiters.insert(
                name.clone(),
                RecruiterHighlights {
                    contacted,
                    salaried_interviews: salaried,
                    subcontractor_interviews: subcontracted,
                    recruitments: recruited,
                },
            );

            update_best(&mut summary.best_contact, name, contacted);
            update_best(&mut summary.best_recruitment, name, recruited);
        }

        summary
    }

    pub fn view(&self) -> AggregateSummaryView {
        AggregateSummaryView {
            total_contacted: self.contacted,
            total_interviews: self.interviews,
            total_salaried_interviews: self.salaried_interviews,
            total_subcontractor_interviews: self.subcontractor_interviews,
            total_recruitments: self.recruitments,
            recruiters: self
                .recruiters
                .iter()
                .map(|(name, highlights)| RecruiterHighlightsView {
                    recruiter: name.clone(),
                    contacted: highlights.contacted,
                    salaried_interviews: highlights.salaried_interviews,
                    subcontractor_interviews: highlights.subcontractor_interviews,
                    recruitments: highlights.recruitments,
                })
                .collect(),
            best_contact: self.best_contact.as_ref().map(BestPerformer::view),
            best_recruitment: self.best_recruitment.as_ref().map(BestPerformer::view),
        }
    }
}

impl BestPerformer {
    fn view(&self) -> BestPerformerView {
        BestPerformerView {
            recruiter: self.name.clone(),
            value: self.value,
        }
    }
}

/// Missing indicators contribute a zero series, never an error.
fn quarter_value(table: &RecruiterTable, kpi: Kpi) -> f64 {
    table
        .get(&kpi)
        .map(MonthlySeries::quarter_total)
        .unwrap_or(0.0)
}

/// Strictly-greater comparison: ties keep the first-seen holder, and a
/// zero value never claims an empty slot.
fn update_best(slot: &mut Option<BestPerformer>, name: &str, value: f64) {
    let current = slot.as_ref().map(|best| best.value).unwrap_or(0.0);
    if value > current {
        *slot = Some(BestPerformer {
            name: name.to_owned(),
            value,
        });
    }
}

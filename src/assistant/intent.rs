use crate::reporting::domain::{Kpi, RECRUITERS};

/// Sub-cases of a totals question, resolved in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TotalTopic {
    Contacted,
    SalariedInterviews,
    SubcontractorInterviews,
    Interviews,
    Recruitments,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BestTopic {
    Contacted,
    Recruitments,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Intent {
    Greeting,
    Totals(TotalTopic),
    Best(BestTopic),
    TrendChart,
    ComparisonChart,
    Help,
    Fallback,
}

/// Ordered keyword rules; the first matching predicate wins, so overlaps
/// between branches are resolved by position in this table alone.
const RULES: &[(fn(&str) -> bool, fn(&str) -> Intent)] = &[
    (is_greeting, |_| Intent::Greeting),
    (mentions_total, |text| Intent::Totals(total_topic(text))),
    (mentions_best, |text| Intent::Best(best_topic(text))),
    (mentions_trend, |_| Intent::TrendChart),
    (mentions_comparison, |_| Intent::ComparisonChart),
    (mentions_help, |_| Intent::Help),
];

/// Classifies one lower-cased message. Never fails; unmatched input is
/// the fallback intent.
pub(crate) fn detect(text: &str) -> Intent {
    RULES
        .iter()
        .find(|(predicate, _)| predicate(text))
        .map(|(_, build)| build(text))
        .unwrap_or(Intent::Fallback)
}

fn is_greeting(text: &str) -> bool {
    ["bonjour", "salut", "hello", "coucou"]
        .iter()
        .any(|word| text.contains(word))
}

fn mentions_total(text: &str) -> bool {
    text.contains("total")
}

fn total_topic(text: &str) -> TotalTopic {
    if text.contains("candidats contactés") {
        TotalTopic::Contacted
    } else if text.contains("entretiens") && text.contains("salariés") {
        TotalTopic::SalariedInterviews
    } else if text.contains("entretiens") && text.contains("sous-traitants") {
        TotalTopic::SubcontractorInterviews
    } else if text.contains("entretiens") {
        TotalTopic::Interviews
    } else if text.contains("recrutements") {
        TotalTopic::Recruitments
    } else {
        TotalTopic::All
    }
}

fn mentions_best(text: &str) -> bool {
    text.contains("meilleur") || text.contains("top") || text.contains("le plus")
}

fn best_topic(text: &str) -> BestTopic {
    if text.contains("contacté") {
        BestTopic::Contacted
    } else if text.contains("recruté") || text.contains("recrutements") {
        BestTopic::Recruitments
    } else {
        BestTopic::Both
    }
}

fn mentions_trend(text: &str) -> bool {
    text.contains("graphique") || text.contains("visualisation") || text.contains("courbe")
}

fn mentions_comparison(text: &str) -> bool {
    text.contains("comparaison") || text.contains("comparer")
}

fn mentions_help(text: &str) -> bool {
    text.contains("aide") || text.contains("soutien")
}

/// Indicator named in a chart request, most specific vocabulary first so
/// "entretiens salariés" never resolves to the aggregate interviews one.
pub(crate) fn detect_kpi(text: &str) -> Option<Kpi> {
    if text.contains("entretiens") && text.contains("sous-traitants") {
        Some(Kpi::SubcontractorInterviews)
    } else if text.contains("entretiens") && text.contains("salariés") {
        Some(Kpi::SalariedInterviews)
    } else if text.contains("contact") {
        Some(Kpi::CandidatesContacted)
    } else if text.contains("entretiens") {
        Some(Kpi::Interviews)
    } else if text.contains("recrutement") {
        Some(Kpi::Recruitments)
    } else {
        None
    }
}

/// Recruiter subset named in the message; `None` means every recruiter.
pub(crate) fn detect_recruiters(text: &str) -> Option<Vec<String>> {
    let subset: Vec<String> = RECRUITERS
        .iter()
        .filter(|name| text.contains(&name.to_lowercase()))
        .map(|name| (*name).to_owned())
        .collect();

    if subset.is_empty() {
        None
    } else {
        Some(subset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(input: &str) -> Intent {
        detect(&input.to_lowercase())
    }

    #[test]
    fn greeting_outranks_every_other_branch() {
        assert_eq!(classify("Bonjour"), Intent::Greeting);
        assert_eq!(classify("bonjour, quel est le total?"), Intent::Greeting);
    }

    #[test]
    fn totals_sub_cases_resolve_in_order() {
        assert_eq!(
            classify("quel est le total des candidats contactés"),
            Intent::Totals(TotalTopic::Contacted)
        );
        assert_eq!(
            classify("total des entretiens salariés"),
            Intent::Totals(TotalTopic::SalariedInterviews)
        );
        assert_eq!(
            classify("total des entretiens sous-traitants"),
            Intent::Totals(TotalTopic::SubcontractorInterviews)
        );
        assert_eq!(
            classify("total des entretiens"),
            Intent::Totals(TotalTopic::Interviews)
        );
        assert_eq!(
            classify("total des recrutements"),
            Intent::Totals(TotalTopic::Recruitments)
        );
        assert_eq!(classify("quel est le total"), Intent::Totals(TotalTopic::All));
    }

    #[test]
    fn best_performer_branch_matches_meilleur_and_top() {
        assert_eq!(
            classify("qui est le meilleur sur les contactés"),
            Intent::Best(BestTopic::Contacted)
        );
        assert_eq!(
            classify("top recrutements"),
            Intent::Best(BestTopic::Recruitments)
        );
        assert_eq!(classify("les meilleurs ?"), Intent::Best(BestTopic::Both));
        assert_eq!(
            classify("qui a fait le plus de recrutements"),
            Intent::Best(BestTopic::Recruitments)
        );
    }

    #[test]
    fn chart_branches_match_their_vocabulary() {
        assert_eq!(classify("montre un graphique"), Intent::TrendChart);
        assert_eq!(classify("une courbe des entretiens"), Intent::TrendChart);
        assert_eq!(classify("comparer les recruteurs"), Intent::ComparisonChart);
    }

    #[test]
    fn help_and_fallback_close_the_table() {
        assert_eq!(classify("j'ai besoin d'aide"), Intent::Help);
        assert_eq!(classify("quelle heure est-il"), Intent::Fallback);
    }

    #[test]
    fn total_branch_outranks_chart_branch() {
        // "total" appears before the chart keywords in the table
        assert_eq!(
            classify("graphique du total des recrutements"),
            Intent::Totals(TotalTopic::Recruitments)
        );
    }

    #[test]
    fn kpi_detection_prefers_the_most_specific_label() {
        let text = "graphique des entretiens sous-traitants".to_lowercase();
        assert_eq!(detect_kpi(&text), Some(Kpi::SubcontractorInterviews));
        assert_eq!(
            detect_kpi("courbe des entretiens"),
            Some(Kpi::Interviews)
        );
        assert_eq!(
            detect_kpi("graphique des candidats contactés"),
            Some(Kpi::CandidatesContacted)
        );
        assert_eq!(detect_kpi("un graphique"), None);
    }

    #[test]
    fn recruiter_subsets_come_from_the_message() {
        assert_eq!(
            detect_recruiters("courbe des entretiens pour inès et pauline"),
            Some(vec!["Inès".to_owned(), "Pauline".to_owned()])
        );
        assert_eq!(detect_recruiters("courbe des entretiens"), None);
    }
}

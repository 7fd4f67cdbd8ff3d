use super::intent::{self, BestTopic, Intent, TotalTopic};
use crate::reporting::charts::{ChartArtifact, ChartRenderer};
use crate::reporting::domain::Kpi;
use crate::reporting::repository::KpiRepository;
use crate::reporting::summary::views::format_quantity;
use crate::reporting::summary::{AggregateSummary, BestPerformer};
use serde::Serialize;

/// One assistant reply: text, plus the rendered chart when a chart
/// request could be satisfied.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartArtifact>,
}

impl ChatReply {
    fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            chart: None,
        }
    }
}

/// Rule-based answering over the aggregate summary. Stateless per turn;
/// never returns an error to the caller.
pub struct Responder<'a> {
    repository: &'a KpiRepository,
    renderer: &'a ChartRenderer,
}

impl<'a> Responder<'a> {
    pub fn new(repository: &'a KpiRepository, renderer: &'a ChartRenderer) -> Self {
        Self {
            repository,
            renderer,
        }
    }

    pub fn respond(&self, input: &str) -> ChatReply {
        let text = input.to_lowercase();
        let summary = AggregateSummary::compute(self.repository);

        match intent::detect(&text) {
            Intent::Greeting => ChatReply::text(
                "Bonjour! Comment puis-je vous aider avec les données RH du Q3 2024?",
            ),
            Intent::Totals(topic) => ChatReply::text(totals_message(&summary, topic)),
            Intent::Best(topic) => ChatReply::text(best_message(&summary, topic)),
            Intent::TrendChart => self.trend_reply(&text),
            Intent::ComparisonChart => self.comparison_reply(&text),
            Intent::Help => ChatReply::text(help_message()),
            Intent::Fallback => ChatReply::text(fallback_message(&summary)),
        }
    }

    fn trend_reply(&self, text: &str) -> ChatReply {
        let Some(kpi) = intent::detect_kpi(text) else {
            return ChatReply::text(selection_prompt("visualiser"));
        };

        let recruiters = intent::detect_recruiters(text);
        match self.renderer.trend(self.repository, kpi, recruiters.as_deref()) {
            Ok(artifact) => ChatReply {
                message: format!("Voici l'évolution du {} par mois:", kpi.source_label()),
                chart: Some(artifact),
            },
            Err(err) => {
                tracing::warn!(error = %err, "trend chart rendering failed");
                ChatReply::text(format!("Le graphique n'a pas pu être généré: {err}"))
            }
        }
    }

    fn comparison_reply(&self, text: &str) -> ChatReply {
        let Some(kpi) = intent::detect_kpi(text) else {
            return ChatReply::text(selection_prompt("comparer"));
        };

        match self.renderer.comparison(self.repository, kpi) {
            Ok(Some(artifact)) => ChatReply {
                message: format!("Comparaison des recruteurs pour {}:", kpi.source_label()),
                chart: Some(artifact),
            },
            Ok(None) => ChatReply::text(format!(
                "Aucune donnée disponible pour {}",
                kpi.source_label()
            )),
            Err(err) => {
                tracing::warn!(error = %err, "comparison chart rendering failed");
                ChatReply::text(format!("Le graphique n'a pas pu être généré: {err}"))
            }
        }
    }
}

fn totals_message(summary: &AggregateSummary, topic: TotalTopic) -> String {
    match topic {
        TotalTopic::Contacted => format!(
            "Nombre total de candidats contactés: {}",
            format_quantity(summary.contacted)
        ),
        TotalTopic::SalariedInterviews => format!(
            "Nombre total d'entretiens avec salariés: {}",
            format_quantity(summary.salaried_interviews)
        ),
        TotalTopic::SubcontractorInterviews => format!(
            "Nombre total d'entretiens avec sous-traitants: {}",
            format_quantity(summary.subcontractor_interviews)
        ),
        TotalTopic::Interviews => format!(
            "Nombre total d'entretiens: {}",
            format_quantity(summary.interviews)
        ),
        TotalTopic::Recruitments => format!(
            "Nombre total de recrutements aboutis: {}",
            format_quantity(summary.recruitments)
        ),
        TotalTopic::All => format!(
            "Voici les totaux globaux:\n\
             - Candidats contactés: {}\n\
             - Entretiens totaux: {}\n\
             \u{20}\u{20}- dont salariés: {}\n\
             \u{20}\u{20}- dont sous-traitants: {}\n\
             - Recrutements aboutis: {}",
            format_quantity(summary.contacted),
            format_quantity(summary.interviews),
            format_quantity(summary.salaried_interviews),
            format_quantity(summary.subcontractor_interviews),
            format_quantity(summary.recruitments)
        ),
    }
}

fn best_message(summary: &AggregateSummary, topic: BestTopic) -> String {
    match topic {
        BestTopic::Contacted => best_contact_line(summary.best_contact.as_ref()),
        BestTopic::Recruitments => best_recruitment_line(summary.best_recruitment.as_ref()),
        BestTopic::Both => format!(
            "Voici les meilleurs recruteurs:\n- {}\n- {}",
            best_contact_line(summary.best_contact.as_ref()),
            best_recruitment_line(summary.best_recruitment.as_ref())
        ),
    }
}

fn best_contact_line(best: Option<&BestPerformer>) -> String {
    match best {
        Some(best) => format!(
            "Le recruteur ayant contacté le plus de candidats: {} ({} candidats)",
            best.name,
            format_quantity(best.value)
        ),
        None => "Aucun recruteur ne se détache encore sur les contacts.".to_owned(),
    }
}

fn best_recruitment_line(best: Option<&BestPerformer>) -> String {
    match best {
        Some(best) => format!(
            "Le recruteur ayant effectué le plus de recrutements: {} ({} recrutements)",
            best.name,
            format_quantity(best.value)
        ),
        None => "Aucun recruteur ne se détache encore sur les recrutements.".to_owned(),
    }
}

fn selection_prompt(verb: &str) -> String {
    let mut prompt = format!("Choisissez l'indicateur à {verb}:\n");
    for kpi in Kpi::chart_options() {
        prompt.push_str(&format!("- {}\n", kpi.source_label()));
    }
    prompt.push_str(&format!(
        "Reformulez votre demande en nommant l'indicateur, par exemple: \
         'graphique des entretiens' ou '{} des recrutements'.",
        if verb == "comparer" {
            "comparaison"
        } else {
            "courbe"
        }
    ));
    prompt
}

fn help_message() -> String {
    "Je peux vous aider avec:\n\
     - Les totaux globaux (candidats, entretiens, recrutements)\n\
     - Les performances par recruteur\n\
     - Les meilleurs recruteurs par catégorie\n\
     - Des graphiques d'évolution mensuelle\n\
     - Des comparaisons entre recruteurs\n\n\
     Exemples de questions:\n\
     - 'Quel est le total des candidats contactés?'\n\
     - 'Qui a effectué le plus de recrutements?'\n\
     - 'Montrez-moi un graphique des entretiens par mois'\n\
     - 'Comparez les recruteurs sur les recrutements'"
        .to_owned()
}

fn fallback_message(summary: &AggregateSummary) -> String {
    format!(
        "Je n'ai pas compris votre demande. Voici ce que je peux vous dire:\n\
         - Total candidats contactés: {}\n\
         - Total entretiens: {}\n\
         - Total recrutements: {}\n\n\
         Posez une question plus précise ou demandez de l'aide pour voir ce que je peux faire.",
        format_quantity(summary.contacted),
        format_quantity(summary.interviews),
        format_quantity(summary.recruitments)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::domain::{MonthlySeries, RecruiterTable};
    use std::collections::BTreeMap;

    fn sample_repository() -> KpiRepository {
        let mut x = RecruiterTable::new();
        x.insert(
            Kpi::CandidatesContacted,
            MonthlySeries::new([4.0, 3.0, 3.0], 10.0),
        );
        x.insert(
            Kpi::SalariedRecruitments,
            MonthlySeries::from_months([1.0, 1.0, 0.0]),
        );
        x.insert(Kpi::Interviews, MonthlySeries::from_months([3.0, 1.0, 2.0]));

        let mut y = RecruiterTable::new();
        y.insert(
            Kpi::CandidatesContacted,
            MonthlySeries::new([3.0, 2.0, 2.0], 7.0),
        );
        y.insert(
            Kpi::SalariedRecruitments,
            MonthlySeries::from_months([2.0, 1.0, 0.0]),
        );
        y.insert(
            Kpi::SubcontractorIntegrations,
            MonthlySeries::from_months([0.0, 1.0, 0.0]),
        );

        let mut tables = BTreeMap::new();
        tables.insert("Xavière".to_owned(), x);
        tables.insert("Yasmine".to_owned(), y);
        KpiRepository::from_tables(tables)
    }

    fn respond(input: &str) -> ChatReply {
        let repository = sample_repository();
        let dir = tempfile::tempdir().expect("temp dir");
        let renderer = ChartRenderer::new(dir.path());
        Responder::new(&repository, &renderer).respond(input)
    }

    #[test]
    fn contacted_total_adds_both_recruiters() {
        let reply = respond("quel est le total des candidats contactés");
        assert!(reply.message.contains("17"), "got: {}", reply.message);
        assert!(reply.chart.is_none());
    }

    #[test]
    fn best_recruiter_by_recruitments_is_named_with_value() {
        let reply = respond("qui a fait le plus de recrutements");
        assert!(reply.message.contains("Yasmine"), "got: {}", reply.message);
        assert!(reply.message.contains('4'), "got: {}", reply.message);
    }

    #[test]
    fn greeting_answers_with_the_canned_line() {
        let reply = respond("Bonjour!");
        assert!(reply.message.starts_with("Bonjour!"));
    }

    #[test]
    fn chart_request_without_indicator_prompts_for_a_selection() {
        let reply = respond("montre-moi un graphique");
        assert!(reply.message.contains("Choisissez l'indicateur"));
        assert!(reply.message.contains("Nb d'entretiens"));
        assert!(reply.chart.is_none());
    }

    #[test]
    fn chart_request_with_indicator_renders_a_file() {
        let repository = sample_repository();
        let dir = tempfile::tempdir().expect("temp dir");
        let renderer = ChartRenderer::new(dir.path());
        let reply =
            Responder::new(&repository, &renderer).respond("montre un graphique des entretiens");

        let chart = reply.chart.expect("chart rendered");
        assert!(chart.path.exists());
        assert!(reply.message.contains("Nb d'entretiens"));
    }

    #[test]
    fn comparison_without_data_reports_the_notice() {
        let reply = respond("comparaison des entretiens sous-traitants");
        assert!(
            reply
                .message
                .contains("Aucune donnée disponible pour Nb d'entretiens sous-traitants"),
            "got: {}",
            reply.message
        );
        assert!(reply.chart.is_none());
    }

    #[test]
    fn unknown_question_falls_back_to_the_headline_totals() {
        let reply = respond("quelle heure est-il?");
        assert!(reply.message.contains("Je n'ai pas compris votre demande."));
        assert!(reply.message.contains("Total candidats contactés: 17"));
    }
}

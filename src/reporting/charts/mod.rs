use crate::reporting::domain::{Kpi, Month, RECRUITERS};
use crate::reporting::repository::KpiRepository;
use chrono::Local;
use plotters::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("impossible de préparer le dossier des graphiques: {0}")]
    Io(#[from] std::io::Error),
    #[error("le rendu du graphique a échoué: {0}")]
    Backend(String),
}

/// A chart written to disk, referenced from chat replies.
#[derive(Debug, Clone, Serialize)]
pub struct ChartArtifact {
    pub kpi: Kpi,
    pub indicator: &'static str,
    pub path: PathBuf,
}

/// Renders trend and comparison charts as PNG files under one directory.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Monthly evolution of one indicator, one line per requested recruiter.
    ///
    /// Recruiters missing the indicator are skipped; with no matching data
    /// an empty chart (axes and caption only) is still produced.
    pub fn trend(
        &self,
        repository: &KpiRepository,
        kpi: Kpi,
        recruiters: Option<&[String]>,
    ) -> Result<ChartArtifact, ChartError> {
        let selected: Vec<String> = match recruiters {
            Some(subset) => subset.to_vec(),
            None => RECRUITERS.iter().map(|name| (*name).to_owned()).collect(),
        };

        let series: Vec<(String, [f64; 3])> = selected
            .iter()
            .filter_map(|name| {
                repository
                    .table(name)
                    .and_then(|table| table.get(&kpi))
                    .map(|entry| (name.clone(), entry.months()))
            })
            .collect();

        let path = self.prepare_output("evolution", kpi)?;
        let y_max = series
            .iter()
            .flat_map(|(_, months)| months.iter().copied())
            .fold(0.0_f64, f64::max)
            .max(1.0)
            * 1.1;

        {
            let root = BitMapBackend::new(&path, (1000, 520)).into_drawing_area();
            root.fill(&WHITE).map_err(backend)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    format!("Évolution du {} par mois", kpi.source_label()),
                    ("sans-serif", 24),
                )
                .margin(12)
                .x_label_area_size(40)
                .y_label_area_size(56)
                .build_cartesian_2d(0_i32..2_i32, 0_f64..y_max)
                .map_err(backend)?;

            chart
                .configure_mesh()
                .x_labels(3)
                .x_label_formatter(&|index: &i32| {
                    Month::ordered()
                        .get(*index as usize)
                        .map(|month| month.label().to_owned())
                        .unwrap_or_default()
                })
                .x_desc("Mois")
                .y_desc("Quantité")
                .draw()
                .map_err(backend)?;

            for (index, (name, months)) in series.iter().enumerate() {
                let color = Palette99::pick(index).to_rgba();
                chart
                    .draw_series(LineSeries::new(
                        months
                            .iter()
                            .enumerate()
                            .map(|(month, value)| (month as i32, *value)),
                        color.stroke_width(2),
                    ))
                    .map_err(backend)?
                    .label(name.clone())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                    });

                chart
                    .draw_series(
                        months
                            .iter()
                            .enumerate()
                            .map(|(month, value)| Circle::new((month as i32, *value), 3, color.filled())),
                    )
                    .map_err(backend)?;
            }

            if !series.is_empty() {
                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .draw()
                    .map_err(backend)?;
            }

            root.present().map_err(backend)?;
        }

        Ok(ChartArtifact {
            kpi,
            indicator: kpi.display_label(),
            path,
        })
    }

    /// Quarter totals of one indicator, one bar per recruiter holding it.
    /// Returns `None` when no recruiter carries the indicator.
    pub fn comparison(
        &self,
        repository: &KpiRepository,
        kpi: Kpi,
    ) -> Result<Option<ChartArtifact>, ChartError> {
        let entries: Vec<(String, f64)> = repository
            .tables()
            .iter()
            .filter_map(|(name, table)| {
                table
                    .get(&kpi)
                    .map(|entry| (name.clone(), entry.quarter_total()))
            })
            .collect();

        if entries.is_empty() {
            return Ok(None);
        }

        let path = self.prepare_output("comparaison", kpi)?;
        let y_max = entries
            .iter()
            .map(|(_, value)| *value)
            .fold(0.0_f64, f64::max)
            .max(1.0)
            * 1.1;

        {
            let root = BitMapBackend::new(&path, (1000, 520)).into_drawing_area();
            root.fill(&WHITE).map_err(backend)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    format!(
                        "Comparaison des recruteurs - {} (total trimestre)",
                        kpi.source_label()
                    ),
                    ("sans-serif", 24),
                )
                .margin(12)
                .x_label_area_size(48)
                .y_label_area_size(56)
                .build_cartesian_2d(
                    (0_i32..entries.len() as i32).into_segmented(),
                    0_f64..y_max,
                )
                .map_err(backend)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_label_formatter(&|segment: &SegmentValue<i32>| match segment {
                    SegmentValue::CenterOf(index) => entries
                        .get(*index as usize)
                        .map(|(name, _)| name.clone())
                        .unwrap_or_default(),
                    _ => String::new(),
                })
                .y_desc("Quantité")
                .draw()
                .map_err(backend)?;

            chart
                .draw_series(entries.iter().enumerate().map(|(index, (_, value))| {
                    Rectangle::new(
                        [
                            (SegmentValue::Exact(index as i32), 0.0),
                            (SegmentValue::Exact(index as i32 + 1), *value),
                        ],
                        BLUE.mix(0.6).filled(),
                    )
                }))
                .map_err(backend)?;

            root.present().map_err(backend)?;
        }

        Ok(Some(ChartArtifact {
            kpi,
            indicator: kpi.display_label(),
            path,
        }))
    }

    fn prepare_output(&self, kind: &str, kpi: Kpi) -> Result<PathBuf, ChartError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S%3f");
        let name = format!("{kind}-{}-{stamp}.png", slug(kpi.display_label()));
        Ok(self.output_dir.join(name))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

fn backend<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Backend(err.to_string())
}

fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_owned()
}

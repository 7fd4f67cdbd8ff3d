use crate::config::ReportingConfig;
use crate::reporting::domain::{RecruiterTable, RECRUITERS};
use crate::reporting::workbook::QuarterlyWorkbook;
use serde::Serialize;
use std::collections::BTreeMap;

/// One recruiter whose worksheet could not be loaded. The recruiter is
/// simply absent from every downstream aggregate; there is no retry.
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    pub recruiter: String,
    pub reason: String,
}

/// In-memory store of every recruiter table, built once at process start
/// and handed by reference to the aggregator, responder, and renderer.
#[derive(Debug, Default)]
pub struct KpiRepository {
    tables: BTreeMap<String, RecruiterTable>,
    failures: Vec<LoadFailure>,
}

impl KpiRepository {
    /// Opens the configured workbook once and extracts every configured
    /// recruiter. Individual worksheet failures are recorded and logged;
    /// loading never fails wholesale.
    pub fn load(config: &ReportingConfig) -> Self {
        let mut repository = Self::default();

        let mut workbook = match QuarterlyWorkbook::open(&config.workbook_path) {
            Ok(workbook) => workbook,
            Err(err) => {
                tracing::warn!(
                    path = %config.workbook_path.display(),
                    error = %err,
                    "quarterly workbook could not be opened"
                );
                for recruiter in RECRUITERS {
                    repository.failures.push(LoadFailure {
                        recruiter: recruiter.to_owned(),
                        reason: err.to_string(),
                    });
                }
                return repository;
            }
        };

        for recruiter in RECRUITERS {
            match workbook.extract_sheet(recruiter) {
                Ok(table) => {
                    repository.tables.insert(recruiter.to_owned(), table);
                }
                Err(err) => {
                    tracing::warn!(recruiter, error = %err, "recruiter worksheet skipped");
                    repository.failures.push(LoadFailure {
                        recruiter: recruiter.to_owned(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        repository
    }

    /// Builds a repository directly from tables, bypassing the workbook.
    pub fn from_tables(tables: BTreeMap<String, RecruiterTable>) -> Self {
        Self {
            tables,
            failures: Vec::new(),
        }
    }

    pub fn tables(&self) -> &BTreeMap<String, RecruiterTable> {
        &self.tables
    }

    pub fn table(&self, recruiter: &str) -> Option<&RecruiterTable> {
        self.tables.get(recruiter)
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

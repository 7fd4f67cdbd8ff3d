mod extractor;

use crate::reporting::domain::RecruiterTable;
use calamine::{open_workbook, Range, Reader, Xlsx, XlsxError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Extraction failures for one worksheet. The marker message mirrors the
/// wording surfaced to end users when a recruiter cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("impossible d'ouvrir le classeur: {0}")]
    Open(#[from] XlsxError),
    #[error("feuille '{sheet}' absente du classeur")]
    SheetNotFound { sheet: String },
    #[error("Données RECRUTEMENT non trouvées pour {sheet}")]
    MarkerNotFound { sheet: String },
}

/// One opened quarterly workbook.
///
/// Both the computed-value view and the formula view of a worksheet are
/// loaded once per extraction call and reused for every cell lookup.
pub struct QuarterlyWorkbook {
    inner: Xlsx<BufReader<File>>,
}

impl QuarterlyWorkbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WorkbookError> {
        let inner: Xlsx<_> = open_workbook(path)?;
        Ok(Self { inner })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    /// Extracts the KPI block of one recruiter worksheet.
    pub fn extract_sheet(&mut self, sheet: &str) -> Result<RecruiterTable, WorkbookError> {
        let values = self.inner.worksheet_range(sheet).map_err(|err| match err {
            XlsxError::WorksheetNotFound(_) => WorkbookError::SheetNotFound {
                sheet: sheet.to_owned(),
            },
            other => WorkbookError::Open(other),
        })?;

        let formulas = match self.inner.worksheet_formula(sheet) {
            Ok(range) => range,
            Err(err) => {
                tracing::debug!(sheet, error = %err, "formula view unavailable for worksheet");
                Range::new((0, 0), (0, 0))
            }
        };

        extractor::extract_table(&values, &formulas, sheet)
    }
}

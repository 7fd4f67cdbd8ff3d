use super::WorkbookError;
use crate::reporting::domain::{Kpi, MonthlySeries, RecruiterTable};
use calamine::{Data, Range};

/// Positional anchor for the KPI block inside each recruiter worksheet.
const MARKER: &str = "RECRUTEMENT";

/// 0-indexed worksheet columns: label in B, months in D/I/J, total in K.
const LABEL_COL: u32 = 1;
const MONTH_COLS: [u32; 3] = [3, 8, 9];
const TOTAL_COL: u32 = 10;

/// The KPI block occupies at most 10 rows starting at the marker row.
/// Rows beyond that window are never considered.
const SCAN_ROWS: u32 = 10;

pub(super) fn extract_table(
    values: &Range<Data>,
    formulas: &Range<String>,
    sheet: &str,
) -> Result<RecruiterTable, WorkbookError> {
    let marker_row = find_marker_row(values).ok_or_else(|| WorkbookError::MarkerNotFound {
        sheet: sheet.to_owned(),
    })?;

    let mut table = RecruiterTable::new();

    for row in marker_row..marker_row.saturating_add(SCAN_ROWS) {
        let label = match values.get_value((row, LABEL_COL)) {
            Some(Data::String(raw)) if !raw.trim().is_empty() => raw.trim().to_owned(),
            _ => continue,
        };

        let Some(kpi) = Kpi::from_source_label(&label) else {
            tracing::debug!(sheet, label, "ignoring row with unrecognized indicator label");
            continue;
        };

        let mut months = [0.0_f64; 3];
        for (slot, col) in MONTH_COLS.into_iter().enumerate() {
            months[slot] = resolve_cell(values, formulas, (row, col), sheet).unwrap_or(0.0);
        }

        let monthly_sum: f64 = months.iter().sum();
        let total =
            resolve_cell(values, formulas, (row, TOTAL_COL), sheet).unwrap_or(monthly_sum);

        table.insert(kpi, MonthlySeries::new(months, total));
    }

    Ok(table)
}

/// First row containing the literal marker in any cell, scanning from the top.
fn find_marker_row(values: &Range<Data>) -> Option<u32> {
    let (start_row, _) = values.start()?;
    values.rows().enumerate().find_map(|(offset, row)| {
        let found = row
            .iter()
            .any(|cell| matches!(cell, Data::String(text) if text.contains(MARKER)));
        found.then_some(start_row + offset as u32)
    })
}

/// Numeric value of one cell through the computed-value view.
///
/// Cells whose formula never produced a cached value, empty cells, and
/// non-numeric literals all resolve to `None`; the caller substitutes 0
/// for monthly cells and the monthly sum for the total cell.
fn resolve_cell(
    values: &Range<Data>,
    formulas: &Range<String>,
    position: (u32, u32),
    sheet: &str,
) -> Option<f64> {
    match values.get_value(position) {
        Some(Data::Float(value)) => Some(*value),
        Some(Data::Int(value)) => Some(*value as f64),
        Some(Data::Bool(flag)) => Some(if *flag { 1.0 } else { 0.0 }),
        Some(Data::String(text)) => {
            let trimmed = text.trim();
            if trimmed.starts_with('=') {
                tracing::debug!(sheet, ?position, "formula text leaked into value view");
                return None;
            }
            match trimmed.parse::<f64>() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    tracing::debug!(sheet, ?position, text = trimmed, "non-numeric cell");
                    None
                }
            }
        }
        _ => {
            if has_formula(formulas, position) {
                tracing::debug!(sheet, ?position, "formula cell without a cached value");
            }
            None
        }
    }
}

fn has_formula(formulas: &Range<String>, position: (u32, u32)) -> bool {
    formulas
        .get_value(position)
        .map(|formula| !formula.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::domain::Month;

    fn empty_formulas() -> Range<String> {
        Range::new((0, 0), (0, 0))
    }

    fn sheet_with_marker_at(row: u32) -> Range<Data> {
        let mut values: Range<Data> = Range::new((0, 0), (30, 12));
        values.set_value((row, 0), Data::String(MARKER.to_owned()));
        values
    }

    fn set_kpi_row(values: &mut Range<Data>, row: u32, label: &str, cells: [f64; 4]) {
        values.set_value((row, LABEL_COL), Data::String(label.to_owned()));
        for (slot, col) in MONTH_COLS.into_iter().enumerate() {
            values.set_value((row, col), Data::Float(cells[slot]));
        }
        values.set_value((row, TOTAL_COL), Data::Float(cells[3]));
    }

    #[test]
    fn missing_marker_is_an_error() {
        let values: Range<Data> = Range::new((0, 0), (30, 12));
        let result = extract_table(&values, &empty_formulas(), "Test");
        assert!(matches!(
            result,
            Err(WorkbookError::MarkerNotFound { sheet }) if sheet == "Test"
        ));
    }

    #[test]
    fn verbatim_total_wins_over_recomputed_sum() {
        let mut values = sheet_with_marker_at(2);
        set_kpi_row(&mut values, 3, "Nb de candidats contactés", [4.0, 3.0, 2.0, 10.0]);

        let table = extract_table(&values, &empty_formulas(), "Test").expect("table extracts");
        let series = table[&Kpi::CandidatesContacted];
        assert_eq!(series.months(), [4.0, 3.0, 2.0]);
        assert_eq!(series.quarter_total(), 10.0);
    }

    #[test]
    fn blank_total_falls_back_to_monthly_sum() {
        let mut values = sheet_with_marker_at(2);
        values.set_value(
            (3, LABEL_COL),
            Data::String("Nb de candidats contactés".to_owned()),
        );
        values.set_value((3, MONTH_COLS[0]), Data::Float(5.0));
        values.set_value((3, MONTH_COLS[1]), Data::Float(1.0));
        values.set_value((3, MONTH_COLS[2]), Data::Float(1.0));

        let table = extract_table(&values, &empty_formulas(), "Test").expect("table extracts");
        assert_eq!(table[&Kpi::CandidatesContacted].quarter_total(), 7.0);
    }

    #[test]
    fn formula_cells_without_cached_values_resolve_to_zero() {
        let mut values = sheet_with_marker_at(0);
        values.set_value(
            (1, LABEL_COL),
            Data::String("Nb de candidats contactés".to_owned()),
        );
        values.set_value((1, MONTH_COLS[0]), Data::Float(6.0));
        values.set_value((1, MONTH_COLS[1]), Data::Float(2.0));

        let mut formulas: Range<String> = Range::new((0, 0), (30, 12));
        formulas.set_value((1, MONTH_COLS[2]), "SUM(J2:J4)".to_owned());
        formulas.set_value((1, TOTAL_COL), "SUM(D2:J2)".to_owned());

        let table = extract_table(&values, &formulas, "Test").expect("table extracts");
        let series = table[&Kpi::CandidatesContacted];
        assert_eq!(series.month(Month::Septembre), 0.0);
        assert_eq!(series.quarter_total(), 8.0);
    }

    #[test]
    fn rows_with_empty_labels_are_skipped_without_shrinking_the_window() {
        let mut values = sheet_with_marker_at(2);
        // rows 4..=6 blank on purpose, a valid row near the end of the window
        set_kpi_row(&mut values, 11, "Nb d'entretiens", [1.0, 1.0, 1.0, 3.0]);
        // one row past the 10-row window, must be ignored
        set_kpi_row(&mut values, 12, "Nb de recrutements", [9.0, 9.0, 9.0, 27.0]);

        let table = extract_table(&values, &empty_formulas(), "Test").expect("table extracts");
        assert!(table.contains_key(&Kpi::Interviews));
        assert!(!table.contains_key(&Kpi::Recruitments));
    }

    #[test]
    fn unrecognized_labels_are_dropped_at_the_boundary() {
        let mut values = sheet_with_marker_at(2);
        set_kpi_row(&mut values, 3, "Commentaires", [1.0, 2.0, 3.0, 6.0]);

        let table = extract_table(&values, &empty_formulas(), "Test").expect("table extracts");
        assert!(table.is_empty());
    }

    #[test]
    fn non_numeric_literals_resolve_to_zero() {
        let mut values = sheet_with_marker_at(2);
        values.set_value(
            (3, LABEL_COL),
            Data::String("Nb de candidats contactés".to_owned()),
        );
        values.set_value((3, MONTH_COLS[0]), Data::String("n/a".to_owned()));
        values.set_value((3, MONTH_COLS[1]), Data::Float(2.0));

        let table = extract_table(&values, &empty_formulas(), "Test").expect("table extracts");
        let series = table[&Kpi::CandidatesContacted];
        assert_eq!(series.months(), [0.0, 2.0, 0.0]);
        assert_eq!(series.quarter_total(), 2.0);
    }
}

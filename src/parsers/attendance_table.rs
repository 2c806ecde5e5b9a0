use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceDetail;
use crate::parsers::html::{attr, element_by_id, first_input, has_flag, has_no_records_notice, rows};
use crate::sge::endpoints::diary;

/// Parses the per-student attendance table.
///
/// Each data row carries a checkbox whose `value` is the record identifier used to
/// edit that presence later, `data-aluno` with the student id, and `checked` when
/// the student is present. Rows without a checkbox (headers, totals) are skipped.
///
/// # Returns
///
/// The rows in page order. An empty list when SGE shows its "no records" notice;
/// `AppError::Protocol` when the table is missing otherwise.
pub fn parse_attendance_detail(html: &str) -> Result<Vec<AttendanceDetail>> {
    let Some(table) = element_by_id(html, "table", diary::ATTENDANCE_TABLE_ID) else {
        if has_no_records_notice(html) {
            return Ok(Vec::new());
        }
        return Err(AppError::Protocol(format!(
            "attendance table '{}' not found",
            diary::ATTENDANCE_TABLE_ID
        )));
    };

    let details = rows(table)
        .into_iter()
        .filter_map(|row| {
            let input = row.cells.iter().find_map(|cell| first_input(cell.inner))?;

            let record_id = attr(input, "value")?.trim().to_string();
            if record_id.is_empty() {
                return None;
            }

            let student_id = attr(input, "data-aluno")
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty());

            // The name is the first text cell that is not the call number.
            let student_name = row
                .cells
                .iter()
                .filter(|cell| first_input(cell.inner).is_none())
                .map(|cell| cell.text())
                .find(|text| !text.is_empty() && !text.chars().all(|c| c.is_ascii_digit()))
                .unwrap_or_default();

            Some(AttendanceDetail {
                student_id,
                student_name,
                present: has_flag(input, "checked"),
                record_id,
            })
        })
        .collect();

    Ok(details)
}

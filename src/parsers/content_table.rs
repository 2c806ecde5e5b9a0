use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::content::ContentEntry;
use crate::parsers::html::{element_by_id, has_no_records_notice, rows};
use crate::sge::endpoints::diary;
use crate::validation::dates::legacy_date_lenient;

/// Matches `editarConteudo(4412)` / `editarConteudo('4412')` and captures the id.
static HANDLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"{}\s*\(\s*['"]?([A-Za-z0-9_-]+)['"]?\s*\)"#,
        regex::escape(diary::CONTENT_ROW_HANDLER)
    ))
    .expect("valid content handler regex")
});

/// Parses the lesson content table.
///
/// Unlike the attendance table, rows carry their identifier in an inline
/// `onclick` handler rather than in an input. Cells are date, period and text.
///
/// # Returns
///
/// The entries in page order. An empty list when SGE shows its "no records"
/// notice; `AppError::Protocol` when the table is missing otherwise.
pub fn parse_content_entries(html: &str) -> Result<Vec<ContentEntry>> {
    let Some(table) = element_by_id(html, "table", diary::CONTENT_TABLE_ID) else {
        if has_no_records_notice(html) {
            return Ok(Vec::new());
        }
        return Err(AppError::Protocol(format!(
            "content table '{}' not found",
            diary::CONTENT_TABLE_ID
        )));
    };

    let entries = rows(table)
        .into_iter()
        .filter_map(|row| {
            let id = HANDLER_RE
                .captures(row.attrs)
                .or_else(|| HANDLER_RE.captures(row.inner))?
                .get(1)?
                .as_str()
                .to_string();

            if row.cells.len() < 3 {
                tracing::warn!("⚠️  Content row {} has {} cells, skipping", id, row.cells.len());
                return None;
            }

            Some(ContentEntry {
                id,
                date: legacy_date_lenient(&row.cells[0].text()),
                period: row.cells[1]
                    .text()
                    .trim_end_matches(|c: char| !c.is_ascii_digit())
                    .parse()
                    .ok(),
                text: row.cells[2].text(),
            })
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_ids_from_row_handlers() {
        let html = r#"
            <table id="tabelaConteudo">
              <thead><tr><th>Data</th><th>Aula</th><th>Conteúdo</th><th></th></tr></thead>
              <tr onclick="editarConteudo(4412)">
                <td>10/03/2026</td><td>3</td><td>Frações &amp; decimais</td><td></td>
              </tr>
              <tr>
                <td>11/03/2026</td><td>1ª</td><td>Revisão</td>
                <td><a href="javascript:void(0)" onclick="editarConteudo('4413')">Editar</a></td>
              </tr>
            </table>"#;

        let entries = parse_content_entries(html).unwrap();
        assert_eq!(
            entries,
            vec![
                ContentEntry {
                    id: "4412".into(),
                    date: Some("2026-03-10".into()),
                    period: Some(3),
                    text: "Frações & decimais".into(),
                },
                ContentEntry {
                    id: "4413".into(),
                    date: Some("2026-03-11".into()),
                    period: Some(1),
                    text: "Revisão".into(),
                },
            ]
        );
    }

    #[test]
    fn no_records_notice_is_empty() {
        assert!(parse_content_entries("<p>NENHUM REGISTRO ENCONTRADO</p>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_table_is_protocol_error() {
        assert!(matches!(
            parse_content_entries("<table id='outra'></table>"),
            Err(AppError::Protocol(_))
        ));
    }
}

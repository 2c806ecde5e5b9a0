use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::attendance::ClassOption;
use crate::parsers::html::{attr, element_by_id, text_content};

static OPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<option\b([^>]*)>(.*?)</option\s*>").expect("valid option regex"));

/// Reads the options of the `<select id="select_id">` on a page.
///
/// Placeholder options (empty value, e.g. "Selecione...") are skipped.
///
/// # Returns
///
/// The options in page order, or `AppError::Protocol` when the page has no such select.
pub fn parse_select_options(html: &str, select_id: &str) -> Result<Vec<ClassOption>> {
    let select = element_by_id(html, "select", select_id).ok_or_else(|| {
        AppError::Protocol(format!("select '{}' not found on page", select_id))
    })?;

    let options = OPTION_RE
        .captures_iter(select)
        .filter_map(|caps| {
            let id = attr(&caps[1], "value")?.trim().to_string();
            if id.is_empty() {
                return None;
            }
            Some(ClassOption {
                id,
                label: text_content(&caps[2]),
            })
        })
        .collect();

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_placeholders_and_decodes_labels() {
        let html = r#"
            <form>
              <select id="turma" name="turma" onchange="carregar()">
                <option value="">Selecione...</option>
                <option value="1203" selected>7&ordm; ANO A - MATUTINO</option>
                <option value='1204'>8&ordm; ANO B</option>
              </select>
            </form>"#;

        let options = parse_select_options(html, "turma").unwrap();
        assert_eq!(
            options,
            vec![
                ClassOption {
                    id: "1203".into(),
                    label: "7º ANO A - MATUTINO".into()
                },
                ClassOption {
                    id: "1204".into(),
                    label: "8º ANO B".into()
                },
            ]
        );
    }

    #[test]
    fn empty_select_is_empty_list() {
        let html = r#"<select id="turma"><option value="">Nenhuma turma</option></select>"#;
        assert!(parse_select_options(html, "turma").unwrap().is_empty());
    }

    #[test]
    fn missing_select_is_protocol_error() {
        assert!(matches!(
            parse_select_options("<html><body>manutenção</body></html>", "turma"),
            Err(AppError::Protocol(_))
        ));
    }
}

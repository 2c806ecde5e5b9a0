//! Defensive readers for SGE's loosely-structured JSON.
//!
//! The same field can arrive as a string or a number, under one of several keys,
//! and lists are sometimes wrapped in an object.

use sonic_rs::{JsonContainerTrait, JsonValueTrait, Value};

use crate::error::{AppError, Result};
use crate::models::attendance::{RosterEntry, SubjectOption};
use crate::sge::client::snippet;

/// Reads the first present, non-empty field among `keys` as a string.
pub fn field_string(object: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(loose_string)
}

/// A scalar as a trimmed string; numbers are formatted without a fraction when integral.
pub fn loose_string(value: &Value) -> Option<String> {
    let text = if let Some(s) = value.as_str() {
        s.trim().to_string()
    } else if let Some(n) = value.as_u64() {
        n.to_string()
    } else if let Some(n) = value.as_i64() {
        n.to_string()
    } else if let Some(n) = value.as_f64() {
        if !n.is_finite() {
            return None;
        }
        if n.fract() == 0.0 {
            // -0.0 would format as "-0".
            if n == 0.0 { "0".to_string() } else { format!("{:.0}", n) }
        } else {
            n.to_string()
        }
    } else {
        return None;
    };

    (!text.is_empty()).then_some(text)
}

/// The list inside a response: the value itself when it is an array, otherwise the
/// first array found under one of `wrappers`.
pub fn list_items<'a>(value: &'a Value, wrappers: &[&str]) -> Option<Vec<&'a Value>> {
    if let Some(array) = value.as_array() {
        return Some(array.iter().collect());
    }

    wrappers
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|inner| inner.as_array())
        .map(|array| array.iter().collect())
}

/// Parses the subject list of a class.
///
/// Accepts `[{"id": .., "nome": ..}]`, the same wrapped in `{"disciplinas": [...]}`,
/// or an `{"<id>": "<name>"}` map. Anything that is not JSON counts as no subjects:
/// SGE answers an empty class with an HTML fragment.
pub fn parse_subjects(body: &str) -> Vec<SubjectOption> {
    let trimmed = body.trim();
    let value: Value = match sonic_rs::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => {
            if !trimmed.is_empty() {
                tracing::debug!("Subject list was not JSON, treating as empty: {:?}", snippet(trimmed));
            }
            return Vec::new();
        }
    };

    if let Some(items) = list_items(&value, &["disciplinas", "dados"]) {
        return items
            .into_iter()
            .filter_map(|item| {
                Some(SubjectOption {
                    id: field_string(item, &["id", "codigo", "cod_disciplina"])?,
                    name: field_string(item, &["nome", "descricao", "disciplina"])
                        .unwrap_or_default(),
                })
            })
            .collect();
    }

    match value.as_object() {
        Some(map) => map
            .iter()
            .filter_map(|(id, name)| {
                let id = id.trim();
                if id.is_empty() {
                    return None;
                }
                Some(SubjectOption {
                    id: id.to_string(),
                    name: loose_string(name).unwrap_or_default(),
                })
            })
            .collect(),
        None => Vec::new(),
    }
}

/// Maps the roster JSON of a class.
///
/// # Returns
///
/// The students in SGE's order, or `AppError::Protocol` when the value holds no list.
pub fn roster_from_json(value: &Value) -> Result<Vec<RosterEntry>> {
    let items = list_items(value, &["alunos", "dados"])
        .ok_or_else(|| AppError::Protocol("roster response holds no student list".to_string()))?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let student_id = field_string(item, &["id", "cod_aluno", "codigo"])?;
            Some(RosterEntry {
                student_id,
                name: field_string(item, &["nome", "aluno"]).unwrap_or_default(),
                call_number: field_string(item, &["numero", "num_chamada"])
                    .and_then(|n| n.parse().ok()),
                status: field_string(item, &["situacao", "status"]),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_from_array_with_mixed_id_types() {
        let subjects =
            parse_subjects(r#"[{"id": 31, "nome": "MATEMÁTICA"}, {"codigo": "32", "descricao": "HISTÓRIA"}]"#);
        assert_eq!(
            subjects,
            vec![
                SubjectOption {
                    id: "31".into(),
                    name: "MATEMÁTICA".into()
                },
                SubjectOption {
                    id: "32".into(),
                    name: "HISTÓRIA".into()
                },
            ]
        );
    }

    #[test]
    fn subjects_from_map_and_wrapper() {
        let from_map = parse_subjects(r#"{"31": "MATEMÁTICA"}"#);
        assert_eq!(from_map.len(), 1);
        assert_eq!(from_map[0].id, "31");

        let wrapped = parse_subjects(r#"{"disciplinas": [{"id": "7", "nome": "ARTE"}]}"#);
        assert_eq!(wrapped[0].name, "ARTE");
    }

    #[test]
    fn non_json_subjects_are_empty() {
        assert!(parse_subjects("<option value=''>Nenhuma disciplina</option>").is_empty());
        assert!(parse_subjects("").is_empty());
    }

    #[test]
    fn integral_floats_keep_every_digit() {
        let value: Value = sonic_rs::from_str("[31.0, 1e20, -0.0, 2.5]").unwrap();
        let texts: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(loose_string)
            .collect();
        assert_eq!(
            texts,
            vec![
                Some("31".to_string()),
                Some("100000000000000000000".to_string()),
                Some("0".to_string()),
                Some("2.5".to_string()),
            ]
        );
    }

    #[test]
    fn roster_reads_loose_fields() {
        let value: Value = sonic_rs::from_str(
            r#"{"alunos": [
                {"cod_aluno": 501, "nome": "ANA", "numero": "1", "situacao": "MATRICULADO"},
                {"id": "502", "nome": "BRUNO"},
                {"nome": "SEM CODIGO"}
            ]}"#,
        )
        .unwrap();

        let roster = roster_from_json(&value).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].student_id, "501");
        assert_eq!(roster[0].call_number, Some(1));
        assert_eq!(roster[0].status.as_deref(), Some("MATRICULADO"));
        assert_eq!(roster[1].call_number, None);
    }

    #[test]
    fn roster_without_list_is_protocol_error() {
        let value: Value = sonic_rs::from_str(r#"{"erro": "turma inválida"}"#).unwrap();
        assert!(matches!(roster_from_json(&value), Err(AppError::Protocol(_))));
    }
}

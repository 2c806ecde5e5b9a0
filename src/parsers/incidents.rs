use sonic_rs::{JsonContainerTrait, JsonValueTrait, Value};

use crate::error::{AppError, Result};
use crate::models::incident::{IncidentBuckets, IncidentRecord, IncidentStatus, StatusChange};
use crate::parsers::json::{field_string, list_items};
use crate::validation::dates::legacy_date_lenient;

/// Maps one incident object. `None` when it has no usable id or an unknown status.
pub fn incident_from_json(item: &Value) -> Option<IncidentRecord> {
    let Some(id) = field_string(item, &["codigo", "id"]).and_then(|id| id.parse::<u64>().ok()) else {
        tracing::warn!("⚠️  Skipping incident without a numeric id");
        return None;
    };

    let code = field_string(item, &["situacao", "status"]).unwrap_or_default();
    let Some(status) = IncidentStatus::from_legacy_code(&code) else {
        tracing::warn!("⚠️  Skipping incident {} with unknown status {:?}", id, code);
        return None;
    };

    let approval = field_string(item, &["aprovado_por"]).map(|by| StatusChange {
        by,
        at: field_string(item, &["data_aprovacao"]).and_then(|d| legacy_date_lenient(&d)),
        reason: None,
    });

    let cancellation = field_string(item, &["cancelado_por"]).map(|by| StatusChange {
        by,
        at: field_string(item, &["data_cancelamento"]).and_then(|d| legacy_date_lenient(&d)),
        reason: field_string(item, &["motivo_cancelamento", "motivo"]),
    });

    Some(IncidentRecord {
        id,
        student_id: field_string(item, &["cod_aluno", "aluno"]).unwrap_or_default(),
        student_name: field_string(item, &["nome_aluno"]),
        class_id: field_string(item, &["turma", "cod_turma"]),
        date: field_string(item, &["data"]).and_then(|d| legacy_date_lenient(&d)),
        kind: field_string(item, &["tipo"]),
        description: field_string(item, &["descricao"]).unwrap_or_default(),
        status,
        approval,
        cancellation,
    })
}

/// Parses the single-incident response. Empty bodies, `null`, `[]` and `{}` mean not found.
pub fn parse_incident(body: &str) -> Result<Option<IncidentRecord>> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = sonic_rs::from_str(trimmed)
        .map_err(|e| AppError::Protocol(format!("incident response is not JSON: {}", e)))?;

    let item = match value.as_array() {
        Some(array) => match array.iter().next() {
            Some(first) => first.clone(),
            None => return Ok(None),
        },
        None if value.is_null() => return Ok(None),
        None => value,
    };

    if item.as_object().is_some_and(|object| object.is_empty()) {
        return Ok(None);
    }

    Ok(incident_from_json(&item))
}

/// Partitions the full incident list into lifecycle buckets.
pub fn incidents_from_json(value: &Value) -> Result<IncidentBuckets> {
    let items = list_items(value, &["ocorrencias", "dados"])
        .ok_or_else(|| AppError::Protocol("incident list response holds no list".to_string()))?;

    let mut buckets = IncidentBuckets::default();
    for record in items.into_iter().filter_map(incident_from_json) {
        buckets.push(record);
    }
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"[
        {"codigo": "71", "cod_aluno": "501", "nome_aluno": "ANA", "turma": "1203",
         "data": "10/03/2026", "tipo": "INDISCIPLINA", "descricao": "Uso de celular", "situacao": "P"},
        {"codigo": 72, "cod_aluno": 502, "data": "11/03/2026", "descricao": "Atraso",
         "situacao": "A", "aprovado_por": "COORDENAÇÃO", "data_aprovacao": "12/03/2026 09:10"},
        {"codigo": 73, "cod_aluno": 503, "descricao": "Duplicada", "situacao": "C",
         "cancelado_por": "DIREÇÃO", "motivo_cancelamento": "registro em duplicidade"},
        {"codigo": 74, "cod_aluno": 504, "descricao": "?", "situacao": "X"}
    ]"#;

    #[test]
    fn partitions_by_status() {
        let value: Value = sonic_rs::from_str(LIST).unwrap();
        let buckets = incidents_from_json(&value).unwrap();

        assert_eq!(buckets.open.len(), 1);
        assert_eq!(buckets.approved.len(), 1);
        assert_eq!(buckets.cancelled.len(), 1);
        assert_eq!(buckets.len(), 3);

        let open = &buckets.open[0];
        assert_eq!(open.id, 71);
        assert_eq!(open.date.as_deref(), Some("2026-03-10"));
        assert_eq!(open.kind.as_deref(), Some("INDISCIPLINA"));

        let approval = buckets.approved[0].approval.as_ref().unwrap();
        assert_eq!(approval.by, "COORDENAÇÃO");
        assert_eq!(approval.at.as_deref(), Some("2026-03-12"));

        let cancellation = buckets.cancelled[0].cancellation.as_ref().unwrap();
        assert_eq!(cancellation.reason.as_deref(), Some("registro em duplicidade"));
    }

    #[test]
    fn single_incident_shapes() {
        assert_eq!(parse_incident("").unwrap(), None);
        assert_eq!(parse_incident("null").unwrap(), None);
        assert_eq!(parse_incident("[]").unwrap(), None);
        assert_eq!(parse_incident("{}").unwrap(), None);

        let record = parse_incident(r#"[{"codigo": 71, "cod_aluno": "501", "descricao": "x"}]"#)
            .unwrap()
            .unwrap();
        assert_eq!(record.id, 71);
        assert_eq!(record.status, IncidentStatus::Open);

        assert!(matches!(parse_incident("<html>"), Err(AppError::Protocol(_))));
    }
}

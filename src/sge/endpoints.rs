//! Paths and form field names of the legacy SGE scripts.

/// Login script. Answers `"0"` on success and sets `PHPSESSID`.
pub const LOGIN: &str = "/flogin.php";
/// Body of a successful login.
pub const LOGIN_SUCCESS_BODY: &str = "0";
/// Name of the PHP session cookie.
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Fragments that show up when SGE serves its login redirect instead of the page
/// that was asked for. Compared lowercase with whitespace removed.
pub const SESSION_EXPIRED_MARKERS: &[&str] = &[
    "window.location='index.php'",
    "window.location.href='index.php'",
    "window.location=\"index.php\"",
    "window.location.href=\"index.php\"",
    "top.location.href='../index.php'",
    "top.location.href='../../index.php'",
    "name=\"user_password\"",
    "sessãoexpirada",
];

/// Notice SGE renders instead of an empty table.
pub const NO_RECORDS_MARKER: &str = "nenhum registro encontrado";

pub mod diary {
    /// Attendance page carrying the class dropdown.
    pub const ATTENDANCE_PAGE: &str = "/modulos/diario/frequencia.php";
    /// `id` of the class `<select>` on the attendance page.
    pub const CLASS_SELECT_ID: &str = "turma";
    /// Subjects of a class, loosely-structured JSON.
    pub const SUBJECTS: &str = "/modulos/diario/ajax/disciplinas.php";
    /// Class roster, JSON.
    pub const ROSTER: &str = "/modulos/diario/ajax/alunos.php";
    /// Saves a class period's attendance.
    pub const ATTENDANCE_SAVE: &str = "/modulos/diario/acoes/salvar_frequencia.php";
    /// Changes one student's presence.
    pub const ATTENDANCE_EDIT: &str = "/modulos/diario/acoes/alterar_frequencia.php";
    /// Deletes a whole day of attendance.
    pub const ATTENDANCE_DELETE: &str = "/modulos/diario/acoes/excluir_frequencia.php";
    /// Per-student attendance table.
    pub const ATTENDANCE_DETAIL: &str = "/modulos/diario/frequencia_detalhe.php";
    /// `id` of the attendance detail `<table>`.
    pub const ATTENDANCE_TABLE_ID: &str = "tabelaFrequencia";

    /// Saves a lesson content entry.
    pub const CONTENT_SAVE: &str = "/modulos/diario/acoes/salvar_conteudo.php";
    /// Lists lesson content entries as an HTML table.
    pub const CONTENT_LIST: &str = "/modulos/diario/conteudos.php";
    /// Edits a lesson content entry.
    pub const CONTENT_EDIT: &str = "/modulos/diario/acoes/alterar_conteudo.php";
    /// Deletes a lesson content entry.
    pub const CONTENT_DELETE: &str = "/modulos/diario/acoes/excluir_conteudo.php";
    /// `id` of the content `<table>`.
    pub const CONTENT_TABLE_ID: &str = "tabelaConteudo";
    /// JavaScript function each content row calls with its identifier.
    pub const CONTENT_ROW_HANDLER: &str = "editarConteudo";
}

pub mod incidents {
    /// Creates (`codigo=0`) or updates an incident.
    pub const SAVE: &str = "/modulos/ocorrencias/acoes/salvar_ocorrencia.php";
    /// One incident as JSON.
    pub const GET: &str = "/modulos/ocorrencias/ajax/ocorrencia.php";
    /// Changes an incident's status.
    pub const SET_STATUS: &str = "/modulos/ocorrencias/acoes/situacao_ocorrencia.php";
    /// Every incident visible to the user, JSON.
    pub const LIST: &str = "/modulos/ocorrencias/ajax/ocorrencias.php";
}

pub mod reports {
    /// Daily attendance detail.
    pub const DAILY: &str = "/modulos/relatorios/frequencia_diaria.php";
    /// Monthly attendance detail.
    pub const MONTHLY: &str = "/modulos/relatorios/frequencia_mensal.php";
    /// Class diary.
    pub const CLASS_DIARY: &str = "/modulos/relatorios/diario_classe.php";
    /// Content taught over a date range.
    pub const CONTENT_SUMMARY: &str = "/modulos/relatorios/conteudos.php";
    /// Absences over a date range.
    pub const ABSENCE_SUMMARY: &str = "/modulos/relatorios/faltas_periodo.php";
    /// One student's attendance history.
    pub const STUDENT_ATTENDANCE: &str = "/modulos/relatorios/frequencia_aluno.php";
    /// Incidents over a date range.
    pub const INCIDENT_SUMMARY: &str = "/modulos/relatorios/ocorrencias.php";
}

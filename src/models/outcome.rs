use serde::Serialize;

/// Result of a legacy write endpoint.
///
/// SGE answers writes with a plain-text body: `"0"` on success, an error
/// message otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Whether SGE accepted the write.
    pub success: bool,
    /// The raw message SGE returned when it did not.
    pub message: Option<String>,
}

impl WriteOutcome {
    /// Interprets a legacy write response body.
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        if trimmed == "0" {
            Self {
                success: true,
                message: None,
            }
        } else {
            Self {
                success: false,
                message: Some(trimmed.to_string()),
            }
        }
    }

    /// Logs the verdict. SGE's message is user-facing text, never a credential.
    pub fn log(&self, action: &str) {
        match &self.message {
            None => tracing::info!("✅ SGE accepted {}", action),
            Some(message) => tracing::warn!("⚠️  SGE rejected {}: {}", action, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert_eq!(
            WriteOutcome::from_body(" 0\n"),
            WriteOutcome { success: true, message: None }
        );
    }

    #[test]
    fn anything_else_is_a_failure_with_message() {
        let outcome = WriteOutcome::from_body("Erro: aula já lançada");
        assert!(!outcome.success);
        assert_eq!(outcome.message.as_deref(), Some("Erro: aula já lançada"));
    }
}

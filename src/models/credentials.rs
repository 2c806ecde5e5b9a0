use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// SGE login credentials.
///
/// `Debug` never prints the password, and the user only in masked form.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// The SGE user identifier (normalized to digits before use).
    pub user: String,
    /// The SGE password.
    pub password: String,
}

impl Credentials {
    /// Creates a new `Credentials`.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits: String = self.user.chars().filter(|c| c.is_ascii_digit()).collect();
        f.debug_struct("Credentials")
            .field("user", &crate::validation::auth::mask_user(&digits))
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts() {
        let creds = Credentials::new("111.222.333-44", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("11122233344"));
        assert!(printed.contains("344"));
    }
}

use serde::{Deserialize, Serialize};

// Signed-in admin session record stored in memory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminSession {
    pub email: String,
    pub session_id: String,
    pub expires_at: u64,
}

// The single admin account allowed to manage guests.
// A missing password disables sign-in entirely.
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub email: String,
    pub password: Option<String>,
}

impl AdminCredentials {
    pub fn matches(&self, email: &str, password: &str) -> bool {
        match &self.password {
            Some(expected) => {
                self.email.eq_ignore_ascii_case(email.trim()) && expected.as_str() == password
            }
            None => false,
        }
    }
}

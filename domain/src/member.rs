use serde_json::{Value, json};

/// Login page fields.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember: bool,
}

/// Registration page fields.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub occupation: String,
    pub company: String,
    pub agree_terms: bool,
    pub subscribe_newsletter: bool,
}

impl RegisterForm {
    /// Profile metadata attached to the auth record at sign-up.
    pub fn metadata(&self) -> Value {
        json!({
            "full_name": self.name,
            "phone": self.phone,
            "occupation": self.occupation,
            "company": self.company,
        })
    }

    /// Row for the `members` table, written best-effort after sign-up.
    pub fn member_record(&self, user_id: &str) -> Value {
        json!({
            "id": user_id,
            "email": self.email,
            "full_name": self.name,
            "phone": self.phone,
            "occupation": self.occupation,
            "company": self.company,
        })
    }
}

/// A signed-in member as reported by the backend (hosted or fallback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

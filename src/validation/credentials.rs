use crate::core::error::ValidationErrors;
use crate::models::account::{LoginRequest, RegisterRequest};

const MIN_PASSWORD_LEN: usize = 6;

/// Loose structural email check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    // dotted domain with no empty labels
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn check_login_fields(email: &str, password: &str, errors: &mut ValidationErrors) {
    if !is_valid_email(email) {
        errors.push("email", "Email is required");
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push("password", "Password with 6 or more characters is required");
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_login_fields(&self.email, &self.password, &mut errors);
        errors.into_result(self)
    }
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.first_name.trim().is_empty() {
            errors.push("firstName", "First Name is required");
        }

        if self.last_name.trim().is_empty() {
            errors.push("lastName", "Last Name is required");
        }

        check_login_fields(&self.email, &self.password, &mut errors);
        errors.into_result(self)
    }
}

use serde::{Deserialize, Serialize};

use crate::types::validation::{self, ValidationError};
use crate::util::Sensitive;

/// Every field is optional; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Request {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Sensitive<String>>,
    pub roles: Option<Vec<String>>,
}

impl Request {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::builder();
        if let Some(name) = self.name.as_deref() {
            validation::validate_name(&mut errors, "name", name);
        }

        if let Some(email) = self.email.as_deref() {
            validation::validate_email(&mut errors, "email", email);
        }

        if self.password.as_ref().is_some_and(|v| v.is_empty()) {
            errors.insert("password", "password must not be empty");
        }

        if let Some(roles) = self.roles.as_deref() {
            validation::validate_roles(&mut errors, "roles", roles);
        }

        errors.build().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_is_valid() {
        let form: Request = serde_json::from_str("{}").unwrap();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let form = Request {
            name: Some(String::new()),
            email: Some("not an email".into()),
            password: Some("".into()),
            roles: None,
        };

        let error = form.validate().unwrap_err();
        assert!(error.has_field("name"));
        assert!(error.has_field("email"));
        assert!(error.has_field("password"));
    }
}

use serde::{Deserialize, Serialize};

use crate::types::validation::{self, ValidationError};
use crate::util::Sensitive;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Request {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub password: Sensitive<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Request {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::builder();
        if self.name.is_empty() {
            errors.insert("name", validation::REQUIRED);
        } else {
            validation::validate_name(&mut errors, "name", &self.name);
        }

        if let Some(email) = self.email.as_deref() {
            validation::validate_email(&mut errors, "email", email);
        }

        if self.password.is_empty() {
            errors.insert("password", validation::REQUIRED);
        }

        validation::validate_roles(&mut errors, "roles", &self.roles);
        errors.build().into_result()
    }
}

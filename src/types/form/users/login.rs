use serde::{Deserialize, Serialize};

use crate::util::Sensitive;

/// Missing fields deserialize as empty strings so that the credential
/// verifier reports them as field errors instead of a parse failure.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default, alias = "username_or_email")]
    pub username_or_email: Sensitive<String>,
    #[serde(default)]
    pub password: Sensitive<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response {
    pub jwt: Sensitive<String>,
}

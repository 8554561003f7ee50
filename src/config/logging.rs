use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Logging {
    /// How log lines are formatted.
    ///
    /// **Environment variables**:
    /// - `DOGGO_LOGGING_STYLE`
    #[serde(default)]
    pub style: LoggingStyle,
    /// Log filter directives, same syntax as `RUST_LOG`. `RUST_LOG`
    /// takes over if it is set.
    ///
    /// **Environment variables**:
    /// - `DOGGO_LOGGING_TARGETS`
    pub targets: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingStyle {
    Compact,
    #[default]
    Full,
    Pretty,
}

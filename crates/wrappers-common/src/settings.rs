use std::fmt;

#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub flux: FluxSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Used instead of the login name where a tool defaults to "my jobs"
    #[serde(default)]
    pub default_user: Option<String>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct FluxSettings {
    /// The scheduler's command line client
    #[serde(default = "default_flux_command")]
    pub command: String,
}

impl Default for FluxSettings {
    fn default() -> Self {
        Self {
            command: default_flux_command(),
        }
    }
}

fn default_flux_command() -> String {
    "flux".to_string()
}

#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Bare messages, like the legacy tools
    #[default]
    Plain,
    /// Bunyan JSON lines
    Json,
}

#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct LoggingSettings {
    #[serde(default)]
    pub format: LogFormat,
}

impl Settings {
    /// The configured default user, falling back to `login`.
    pub fn resolve_user(&self, login: impl FnOnce() -> String) -> String {
        self.default_user.clone().unwrap_or_else(login)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Settings:\n  Flux:\n{}\n  Logging:\n{}\n  Default user: {}",
            self.flux,
            self.logging,
            self.default_user.as_deref().unwrap_or("<login>")
        )
    }
}

impl fmt::Display for FluxSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "    Command: {}", self.command)
    }
}

impl fmt::Display for LoggingSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "    Format: {:?}", self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.flux.command, "flux");
        assert_eq!(settings.logging.format, LogFormat::Plain);
        assert_eq!(settings.resolve_user(|| "login".to_string()), "login");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Settings::default().to_string(),
            "Settings:\n  Flux:\n    Command: flux\n  Logging:\n    Format: Plain\n  Default user: <login>"
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let settings: Settings =
            serde_json::from_str(r#"{"logging": {"format": "json"}, "default_user": "ops"}"#)
                .unwrap();
        assert_eq!(settings.flux.command, "flux");
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.resolve_user(|| "login".to_string()), "ops");
    }
}

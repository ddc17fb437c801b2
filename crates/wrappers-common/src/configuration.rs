use config::ConfigError;
use serde::de::DeserializeOwned;
use std::convert::TryInto;
use std::env;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "FLUX_WRAPPERS";
const DEFAULT_CONFIG_DIR: &str = "/etc/flux-wrappers";

/// Load settings from `$FLUX_WRAPPERS_CONFIG_DIR` (or `/etc/flux-wrappers`),
/// then apply environment overrides. Missing files are not an error.
pub fn get_configuration<T: DeserializeOwned>() -> Result<T, ConfigError> {
    let configuration_directory = env::var(format!("{ENV_PREFIX}_CONFIG_DIR"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

    let environment: Environment = env::var(format!("{ENV_PREFIX}_ENVIRONMENT"))
        .unwrap_or_else(|_| "production".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    get_configuration_from(&configuration_directory, environment)
}

pub fn get_configuration_from<T: DeserializeOwned>(
    configuration_directory: &Path,
    environment: Environment,
) -> Result<T, ConfigError> {
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        // FLUX_WRAPPERS_FLUX__COMMAND=/opt/flux/bin/flux sets flux.command
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<T>()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
    CI,
}

impl Environment {
    /// Convert the enum instance to a static string reference.
    ///
    /// # Returns
    ///
    /// This method returns a static string slice that corresponds to the variant of the `Environment` enum.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
            Environment::CI => "ci",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    /// Case insensitive; only "local", "ci" and "production" are accepted.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            "ci" => Ok(Self::CI),
            other => Err(format!(
                "{} is not a supported environment. Use either `local`, `ci` or `production`.",
                other
            )),
        }
    }
}

use crate::engine::field::SetNodeOptions;
use crate::errors::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

/// A boolean switch read from the environment.
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off` in any case.
/// An empty value is rejected so that a variable set to nothing is noticed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoolFlag(bool);

impl TryFrom<String> for BoolFlag {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Self(true)),
            "false" | "0" | "no" | "off" => Ok(Self(false)),
            _ => Err(ConfigError::InvalidBooleanFlag {
                var_name: String::new(),
                value,
            }),
        }
    }
}

impl AsRef<bool> for BoolFlag {
    fn as_ref(&self) -> &bool {
        &self.0
    }
}

/// Runtime configuration of the `setnode` binary.
///
/// The option flags are defaults: options present in a job's parameters
/// take precedence over them.
///
/// # Environment Variables
///
/// - `SETNODE_DOT_NOTATION` (default `true`)
/// - `SETNODE_IGNORE_CONVERSION_ERRORS` (default `false`)
/// - `SETNODE_KEEP_ONLY_SET` (default `false`)
/// - `SETNODE_INCLUDE_BINARY` (default `true`)
/// - `SETNODE_CONTINUE_ON_FAIL` (default `false`)
///
/// # Example
///
/// ```rust,ignore
/// use setnode::config::Config;
///
/// let config = Config::new()?;
/// let options = config.default_options();
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    pub version: String,
    pub dot_notation: BoolFlag,
    pub ignore_conversion_errors: BoolFlag,
    pub keep_only_set: BoolFlag,
    pub include_binary: BoolFlag,
    pub continue_on_fail: BoolFlag,
}

impl Config {
    pub fn new() -> Result<Self> {
        Ok(Self {
            version: version()?,
            dot_notation: bool_env("SETNODE_DOT_NOTATION", "true")?,
            ignore_conversion_errors: bool_env("SETNODE_IGNORE_CONVERSION_ERRORS", "false")?,
            keep_only_set: bool_env("SETNODE_KEEP_ONLY_SET", "false")?,
            include_binary: bool_env("SETNODE_INCLUDE_BINARY", "true")?,
            continue_on_fail: bool_env("SETNODE_CONTINUE_ON_FAIL", "false")?,
        })
    }

    /// Node options to apply where a job does not set its own.
    pub fn default_options(&self) -> SetNodeOptions {
        SetNodeOptions {
            dot_notation: *self.dot_notation.as_ref(),
            ignore_conversion_errors: *self.ignore_conversion_errors.as_ref(),
            keep_only_set: *self.keep_only_set.as_ref(),
            include_binary: *self.include_binary.as_ref(),
        }
    }

    pub fn continue_on_fail(&self) -> bool {
        *self.continue_on_fail.as_ref()
    }
}

fn bool_env(name: &str, default_value: &str) -> Result<BoolFlag> {
    BoolFlag::try_from(default_env(name, default_value)).map_err(|err| match err {
        ConfigError::InvalidBooleanFlag { value, .. } => ConfigError::InvalidBooleanFlag {
            var_name: name.to_string(),
            value,
        },
        other => other,
    })
}

/// Retrieves an environment variable with a default value if not set.
fn default_env(name: &str, default_value: &str) -> String {
    std::env::var(name).unwrap_or(default_value.to_string())
}

/// Retrieves the version from compile-time environment variables.
///
/// This function attempts to get the version from either `GIT_HASH` or
/// `CARGO_PKG_VERSION` compile-time environment variables.
///
/// # Returns
///
/// * `Ok(String)` - The version string if available
/// * `Err(ConfigError::VersionNotAvailable)` - If no version information is available
pub fn version() -> Result<String> {
    option_env!("GIT_HASH")
        .or(option_env!("CARGO_PKG_VERSION"))
        .map(|val| val.to_string())
        .ok_or(ConfigError::VersionNotAvailable)
}

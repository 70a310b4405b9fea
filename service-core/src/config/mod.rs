//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. `<config dir>/base.yaml` (required)
//! 2. `<config dir>/<APP_ENVIRONMENT>.yaml` (optional, defaults to `local`)
//! 3. `APP__SECTION__KEY` environment variables

use crate::error::AppError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable selecting the optional overlay file.
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

/// Locate `config/` for a crate, whether the process runs from the crate
/// directory or the workspace root.
pub fn configuration_directory(base_path: &Path, crate_dir: &str) -> PathBuf {
    if base_path.ends_with(crate_dir) {
        base_path.join("config")
    } else {
        base_path.join(crate_dir).join("config")
    }
}

/// Load settings of type `T` for the crate living in `crate_dir`.
pub fn load_settings<T: DeserializeOwned>(crate_dir: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let directory = configuration_directory(&base_path, crate_dir);
    let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "local".to_string());

    load_settings_from(&directory, &environment)
}

/// Load settings from an explicit directory and environment name.
pub fn load_settings_from<T: DeserializeOwned>(
    directory: &Path,
    environment: &str,
) -> Result<T, AppError> {
    tracing::debug!(directory = %directory.display(), environment, "Loading configuration");

    let settings = Config::builder()
        .add_source(File::from(directory.join("base.yaml")).required(true))
        .add_source(File::from(directory.join(format!("{environment}.yaml"))).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        server: SampleServer,
    }

    #[derive(Debug, Deserialize)]
    struct SampleServer {
        host: String,
        port: u16,
    }

    #[test]
    fn configuration_directory_handles_both_working_dirs() {
        let from_root = configuration_directory(Path::new("/srv/payto"), "payto-frontend");
        assert_eq!(from_root, PathBuf::from("/srv/payto/payto-frontend/config"));

        let from_crate =
            configuration_directory(Path::new("/srv/payto/payto-frontend"), "payto-frontend");
        assert_eq!(from_crate, PathBuf::from("/srv/payto/payto-frontend/config"));
    }

    #[test]
    fn environment_overlay_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("base.yaml"),
            "server:\n  host: 0.0.0.0\n  port: 8080\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("staging.yaml"), "server:\n  port: 9000\n").unwrap();

        let sample: Sample = load_settings_from(dir.path(), "staging").unwrap();
        assert_eq!(sample.server.host, "0.0.0.0");
        assert_eq!(sample.server.port, 9000);
    }

    #[test]
    fn missing_base_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<Sample, AppError> = load_settings_from(dir.path(), "local");
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}

//! Layered settings
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. `deepview.toml` in the working directory
//! 3. `DEEPVIEW_*` environment variables, `__` separating sections
//!    (`DEEPVIEW_SERVER__PORT=8080` -> `server.port`)
//!
//! Command-line flags are applied on top by the binaries.

use crate::evidence::DeriveOptions;
use crate::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "deepview.toml";
pub const ENV_PREFIX: &str = "DEEPVIEW_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Where auto-generated reports go
    pub dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("deepview-reports"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub derive: DeriveOptions,
    pub server: ServerSettings,
    pub report: ReportSettings,
}

impl Settings {
    /// Load from defaults, `deepview.toml` and the environment.
    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    /// Same as [`load`](Self::load) with an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(Self::figment_with(path).extract()?)
    }

    pub fn figment() -> Figment {
        Self::figment_with(Path::new(CONFIG_FILE))
    }

    fn figment_with(path: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.derive.suspicious_confidence, 0.5);
        assert_eq!(settings.derive.sudden_change, 0.2);
        assert_eq!(settings.derive.artifact_region_limit, 10);
        assert_eq!(settings.derive.problematic_frame_limit, 20);
        assert_eq!(settings.server.addr(), "127.0.0.1:3001");
        assert_eq!(settings.report.dir, PathBuf::from("deepview-reports"));
    }

    #[test]
    fn test_no_file_no_env() {
        Jail::expect_with(|_jail| {
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn test_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
[derive]
suspicious_confidence = 0.6

[server]
port = 8080
"#,
            )?;
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.derive.suspicious_confidence, 0.6);
            // untouched keys keep defaults
            assert_eq!(settings.derive.sudden_change, 0.2);
            assert_eq!(settings.server.port, 8080);
            assert_eq!(settings.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[server]\nport = 8080\n")?;
            jail.set_env("DEEPVIEW_SERVER__PORT", "9090");
            jail.set_env("DEEPVIEW_REPORT__DIR", "/tmp/reports");
            let settings = Settings::load().map_err(|e| e.to_string())?;
            assert_eq!(settings.server.port, 9090);
            assert_eq!(settings.report.dir, PathBuf::from("/tmp/reports"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[derive]\nartifact_region_limit = 3\n")?;
            let settings = Settings::load_from(Path::new("custom.toml")).map_err(|e| e.to_string())?;
            assert_eq!(settings.derive.artifact_region_limit, 3);
            Ok(())
        });
    }

    #[test]
    fn test_bad_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.set_env("DEEPVIEW_SERVER__PORT", "not-a-port");
            let err = Settings::load().unwrap_err();
            assert!(matches!(err, crate::Error::Config(_)));
            Ok(())
        });
    }
}

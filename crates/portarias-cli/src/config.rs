//! Configuration file loading.
//!
//! All keys are optional; anything missing falls back to built-in defaults.
//! Command-line flags and environment variables take precedence over the
//! file (resolved in `main`).
//!
//! ```toml
//! supabase_url = "https://xyz.supabase.co"
//! table = "portarias_iphan"
//! page_size = 50
//! recent_count = 5
//! default_columns = ["status_portaria", "portaria", "tipo"]
//!
//! [status_labels]
//! revoked = "Revogada"
//!
//! [[columns]]
//! id = "portaria"
//! name = "Portaria"
//! ```

use std::path::{Path, PathBuf};

use portarias_core::catalog::DEFAULT_SELECTED;
use portarias_core::page::{DEFAULT_PAGE_SIZE, RECENT_COUNT};
use portarias_core::{Column, ColumnCatalog, StatusLabels};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("page_size must be at least 1")]
    ZeroPageSize,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub recent_count: Option<usize>,
    #[serde(default)]
    pub default_columns: Option<Vec<String>>,
    #[serde(default)]
    pub status_labels: Option<StatusLabels>,
    /// Replaces the built-in column catalog when present.
    #[serde(default)]
    pub columns: Option<Vec<Column>>,
}

/// Settings after defaults are filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub supabase_url: Option<String>,
    pub table: Option<String>,
    pub page_size: usize,
    pub recent_count: usize,
    pub default_columns: Vec<String>,
    pub status_labels: StatusLabels,
    pub catalog: ColumnCatalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_file(ConfigFile::default())
    }
}

impl Settings {
    pub fn from_file(file: ConfigFile) -> Self {
        Self {
            supabase_url: file.supabase_url,
            table: file.table,
            page_size: file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            recent_count: file.recent_count.unwrap_or(RECENT_COUNT),
            default_columns: file
                .default_columns
                .unwrap_or_else(|| DEFAULT_SELECTED.iter().map(|s| s.to_string()).collect()),
            status_labels: file.status_labels.unwrap_or_default(),
            catalog: file.columns.map(ColumnCatalog::new).unwrap_or_default(),
        }
    }
}

/// Default config location: `<config_dir>/portarias/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("portarias").join("config.toml"))
}

/// Load a config file. A missing file is not an error.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if file.page_size == Some(0) {
        return Err(ConfigError::ZeroPageSize);
    }
    Ok(Some(file))
}

/// Load settings from `path`, or from the default location when `None`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) => p,
            None => return Ok(Settings::default()),
        },
    };
    let file = load_config_file(&path)?;
    if file.is_some() {
        tracing::info!(path = %path.display(), "loaded config file");
    }
    Ok(Settings::from_file(file.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portarias_core::Status;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = load_settings(Some(Path::new("/nonexistent/portarias.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.catalog, ColumnCatalog::default());
    }

    #[test]
    fn full_file() {
        let file = write_config(
            r#"
            supabase_url = "https://xyz.supabase.co"
            table = "portarias_teste"
            page_size = 20
            recent_count = 3
            default_columns = ["portaria", "tipo"]

            [status_labels]
            revoked = "Revogada"

            [[columns]]
            id = "tipo"
            name = "Tipo de Portaria"

            [[columns]]
            id = "portaria"
            name = "Portaria"
            "#,
        );
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.supabase_url.as_deref(), Some("https://xyz.supabase.co"));
        assert_eq!(settings.table.as_deref(), Some("portarias_teste"));
        assert_eq!(settings.page_size, 20);
        assert_eq!(settings.recent_count, 3);
        assert_eq!(settings.default_columns, ["portaria", "tipo"]);
        assert_eq!(settings.status_labels.label(Status::Revoked), "Revogada");
        assert_eq!(settings.status_labels.label(Status::Current), "Vigente");
        assert_eq!(settings.catalog.columns()[0].name, "Tipo de Portaria");
        assert_eq!(settings.catalog.columns().len(), 2);
    }

    #[test]
    fn unknown_key_rejected() {
        let file = write_config("tema = \"escuro\"\n");
        let err = load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_status_label_key_rejected() {
        let file = write_config("[status_labels]\nsuspensa = \"Suspensa\"\n");
        assert!(matches!(
            load_settings(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn zero_page_size_rejected() {
        let file = write_config("page_size = 0\n");
        assert!(matches!(
            load_settings(Some(file.path())),
            Err(ConfigError::ZeroPageSize)
        ));
    }
}

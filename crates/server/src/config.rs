use laoslip_ocr::NormalizeOptions;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file used when `LAOSLIP_CONFIG` is not set. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "laoslip.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Shell out to the `tesseract` executable.
    Tesseract,
    /// Answer every request with `mock_text`; for smoke tests without an engine.
    Mock,
    /// In-process libtesseract via `leptess`.
    #[cfg(feature = "tesseract")]
    Leptess,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tesseract" => Ok(BackendKind::Tesseract),
            "mock" => Ok(BackendKind::Mock),
            #[cfg(feature = "tesseract")]
            "leptess" => Ok(BackendKind::Leptess),
            other => Err(format!("Unknown OCR backend: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Largest accepted image upload, in bytes.
    pub max_upload_bytes: usize,
    pub backend: BackendKind,
    pub tesseract_bin: Option<PathBuf>,
    pub tessdata_dir: Option<PathBuf>,
    pub mock_text: String,
    pub preprocess: NormalizeOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 3000,
            max_upload_bytes: 10 * 1024 * 1024,
            backend: BackendKind::Tesseract,
            tesseract_bin: None,
            tessdata_dir: None,
            mock_text: String::new(),
            preprocess: NormalizeOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Load from `LAOSLIP_CONFIG` (or `laoslip.toml`), then apply env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os("LAOSLIP_CONFIG").map(PathBuf::from);
        let mut config = match &explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `PORT`, `LAOSLIP_BACKEND` and `LAOSLIP_TESSDATA`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PORT") {
            self.port = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "PORT", value })?;
        }
        if let Some(value) = lookup("LAOSLIP_BACKEND") {
            self.backend = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var: "LAOSLIP_BACKEND", value })?;
        }
        if let Some(value) = lookup("LAOSLIP_TESSDATA") {
            self.tessdata_dir = Some(PathBuf::from(value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_upload_contract() {
        let c = ServerConfig::default();
        assert_eq!(c.port, 3000);
        assert_eq!(c.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(c.backend, BackendKind::Tesseract);
        assert_eq!(c.preprocess.max_width, 1200);
    }

    #[test]
    fn toml_overrides_and_nested_preprocess() {
        let c = ServerConfig::from_toml(
            r#"
            port = 8080
            backend = "mock"
            mock_text = "MoneyGram"

            [preprocess]
            max_width = 1000
            "#,
        )
        .unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.backend, BackendKind::Mock);
        assert_eq!(c.mock_text, "MoneyGram");
        assert_eq!(c.preprocess.max_width, 1000);
        assert_eq!(c.preprocess.sharpen_sigma, 1.0);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = ServerConfig::from_toml("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut c = ServerConfig::default();
        c.apply_env(env(&[
            ("PORT", "9000"),
            ("LAOSLIP_BACKEND", "MOCK"),
            ("LAOSLIP_TESSDATA", "/usr/share/tessdata"),
        ]))
        .unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.backend, BackendKind::Mock);
        assert_eq!(c.tessdata_dir, Some(PathBuf::from("/usr/share/tessdata")));
    }

    #[test]
    fn invalid_port_env_is_rejected() {
        let mut c = ServerConfig::default();
        let err = c.apply_env(env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "PORT", .. }));
    }

    #[cfg(feature = "tesseract")]
    #[test]
    fn leptess_backend_is_selectable() {
        let c = ServerConfig::from_toml(r#"backend = "leptess""#).unwrap();
        assert_eq!(c.backend, BackendKind::Leptess);

        let mut c = ServerConfig::default();
        c.apply_env(env(&[("LAOSLIP_BACKEND", "leptess")])).unwrap();
        assert_eq!(c.backend, BackendKind::Leptess);
    }

    #[cfg(not(feature = "tesseract"))]
    #[test]
    fn leptess_backend_needs_feature() {
        assert!(ServerConfig::from_toml(r#"backend = "leptess""#).is_err());

        let mut c = ServerConfig::default();
        let err = c.apply_env(env(&[("LAOSLIP_BACKEND", "leptess")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: "LAOSLIP_BACKEND", .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ServerConfig::from_file(Path::new("/nonexistent/laoslip.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

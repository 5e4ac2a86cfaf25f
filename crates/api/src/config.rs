use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub database: DatabaseConfig,
    pub extraction: ExtractionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin.
    pub frontend_origin: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: Option<String>,
    pub macro_country: String,
    pub max_connections: u32,
    pub query_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub ocr_enabled: bool,
    pub tesseract_path: String,
    pub pdftoppm_path: String,
    pub ocr_dpi: u32,
    pub ocr_lang: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                frontend_origin: "*".to_string(),
                max_upload_bytes: 50 * 1024 * 1024,
            },
            llm: LlmConfig {
                api_key: String::new(),
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4.1-nano-2025-04-14".to_string(),
                timeout_secs: 60,
            },
            database: DatabaseConfig {
                url: None,
                macro_country: "USA".to_string(),
                max_connections: 5,
                query_timeout_secs: 30,
            },
            extraction: ExtractionConfig {
                ocr_enabled: true,
                tesseract_path: "tesseract".to_string(),
                pdftoppm_path: "pdftoppm".to_string(),
                ocr_dpi: 300,
                ocr_lang: "eng".to_string(),
            },
            logging: LoggingConfig {
                format: LogFormat::Pretty,
            },
        }
    }
}

impl AppConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server: ServerConfig {
                host: var("HOST").unwrap_or(defaults.server.host),
                port: parse_or(&var, "PORT", defaults.server.port)?,
                frontend_origin: var("FRONTEND_ORIGIN").unwrap_or(defaults.server.frontend_origin),
                max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes)?,
            },
            llm: LlmConfig {
                api_key: var("OPENAI_API_KEY").unwrap_or(defaults.llm.api_key),
                base_url: var("OPENAI_BASE_URL").unwrap_or(defaults.llm.base_url),
                model: var("OPENAI_MODEL").unwrap_or(defaults.llm.model),
                timeout_secs: parse_or(&var, "LLM_TIMEOUT_SECS", defaults.llm.timeout_secs)?,
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL"),
                macro_country: var("MACRO_COUNTRY").unwrap_or(defaults.database.macro_country),
                max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", defaults.database.max_connections)?,
                query_timeout_secs: parse_or(&var, "DB_QUERY_TIMEOUT_SECS", defaults.database.query_timeout_secs)?,
            },
            extraction: ExtractionConfig {
                ocr_enabled: parse_or(&var, "OCR_ENABLED", defaults.extraction.ocr_enabled)?,
                tesseract_path: var("TESSERACT_PATH").unwrap_or(defaults.extraction.tesseract_path),
                pdftoppm_path: var("PDFTOPPM_PATH").unwrap_or(defaults.extraction.pdftoppm_path),
                ocr_dpi: parse_or(&var, "OCR_DPI", defaults.extraction.ocr_dpi)?,
                ocr_lang: var("OCR_LANG").unwrap_or(defaults.extraction.ocr_lang),
            },
            logging: LoggingConfig {
                format: match var("LOG_FORMAT").map(|v| v.to_ascii_lowercase()).as_deref() {
                    None | Some("pretty") => LogFormat::Pretty,
                    Some("json") => LogFormat::Json,
                    Some(other) => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got {:?}", other),
                },
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.server.frontend_origin, "*");
        assert_eq!(config.server.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.llm.model, "gpt-4.1-nano-2025-04-14");
        assert_eq!(config.llm.timeout_secs, 60);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.macro_country, "USA");
        assert!(config.extraction.ocr_enabled);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("FRONTEND_ORIGIN", "https://app.example.com"),
            ("DATABASE_URL", "postgres://localhost/macro"),
            ("OCR_ENABLED", "false"),
            ("LOG_FORMAT", "JSON"),
            ("OPENAI_MODEL", "  "),
        ])
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.frontend_origin, "https://app.example.com");
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/macro"));
        assert!(!config.extraction.ocr_enabled);
        assert_eq!(config.logging.format, LogFormat::Json);
        // blank values fall back to defaults
        assert_eq!(config.llm.model, "gpt-4.1-nano-2025-04-14");
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectConfig {
    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_head_rows")]
    pub head_rows: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_sniff_bytes() -> usize {
    16 * 1024
}
fn default_preview_rows() -> usize {
    10
}
fn default_head_rows() -> usize {
    5
}
fn default_batch_size() -> usize {
    8192
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            sniff_bytes: default_sniff_bytes(),
            preview_rows: default_preview_rows(),
            head_rows: default_head_rows(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    #[serde(default)]
    pub fallback_delimiter: Option<char>, // None: sniffing failures are fatal
    #[serde(default = "default_null_pattern")]
    pub null_pattern: String,
}

fn default_null_pattern() -> String {
    "^$".into()
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            fallback_delimiter: None,
            null_pattern: default_null_pattern(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_compression")]
    pub parquet_compression: String,
    #[serde(default = "default_true")]
    pub csv_header: bool,
}

fn default_compression() -> String {
    "snappy".into()
}
fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            parquet_compression: default_compression(),
            csv_header: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub inspect: InspectConfig,
    #[serde(default)]
    pub csv: CsvConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tinspect")
            .join("config.toml")
    }

    pub fn load() -> crate::Result<Self> {
        let path = if let Ok(env_path) = std::env::var("TINSPECT_CONFIG") {
            PathBuf::from(env_path) // $TINSPECT_CONFIG overrides default config path
        } else {
            Self::config_path()
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::TinspectError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.inspect.sniff_bytes, 16384);
        assert_eq!(cfg.inspect.preview_rows, 10);
        assert_eq!(cfg.inspect.head_rows, 5);
        assert_eq!(cfg.csv.fallback_delimiter, None);
        assert_eq!(cfg.export.parquet_compression, "snappy");
        assert!(cfg.export.csv_header);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "[csv]\nfallback_delimiter = \",\"\n[inspect]\nhead_rows = 3").unwrap();
        let cfg = Config::load_from(tmp.path()).unwrap();
        assert_eq!(cfg.csv.fallback_delimiter, Some(','));
        assert_eq!(cfg.csv.null_pattern, "^$");
        assert_eq!(cfg.inspect.head_rows, 3);
        assert_eq!(cfg.inspect.preview_rows, 10);
    }

    #[test]
    fn malformed_file_is_config_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "[inspect\nhead_rows = ").unwrap();
        let err = Config::load_from(tmp.path()).unwrap_err();
        assert!(matches!(err, crate::TinspectError::Config(_)));
    }
}

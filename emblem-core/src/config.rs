use crate::mapping::IconName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SIZES: [u32; 9] = [16, 22, 24, 32, 48, 64, 96, 128, 256];

/// Breeze light text color; resolves `currentColor` when rasterizing.
pub const DEFAULT_TEXT_COLOR: &str = "#232629";

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub theme: Theme,
    pub build: Build,
    pub tools: Tools,

    /// path of the configuration file, if the configuration was loaded from a file
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            theme: Theme::default(),
            build: Build::default(),
            tools: Tools::default(),
            source: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct Theme {
    pub name: String,
    pub comment: String,
    pub inherits: String,
    pub example: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            name: "Material Symbols".to_string(),
            comment: "Material Design glyphs adapted for KDE Plasma.".to_string(),
            inherits: "breeze".to_string(),
            example: "folder".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct Build {
    pub sizes: Vec<u32>,
    #[serde(alias = "text_color")]
    pub text_color: String,
    #[serde(alias = "extra_required")]
    pub extra_required: Vec<IconName>,
}

impl Default for Build {
    fn default() -> Self {
        Build {
            sizes: DEFAULT_SIZES.to_vec(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            extra_required: Vec::new(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct Tools {
    pub inkscape: PathBuf,
    #[serde(alias = "rsvg_convert")]
    pub rsvg_convert: PathBuf,
    pub optipng: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            inkscape: PathBuf::from("inkscape"),
            rsvg_convert: PathBuf::from("rsvg-convert"),
            optipng: PathBuf::from("optipng"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("invalid configuration string")]
    InvalidConfigString(String, #[source] eyre::Report),
    #[error("invalid configuration file {}", .0.display())]
    InvalidConfigFile(PathBuf, #[source] eyre::Report),
    #[error("i/o error reading configuration file {}", .0.display())]
    IoError(PathBuf, std::io::Error),
}

impl Config {
    pub fn parse(s: &str) -> Result<Config, ConfigLoadError> {
        toml::from_str(s).map_err(|e| ConfigLoadError::InvalidConfigString(s.to_owned(), e.into()))
    }

    pub async fn parse_file(p: &Path) -> Result<Config, ConfigLoadError> {
        let config_string = tokio::fs::read_to_string(p)
            .await
            .map_err(|e| ConfigLoadError::IoError(p.to_owned(), e))?;
        let mut config: Config = toml::from_str(&config_string)
            .map_err(|e| ConfigLoadError::InvalidConfigFile(p.to_owned(), e.into()))?;
        config.source = Some(p.to_owned());
        Ok(config)
    }
}

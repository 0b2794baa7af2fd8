use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, TokenError};
use crate::tokens::TokenTree;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub tokens: TokenTree,
    #[serde(default, alias = "custom_properties")]
    pub custom_properties: Vec<CustomPropertyScope>,
    #[serde(default, alias = "breakpoints")]
    pub viewports: IndexMap<String, String>,
    #[serde(default, alias = "utility_classes")]
    pub utility_classes: Vec<UtilityClassConfig>,
    #[serde(
        default = "default_class_separator",
        alias = "media_query_class_separator",
        alias = "responsivePrefixClassSeparator",
        alias = "responsive_prefix_class_separator"
    )]
    pub media_query_class_separator: String,
}

/// Prefix and group assignment for one token branch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomPropertyScope {
    pub id: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilityClassConfig {
    pub id: String,
    pub property: Properties,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(
        default,
        alias = "responsive_variants",
        alias = "screenVariants",
        alias = "screen_variants"
    )]
    pub responsive_variants: bool,
}

/// One CSS property or several sharing the same value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Properties {
    One(String),
    Many(Vec<String>),
}

impl Properties {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Properties::One(property) => vec![property.clone()],
            Properties::Many(properties) => properties.clone(),
        }
    }
}

impl From<&str> for Properties {
    fn from(value: &str) -> Self {
        Properties::One(value.to_string())
    }
}

impl From<Vec<&str>> for Properties {
    fn from(value: Vec<&str>) -> Self {
        Properties::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl UtilityClassConfig {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(TokenError::InvalidUtilityClass {
                id: self.id.clone(),
                reason: "id must not be empty".to_string(),
            });
        }
        let properties = self.property.to_vec();
        if properties.is_empty() {
            return Err(TokenError::InvalidUtilityClass {
                id: self.id.clone(),
                reason: "property list must not be empty".to_string(),
            });
        }
        if properties.iter().any(|property| property.trim().is_empty()) {
            return Err(TokenError::InvalidUtilityClass {
                id: self.id.clone(),
                reason: "property names must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tokens: TokenTree::new(),
            custom_properties: Vec::new(),
            viewports: IndexMap::new(),
            utility_classes: Vec::new(),
            media_query_class_separator: default_class_separator(),
        }
    }
}

/// Loads a `.toml` or `.json` config file, picking the parser by extension.
pub fn load(path: &Path) -> Result<Config> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| TokenError::UnsupportedExtension {
        path: path.to_path_buf(),
    })?;
    let text = fs::read_to_string(path).map_err(|source| TokenError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;
    match format {
        ConfigFormat::Json => serde_json::from_str(&text).map_err(|source| TokenError::ParseJson {
            path: path.to_path_buf(),
            source,
        }),
        ConfigFormat::Toml => toml::from_str(&text).map_err(|source| TokenError::ParseToml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("toml") {
            Some(ConfigFormat::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(ConfigFormat::Json)
        } else {
            None
        }
    }
}

fn default_class_separator() -> String {
    "-".to_string()
}

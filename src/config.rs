//! Generator configuration.
//!
//! Run-wide options are built with `typed-builder`. Free-form settings from
//! the manifest's `[generator.settings]` table are carried as a string map.

use std::collections::BTreeMap;
use std::path::PathBuf;
use typed_builder::TypedBuilder;

use crate::errors::{ScrudError, ScrudResult};
use crate::metadata::GeneratorSection;

/// Free-form key/value settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings(BTreeMap<String, String>);

impl Settings {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|value| !value.trim().is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Settings {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Configuration for one generator run.
///
/// # Examples
///
/// ```
/// use scrudgen::config::GeneratorConfig;
///
/// let config = GeneratorConfig::builder()
///     .output_root("target/generated")
///     .source_roots(vec!["src".into()])
///     .build();
/// assert_eq!(config.runtime_crate, "scrud_runtime");
/// ```
#[derive(Debug, Clone, TypedBuilder)]
#[builder(doc)]
pub struct GeneratorConfig {
    /// Directory receiving generated artifacts
    #[builder(setter(into))]
    pub output_root: PathBuf,

    /// Hand-written source roots; an artifact found here is never regenerated
    #[builder(default)]
    pub source_roots: Vec<PathBuf>,

    /// Path of the runtime crate generated code calls into
    #[builder(default = "scrud_runtime".to_string(), setter(into))]
    pub runtime_crate: String,

    /// Path of the identifier codec crate generated code calls into
    #[builder(default = "scrudgen_codec".to_string(), setter(into))]
    pub codec_crate: String,

    #[builder(default)]
    pub settings: Settings,

    /// Fully qualified types that exist outside the manifest
    #[builder(default)]
    pub known_types: Vec<String>,
}

impl GeneratorConfig {
    /// Combine the manifest's `[generator]` section with command-line locations.
    pub fn from_section(
        section: &GeneratorSection,
        output_root: impl Into<PathBuf>,
        source_roots: Vec<PathBuf>,
    ) -> ScrudResult<Self> {
        let config = GeneratorConfig::builder()
            .output_root(output_root)
            .source_roots(source_roots)
            .runtime_crate(
                section
                    .runtime_crate
                    .clone()
                    .unwrap_or_else(|| "scrud_runtime".to_string()),
            )
            .codec_crate(
                section
                    .codec_crate
                    .clone()
                    .unwrap_or_else(|| "scrudgen_codec".to_string()),
            )
            .settings(section.settings.clone().into_iter().collect())
            .known_types(section.known_types.clone())
            .build();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScrudResult<()> {
        for (label, path) in [
            ("runtime_crate", &self.runtime_crate),
            ("codec_crate", &self.codec_crate),
        ] {
            if syn::parse_str::<syn::Path>(path).is_err() {
                return Err(ScrudError::Configuration(format!(
                    "{label} '{path}' is not a valid Rust path"
                )));
            }
        }
        if self.source_roots.iter().any(|root| root == &self.output_root) {
            return Err(ScrudError::Configuration(format!(
                "output root '{}' must not also be a source root",
                self.output_root.display()
            )));
        }
        Ok(())
    }
}

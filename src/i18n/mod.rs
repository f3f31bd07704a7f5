//! Message catalogs for the status report.
//!
//! Catalogs are flat TOML tables mapping a message id to a template. The
//! English and Italian catalogs are compiled in; a custom `lang.<tag>.toml`
//! file can add or override a language at startup.
//!
//! Templates use `{Name}` placeholders. A message id that cannot be resolved
//! in any requested language renders as the id itself.

use anyhow::{bail, Context, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Language every lookup falls back to.
pub const FALLBACK_LANGUAGE: &str = "en";

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("lang.en.toml")),
    ("it", include_str!("lang.it.toml")),
];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").expect("Invalid regex pattern"));

type Catalog = HashMap<String, String>;

/// Translation lookup, constructed once per session.
#[derive(Debug, Clone, Default)]
pub struct Localizer {
    catalogs: HashMap<String, Catalog>,
}

impl Localizer {
    /// Localizer with only the compiled-in catalogs.
    pub fn embedded() -> Self {
        let mut catalogs = HashMap::new();
        for (tag, source) in EMBEDDED {
            match parse_catalog(source) {
                Ok(catalog) => {
                    catalogs.insert((*tag).to_string(), catalog);
                }
                Err(e) => tracing::error!("Embedded catalog '{tag}' is invalid: {e:#}"),
            }
        }
        Self { catalogs }
    }

    /// Load a custom catalog file named `lang.<tag>.toml`.
    ///
    /// Entries override the embedded catalog of the same language.
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let tag = language_tag_from_file(path)?;
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read language file: {}", path.display()))?;
        let catalog = parse_catalog(&source)
            .with_context(|| format!("Failed to parse language file: {}", path.display()))?;
        self.catalogs.entry(tag.clone()).or_default().extend(catalog);
        Ok(tag)
    }

    /// Languages with a loaded catalog, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Look up `message_id` in the first language that defines it.
    pub fn localize(&self, message_id: &str, languages: &[String]) -> String {
        self.lookup(message_id, languages)
            .map(str::to_string)
            .unwrap_or_else(|| message_id.to_string())
    }

    /// Look up `message_id` and substitute `{Name}` placeholders from `vars`.
    ///
    /// Placeholders without a matching variable are left untouched.
    pub fn localize_template(
        &self,
        message_id: &str,
        vars: &HashMap<&str, &str>,
        languages: &[String],
    ) -> String {
        match self.lookup(message_id, languages) {
            Some(template) => render(template, vars),
            None => message_id.to_string(),
        }
    }

    fn lookup(&self, message_id: &str, languages: &[String]) -> Option<&str> {
        languages
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(FALLBACK_LANGUAGE))
            .filter_map(|tag| self.catalogs.get(tag))
            .find_map(|catalog| catalog.get(message_id))
            .map(String::as_str)
    }
}

fn parse_catalog(source: &str) -> Result<Catalog> {
    toml::from_str(source).context("Catalog must be a table of strings")
}

fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => (*value).to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn language_tag_from_file(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    match name
        .strip_prefix("lang.")
        .and_then(|rest| rest.strip_suffix(".toml"))
    {
        Some(tag) if !tag.is_empty() && !tag.contains('.') => Ok(tag.to_lowercase()),
        _ => bail!(
            "Language file must be named lang.<tag>.toml: {}",
            path.display()
        ),
    }
}

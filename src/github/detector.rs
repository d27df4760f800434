use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::fmt;

use super::models::{ContentEntry, ContentRequest};
use crate::application::ports::ContentSource;

static SVELTE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bsvelte\b").expect("valid svelte pattern"));

/// Dependency names checked in priority order, first hit wins
const DEPENDENCY_FRAMEWORKS: &[(&str, Framework)] = &[
    ("vuepress", Framework::VuePress),
    ("gatsby", Framework::Gatsby),
    ("contentful", Framework::Contentful),
    ("next", Framework::Next),
    ("nuxt", Framework::Nuxt),
    ("react", Framework::React),
    ("@angular/core", Framework::Angular),
    ("vue", Framework::Vue),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Hugo,
    Jekyll,
    Blazor,
    #[serde(rename = "11ty")]
    Eleventy,
    Svelte,
    VuePress,
    Gatsby,
    Contentful,
    Next,
    Nuxt,
    React,
    Angular,
    Vue,
    Unknown,
}

impl Framework {
    pub fn label(&self) -> &'static str {
        match self {
            Framework::Hugo => "hugo",
            Framework::Jekyll => "jekyll",
            Framework::Blazor => "blazor",
            Framework::Eleventy => "11ty",
            Framework::Svelte => "svelte",
            Framework::VuePress => "vuepress",
            Framework::Gatsby => "gatsby",
            Framework::Contentful => "contentful",
            Framework::Next => "next",
            Framework::Nuxt => "nuxt",
            Framework::React => "react",
            Framework::Angular => "angular",
            Framework::Vue => "vue",
            Framework::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Marker files found in an app directory listing
#[derive(Debug, Clone, Default)]
pub struct MarkerFiles {
    pub package_json: Option<ContentEntry>,
    pub csproj: Option<ContentEntry>,
    pub config_toml: Option<ContentEntry>,
    pub config_yaml: Option<ContentEntry>,
    pub jekyll_config: Option<ContentEntry>,
}

impl MarkerFiles {
    /// Pick marker files out of a directory listing (case-insensitive, first match wins)
    pub fn discover(listing: &[ContentEntry]) -> Self {
        Self {
            package_json: find_marker(listing, |name| name == "package.json"),
            csproj: find_marker(listing, |name| name.ends_with(".csproj")),
            config_toml: find_marker(listing, |name| name == "config.toml"),
            config_yaml: find_marker(listing, |name| name == "config.yaml"),
            jekyll_config: find_marker(listing, |name| name == "_config.yml"),
        }
    }

    /// Names of the markers that were found, for diagnostics
    pub fn found(&self) -> Vec<&str> {
        [
            self.package_json.as_ref(),
            self.csproj.as_ref(),
            self.config_toml.as_ref(),
            self.config_yaml.as_ref(),
            self.jekyll_config.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(|entry| entry.name.as_str())
        .collect()
    }
}

pub struct FrameworkDetector;

impl FrameworkDetector {
    /// Classify the framework of an app directory
    ///
    /// Static-site config files win over project files, which win over the
    /// package manifest. Only the manifest requires a fetch. Anything missing
    /// or unreadable degrades to `Unknown`.
    pub async fn classify(
        markers: &MarkerFiles,
        source: &dyn ContentSource,
        app_request: &ContentRequest,
    ) -> Framework {
        if markers.config_toml.is_some() || markers.config_yaml.is_some() {
            return Framework::Hugo;
        }

        if markers.jekyll_config.is_some() {
            return Framework::Jekyll;
        }

        // Uno and Statiq projects also carry a .csproj and land here
        if markers.csproj.is_some() {
            return Framework::Blazor;
        }

        let package_json = match &markers.package_json {
            Some(entry) => entry,
            None => return Framework::Unknown,
        };

        let manifest = source
            .get_content(&app_request.with_path(&package_json.path))
            .await
            .and_then(|content| content.into_file())
            .and_then(|file| file.document);

        match manifest {
            Some(manifest) => Self::classify_manifest(&manifest),
            None => Framework::Unknown,
        }
    }

    /// Classify a parsed package manifest by its dependency names
    pub fn classify_manifest(manifest: &YamlValue) -> Framework {
        let dev_dependencies = dependency_names(manifest, "devDependencies");
        if dev_dependencies.iter().any(|name| *name == "@11ty/eleventy") {
            return Framework::Eleventy;
        }
        if dev_dependencies.iter().any(|name| SVELTE_WORD.is_match(name)) {
            return Framework::Svelte;
        }

        let dependencies = dependency_names(manifest, "dependencies");
        DEPENDENCY_FRAMEWORKS
            .iter()
            .find(|(package, _)| dependencies.iter().any(|name| name == package))
            .map(|(_, framework)| *framework)
            .unwrap_or(Framework::Unknown)
    }
}

fn find_marker(listing: &[ContentEntry], matches: impl Fn(&str) -> bool) -> Option<ContentEntry> {
    listing
        .iter()
        .find(|entry| matches(&entry.name.to_lowercase()))
        .cloned()
}

fn dependency_names<'a>(manifest: &'a YamlValue, section: &str) -> Vec<&'a str> {
    manifest
        .get(section)
        .and_then(|deps| deps.as_mapping())
        .map(|deps| deps.keys().filter_map(|key| key.as_str()).collect())
        .unwrap_or_default()
}

//! Site configuration management for `taxa.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── data       # [data]
//! │   ├── site       # [site]
//! │   └── taxonomies # [taxonomies]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section          | Purpose                                        |
//! |------------------|------------------------------------------------|
//! | `[site]`         | Site title, index template, item title field   |
//! | `[build]`        | Output directory, templates directory, clean   |
//! | `[data]`         | JSON record sources, structured term fields    |
//! | `[taxonomies]`   | Taxonomy id to record field, in page order     |

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildSectionConfig, DataConfig, SiteSectionConfig, TaxonomiesConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    log,
    taxonomy::TaxonomySet,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing taxa.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Validated taxonomy definitions (internal use only)
    #[serde(skip)]
    pub taxonomy_set: TaxonomySet,

    /// Site settings
    #[serde(default)]
    pub site: SiteSectionConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Record sources
    #[serde(default)]
    pub data: DataConfig,

    /// Taxonomy definitions
    #[serde(default)]
    pub taxonomies: TaxonomiesConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&config_path)?;

        // Validate raw paths before normalization
        config.validate_paths()?;

        config.config_path = config_path;
        config.finalize(cli);

        config.taxonomy_set = config.validate()?;
        Ok(config)
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.normalize_paths(&root);
        self.apply_command_options(cli);
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Get path relative to the site root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Files and directories the build reads: config, templates, local data.
    pub fn inputs(&self) -> impl Iterator<Item = &Path> {
        [self.config_path.as_path(), self.build.templates.as_path()]
            .into_iter()
            .chain(self.data.local_sources())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { args } => {
                crate::logger::set_verbose(args.verbose);
                Self::update_option(&mut self.build.clean, args.clean.as_ref());
            }
            Commands::Query { args } => {
                crate::logger::set_verbose(args.verbose);
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize all paths relative to root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.set_root(&root);

        self.config_path = crate::utils::path::normalize_path(&self.config_path);
        self.build.output = crate::utils::path::normalize_path(&root.join(&self.build.output));
        self.build.templates =
            crate::utils::path::normalize_path(&root.join(&self.build.templates));
        self.data.normalize(&root);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Pre-validate paths before normalization.
    ///
    /// Must run before `finalize()`: joining with the root turns a URL into
    /// a local-looking path.
    fn validate_paths(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.data.validate_sources(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Validate every section and resolve the taxonomy definitions.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<TaxonomySet> {
        let mut diag = ConfigDiagnostics::new();

        self.site.validate(&mut diag);
        self.build
            .validate_output(&self.root, self.inputs(), &mut diag);
        self.data.validate(&mut diag);
        let set = self.taxonomies.resolve(&self.data, &mut diag);

        if self.taxonomies.is_empty() {
            diag.hint(
                TaxonomiesConfig::FIELD,
                "no taxonomies configured, only the index page will be generated",
            );
        }

        diag.print_hints();

        diag.into_result()
            .map_err(ConfigError::Diagnostics)?;
        Ok(set.unwrap_or_default())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse a config snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_site(dir: &Path, config: &str) -> PathBuf {
        fs::create_dir_all(dir.join("data")).unwrap();
        fs::write(dir.join("data/items.json"), "[]").unwrap();
        let path = dir.join("taxa.toml");
        fs::write(&path, config).unwrap();
        path
    }

    fn loaded(dir: &Path, config: &str) -> SiteConfig {
        let path = write_site(dir, config);
        let mut config = SiteConfig::from_path(&path).unwrap();
        config.validate_paths().unwrap();
        config.config_path = path;
        config.normalize_paths(dir);
        config
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = SiteConfig::parse_with_ignored("[site\ntitle = \"My Catalog\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        assert_eq!(config.root, Path::new(""));
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.root, Path::new("/custom/path"));
        assert_eq!(
            config.root_relative("/custom/path/public/index.html"),
            Path::new("public/index.html")
        );
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[site]\ntitle = \"Test\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = SiteConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.site.title, "Test");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_taxonomy_keys_are_not_unknown() {
        let content = "[taxonomies]\ntag = \"tags\"\ndeveloper = \"developers\"";
        let (_, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_paths_normalized_against_root() {
        let dir = TempDir::new().unwrap();
        let config = loaded(
            dir.path(),
            "[data]\nsources = [\"data/items.json\"]\n[build]\noutput = \"dist\"",
        );
        let root = crate::utils::path::normalize_path(dir.path());

        assert_eq!(config.root, root);
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.data.sources, [root.join("data/items.json")]);
    }

    #[test]
    fn test_validate_resolves_taxonomies() {
        let dir = TempDir::new().unwrap();
        let config = loaded(
            dir.path(),
            r#"
[data]
sources = ["data/items.json"]
structured = ["developers"]

[taxonomies]
tag = "tags"
developer = "developers"
"#,
        );
        let set = config.validate().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().unwrap().id, "tag");
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let dir = TempDir::new().unwrap();
        let config = loaded(
            dir.path(),
            "[site]\ntemplate = \"\"\n[data]\nsources = [\"data/missing.json\"]\n[taxonomies]\ntag = 1",
        );
        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err}");
        };
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_remote_source_survives_normalization() {
        let dir = TempDir::new().unwrap();
        let config = loaded(
            dir.path(),
            "[data]\nsources = [\"https://example.com/items.json\", \"data/items.json\"]",
        );
        assert_eq!(
            config.data.sources[0],
            PathBuf::from("https://example.com/items.json")
        );
        assert_eq!(config.inputs().count(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_scheme_rejected_before_normalization() {
        let dir = TempDir::new().unwrap();
        let path = write_site(dir.path(), "[data]\nsources = [\"ftp://example.com/items.json\"]");
        let config = SiteConfig::from_path(&path).unwrap();
        assert!(config.validate_paths().is_err());
    }

    fn output_errors(dir: &Path, output: &str) -> Vec<String> {
        let config = loaded(
            dir,
            &format!("[data]\nsources = [\"data/items.json\"]\n[build]\noutput = \"{output}\""),
        );
        match config.validate() {
            Ok(_) => Vec::new(),
            Err(err) => match err.downcast::<ConfigError>() {
                Ok(ConfigError::Diagnostics(diag)) => {
                    diag.errors().iter().map(|e| e.message.clone()).collect()
                }
                other => panic!("expected diagnostics, got {other:?}"),
            },
        }
    }

    #[test]
    fn test_output_may_not_contain_site_inputs() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site");
        fs::create_dir_all(&site).unwrap();

        for output in [".", "..", "data"] {
            let errors = output_errors(&site, output);
            assert_eq!(errors.len(), 1, "output = {output:?}: {errors:?}");
            assert!(errors[0].contains("output directory"));
        }
        assert!(output_errors(&site, "public").is_empty());

        // Nothing was removed while validating
        assert!(site.join("taxa.toml").is_file());
        assert!(site.join("data/items.json").is_file());
    }

    #[test]
    fn test_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let cli = Cli {
            color: clap::ColorChoice::Never,
            output: None,
            config: dir.path().join("absent.toml"),
            command: Commands::Query {
                args: crate::cli::QueryArgs {
                    taxonomy: None,
                    pretty: false,
                    verbose: false,
                },
            },
        };
        let err = SiteConfig::load(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::NotFound(_))
        ));
    }
}

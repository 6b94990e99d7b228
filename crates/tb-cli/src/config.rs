//! Configuration loading and management.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tb_core::NegativeDurationPolicy;
use tb_core::catalog::{Catalog, CategoryDef, TaskDef};

/// Which grouping a report shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Tasks,
    Categories,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// How to treat task lines whose end time precedes the start time.
    pub negative_durations: NegativeDurationPolicy,

    /// Grouping used when no `--view` is given.
    pub default_view: View,

    /// Width in characters of a full (100%) ASCII bar.
    pub bar_scale: usize,

    /// Task vocabulary. Replaces the built-in one when set.
    pub tasks: Vec<TaskDef>,

    /// Category vocabulary. Replaces the built-in one when set.
    pub categories: Vec<CategoryDef>,
}

impl Default for Config {
    fn default() -> Self {
        let catalog = Catalog::default();
        Self {
            negative_durations: NegativeDurationPolicy::default(),
            default_view: View::default(),
            bar_scale: 50,
            tasks: catalog.tasks,
            categories: catalog.categories,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TB_*)
        figment = figment.merge(Env::prefixed("TB_"));

        figment.extract()
    }

    /// The task vocabulary as a lookup.
    pub fn catalog(&self) -> Catalog {
        Catalog {
            tasks: self.tasks.clone(),
            categories: self.categories.clone(),
        }
    }
}

/// Returns the platform-specific config directory for tb.
///
/// On Linux: `~/.config/tb`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tb_core::TaskLookup;

    #[test]
    fn test_dirs_config_path_ends_with_tb() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tb");
    }

    #[test]
    fn test_default_config_uses_builtin_catalog() {
        let config = Config::default();
        assert_eq!(config.negative_durations, NegativeDurationPolicy::Reject);
        assert_eq!(config.default_view, View::Tasks);
        assert_eq!(config.bar_scale, 50);
        assert_eq!(config.catalog(), Catalog::default());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
negative_durations = "wrap_midnight"
default_view = "categories"
bar_scale = 20

[[tasks]]
code = "R"
name = "Research"
category = "A"
expected_minutes = 600
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(
            config.negative_durations,
            NegativeDurationPolicy::WrapMidnight
        );
        assert_eq!(config.default_view, View::Categories);
        assert_eq!(config.bar_scale, 20);
        assert_eq!(config.tasks.len(), 1);

        let research = config.catalog().lookup("r").unwrap();
        assert_eq!(research.name, "Research");
        assert_eq!(research.expected_minutes, Some(600));
        assert_eq!(research.category.unwrap().name, "Planned work");
    }
}

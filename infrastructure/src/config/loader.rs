//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["xplain.toml", ".xplain.toml"];
const ENV_PREFIX: &str = "XPLAIN_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `XPLAIN_` environment variables (`XPLAIN_DISPATCH__MAX_WORKERS=4`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./xplain.toml` or `./.xplain.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/xplain/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        let global = Self::global_config_path().filter(|p| p.exists());
        let project = Self::project_config_path();
        Self::figment(global.as_deref(), project.as_deref(), config_path.map(PathBuf::as_path))
            .extract()
            .map_err(Box::new)
    }

    /// Merge the given files over the defaults, then the environment.
    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/xplain/config.toml if set,
    /// otherwise falls back to ~/.config/xplain/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("xplain").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./xplain.toml or ./.xplain.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use xplain_application::FailurePolicy;
    use xplain_domain::DataDomain;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.session.explainers.is_empty());
        assert_eq!(config.dispatch.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("xplain"));
    }

    #[test]
    fn test_later_files_win() {
        let global = toml_file(
            r#"
[session]
domain = "text"
explainers = ["word_occlusion"]

[dispatch]
max_workers = 8
"#,
        );
        let explicit = toml_file(
            r#"
[dispatch]
max_workers = 2
"#,
        );

        let config: FileConfig =
            ConfigLoader::figment(Some(global.path()), None, Some(explicit.path()))
                .extract()
                .unwrap();
        assert_eq!(config.dispatch.max_workers, Some(2));
        // Untouched keys fall through from lower layers
        assert_eq!(config.session.domain, DataDomain::Text);
        assert_eq!(config.session.explainers, vec!["word_occlusion"]);
        assert!(config.output.color);
    }

    #[test]
    fn test_params_tables_survive_merge() {
        let project = toml_file(
            r#"
[params.permutation]
n_repeats = 3
seed = 9
"#,
        );
        let config: FileConfig = ConfigLoader::figment(None, Some(project.path()), None)
            .extract()
            .unwrap();
        let params = config.algorithm_params();
        assert_eq!(params[0].0, "permutation");
        assert_eq!(params[0].1.len(), 2);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let explicit = toml_file(
            r#"
[dispatch]
failure_policy = "sometimes"
"#,
        );
        let result: Result<FileConfig, _> =
            ConfigLoader::figment(None, None, Some(explicit.path())).extract();
        assert!(result.is_err());
    }
}

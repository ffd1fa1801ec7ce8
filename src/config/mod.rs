//! `hashpack.toml`.
//!
//! ```text
//! config/
//! ├── section/       # [paths] [output] [tools] [post] [types]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config file discovery
//! └── mod.rs         # PackConfig (this file)
//! ```
//!
//! The configuration is loaded once, finalized against the directory that
//! holds the config file, validated, and then passed by reference to every
//! phase.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{OutputConfig, PathsConfig, PostConfig, ToolsConfig, TypesConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Contents of `hashpack.toml`, with every path made absolute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Where the file was found.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory holding the config file; relative paths hang off it.
    #[serde(skip)]
    pub root: PathBuf,

    /// No progress line.
    #[serde(skip)]
    pub quiet: bool,

    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub tools: ToolsConfig,
    pub post: PostConfig,
    pub types: TypesConfig,
}

impl PackConfig {
    /// Find, parse, override and validate the config for `cli`.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let Some(config_path) = find_config_file(&cli.config, &cwd) else {
            return Err(ConfigError::NotFound(cwd.join(&cli.config)).into());
        };

        let text = fs::read_to_string(&config_path)
            .map_err(|err| ConfigError::Io(config_path.clone(), err))?;
        let (mut config, unknown) = Self::parse_with_ignored(&text)?;
        warn_unknown_keys(&config_path, &unknown);

        config.config_path = config_path;
        config.finalize(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML, returning the keys serde skipped.
    fn parse_with_ignored(text: &str) -> Result<(Self, Vec<String>)> {
        let mut unknown = Vec::new();
        let config = serde_ignored::deserialize(toml::Deserializer::new(text), |key: serde_ignored::Path| {
            unknown.push(key.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, unknown))
    }

    fn finalize(&mut self, cli: &Cli) {
        self.apply_command_options(cli);
        let root = match self.config_path.parent() {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::new(),
        };
        self.set_root(&root);
    }

    /// Anchor every configured path at `root`.
    pub fn set_root(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.paths.normalize(&root);
        self.root = root;
    }

    /// `path` below the root for display, or unchanged.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => {
                crate::logger::set_verbose(build_args.verbose);
                if let Some(store) = &build_args.store {
                    self.paths.store = Some(store.clone());
                }
                self.post.gzip &= !build_args.no_gzip;
            }
            Commands::Check { verbose } => {
                crate::logger::set_verbose(*verbose);
                self.quiet = true;
            }
        }
    }

    /// Check every section; all problems come back in one error.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.paths.validate(&mut diag);
        self.output.validate(&mut diag);
        self.tools.validate(&mut diag);
        self.types.validate(&mut diag);
        Ok(diag.finish()?)
    }
}

fn warn_unknown_keys(path: &Path, keys: &[String]) {
    if keys.is_empty() {
        return;
    }
    let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
    log!("warning"; "{name}: ignoring unknown keys {}", keys.join(", "));
}

/// Parse config text, failing on any unknown key.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PackConfig {
    let (parsed, ignored) = PackConfig::parse_with_ignored(content).unwrap();
    assert!(ignored.is_empty(), "unknown keys in test config: {ignored:?}");
    parsed
}

/// Default config rooted at `root`, with `src/` and `www/` below it.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> PackConfig {
    let mut config = PackConfig {
        quiet: true,
        ..PackConfig::default()
    };
    config.set_root(root);
    config
}

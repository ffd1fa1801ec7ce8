//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// hashpack static asset bundler CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: hashpack.toml)
    #[arg(short = 'C', long, default_value = "hashpack.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Combine, minify and hash resources, then rewrite every source
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Analyze the tree and report the dependency graph without writing
    #[command(visible_alias = "c")]
    Check {
        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Keep the build state in this SQLite file (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Skip writing .gz and .br siblings
    #[arg(long)]
    pub no_gzip: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from(["hashpack", "-C", "site.toml", "build", "-s", "state.db", "-V"]);
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(build_args.store, Some(PathBuf::from("state.db")));
        assert!(build_args.verbose);
        assert!(!build_args.no_gzip);
    }

    #[test]
    fn test_parse_check_alias() {
        let cli = Cli::parse_from(["hashpack", "--color", "never", "c"]);
        assert_eq!(cli.config, PathBuf::from("hashpack.toml"));
        assert!(matches!(cli.command, Commands::Check { verbose: false }));
        assert!(matches!(cli.color, ColorChoice::Never));
    }
}

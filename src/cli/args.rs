//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Taxa static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: taxa.toml)
    #[arg(short = 'C', long, default_value = "taxa.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the index page and every taxonomy page
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Print the taxonomy page plan as JSON
    #[command(visible_alias = "q")]
    Query {
        #[command(flatten)]
        args: QueryArgs,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub clean: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Query command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct QueryArgs {
    /// Only list pages of this taxonomy
    #[arg(short, long)]
    pub taxonomy: Option<String>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["taxa", "-o", "dist", "build", "--clean=false", "-V"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("dist")));
        assert_eq!(cli.config, PathBuf::from("taxa.toml"));
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.clean, Some(false));
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_build_bare_clean() {
        let cli = Cli::try_parse_from(["taxa", "b", "--clean"]).unwrap();
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.clean, Some(true));
    }

    #[test]
    fn test_parse_query() {
        let cli = Cli::try_parse_from(["taxa", "-C", "site/taxa.toml", "q", "-t", "tag", "--pretty"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("site/taxa.toml"));
        let Commands::Query { args } = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.taxonomy.as_deref(), Some("tag"));
        assert!(args.pretty);
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["taxa"]).is_err());
    }
}

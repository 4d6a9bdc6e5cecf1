use emblem_core::glyphs::Style;
use std::path::PathBuf;

/// Builds a Material Design icon theme for KDE Plasma.
#[derive(clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Sets a custom configuration file path
    #[arg(short, long, env = "EMBLEM_CONFIG_FILE", default_value = "emblem.toml")]
    pub config_file: PathBuf,

    /// Path to the checked-out upstream glyph repository
    #[arg(long, env = "EMBLEM_GLYPH_PATH", default_value = "material-design-icons")]
    pub glyph_path: PathBuf,

    /// Path to the icon name mapping table
    #[arg(long, default_value = "mapping.csv")]
    pub mapping: PathBuf,

    /// Logs more detail
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub subcommand: Cmd,
}

#[derive(clap::Subcommand)]
pub enum Cmd {
    /// Runs the full theme build pipeline
    Build(build::Cli),

    /// Checks the mapping table against the required icon names
    Check(check::Cli),

    /// Prints the active configuration
    Config,

    /// Prints version information
    Version,
}

pub mod build {
    use super::*;

    #[derive(clap::Args)]
    pub struct Cli {
        /// The glyph style variant to build
        #[arg(long, default_value_t)]
        pub style: Style,

        /// Non-interactive mode: no prompts, plain output, non-zero exit
        /// on any missing mapping or tool failure
        #[arg(long)]
        pub ci: bool,

        /// Output directory for the theme tree
        #[arg(short, long)]
        pub output: Option<PathBuf>,

        /// Number of parallel glyph workers
        #[arg(long)]
        pub jobs: Option<usize>,

        /// Skips PNG optimization
        #[arg(long)]
        pub no_optimize: bool,

        /// Also packages the assembled tree into a tar.xz archive
        #[arg(long)]
        pub package: bool,

        /// Version used in the package file name
        #[arg(long, default_value = "0.1.0")]
        pub version_tag: String,
    }
}

pub mod check {
    use super::*;

    #[derive(clap::Args)]
    pub struct Cli {
        /// Also verifies that every mapped glyph exists in the glyph source
        #[arg(long)]
        pub glyphs: bool,

        /// The glyph style variant to check against
        #[arg(long, default_value_t)]
        pub style: Style,
    }
}

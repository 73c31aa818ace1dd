//! Command-line options and subcommands.

use funcstuff_core::error::report::{ColorOpt, ErrorFormat};
use git_version::git_version;

use crate::{
    completions::GenCompletionsCommand, instances::InstancesCommand, to_nix::ToNixCommand,
};

#[derive(clap::Parser, Debug)]
/// Runtime typeclasses over configuration values.
#[command(
    author,
    about,
    long_about = None,
    version = format!(
        "{} {} (rev {})",
        env!("CARGO_BIN_NAME"),
        env!("CARGO_PKG_VERSION"),
        // release tarballs carry no git metadata
        git_version!(fallback = "cargorel")
    )
)]
pub struct Options {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Parser, Debug)]
pub struct GlobalOptions {
    /// Configure when to output messages in color
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: clap::ColorChoice,

    /// Output format of error reports
    #[arg(long, global = true, value_enum, default_value_t)]
    pub error_format: ErrorFormat,
}

impl GlobalOptions {
    pub fn color_opt(&self) -> ColorOpt {
        match self.color {
            clap::ColorChoice::Auto => ColorOpt::Auto,
            clap::ColorChoice::Always => ColorOpt::Always,
            clap::ColorChoice::Never => ColorOpt::Never,
        }
    }
}

/// Available subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Decode a configuration file and print it as a Nix expression
    ToNix(ToNixCommand),
    /// List the capabilities of the built-in types
    Instances(InstancesCommand),
    /// Generate shell completion files
    GenCompletions(GenCompletionsCommand),
}

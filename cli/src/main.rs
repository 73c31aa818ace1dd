//! Entry point of the program.

mod cli;
mod completions;
mod error;
mod instances;
mod to_nix;

use crate::cli::{Command, Options};

fn main() {
    env_logger::init();

    let opts = <Options as clap::Parser>::parse();

    let result = match opts.command {
        Command::ToNix(to_nix) => to_nix.run(&opts.global),
        Command::Instances(instances) => instances.run(&opts.global),
        Command::GenCompletions(completions) => {
            completions.run(&opts.global);
            Ok(())
        }
    };

    if let Err(error) = result {
        error.report(&opts.global);
        std::process::exit(1);
    }
}

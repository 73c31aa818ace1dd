use std::{io::Write, path::PathBuf};

use funcstuff_core::{
    deserialize::{self, InputFormat},
    typeclass::{builtins, Registry},
};

use crate::{cli::GlobalOptions, error::CliResult};

#[derive(clap::Parser, Debug)]
pub struct ToNixCommand {
    /// Input file, omit to read from stdin
    pub file: Option<PathBuf>,

    /// Format of the input. Guessed from the file extension when omitted, JSON otherwise
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,
}

impl ToNixCommand {
    pub fn run(self, _: &GlobalOptions) -> CliResult<()> {
        let value = match &self.file {
            Some(path) => deserialize::from_path(path, self.format)?,
            None => {
                deserialize::from_reader(std::io::stdin().lock(), self.format.unwrap_or_default())?
            }
        };
        log::debug!("decoded a value of type {}", value.type_of());

        let nix = builtins::to_nix(Registry::global(), &value)?;
        writeln!(std::io::stdout().lock(), "{nix}")?;

        Ok(())
    }
}

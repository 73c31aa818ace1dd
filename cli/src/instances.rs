use std::io::Write;

use funcstuff_core::{typ::Type, typeclass::Registry};

use crate::{cli::GlobalOptions, error::CliResult};

#[derive(clap::Parser, Debug)]
pub struct InstancesCommand {
    /// Only show this type, e.g. `Maybe` or `Integer`
    pub typ: Option<String>,

    /// Only list the capabilities registered on the type itself, not those inherited from its
    /// parents
    #[arg(long)]
    pub own: bool,
}

impl InstancesCommand {
    pub fn run(self, _: &GlobalOptions) -> CliResult<()> {
        let types = match &self.typ {
            Some(name) => vec![name.parse::<Type>()?],
            None => Type::ALL.to_vec(),
        };

        let registry = Registry::global();
        let mut stdout = std::io::stdout().lock();

        for typ in types {
            let capabilities = if self.own {
                registry.own_capabilities(typ)
            } else {
                registry.capabilities_of(typ)
            };

            let names: Vec<&str> = capabilities.iter().map(|cap| cap.name().label()).collect();
            if names.is_empty() {
                writeln!(stdout, "{typ}: -")?;
            } else {
                writeln!(stdout, "{typ}: {}", names.join(", "))?;
            }
        }

        Ok(())
    }
}

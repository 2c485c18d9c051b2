//! # Id Subcommand
//!
//! Derives the identifiers scenario files and hosts refer to by name.
//!
//! ```bash
//! cdon id round spring-campaign
//! cdon id principal alice
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};

use cdon_core::{Principal, RoundId};

/// Arguments for the id subcommand.
#[derive(Args, Debug)]
pub struct IdArgs {
    #[command(subcommand)]
    pub command: IdCommand,
}

/// Which kind of identifier to derive.
#[derive(Subcommand, Debug)]
pub enum IdCommand {
    /// Round id from a label (SHA-256 of the UTF-8 bytes).
    Round {
        /// Human-chosen round label.
        label: String,
    },
    /// Principal address from a name, as scenario files resolve it.
    Principal {
        /// Principal name.
        name: String,
    },
}

/// Derive the requested identifier as a `0x` hex string.
pub fn derive(command: &IdCommand) -> String {
    match command {
        IdCommand::Round { label } => RoundId::from_label(label).to_hex(),
        IdCommand::Principal { name } => Principal::from_name(name).to_hex(),
    }
}

/// Execute the id subcommand.
pub fn run_id(args: &IdArgs) -> Result<u8> {
    println!("{}", derive(&args.command));
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_id_matches_core() {
        let cmd = IdCommand::Round {
            label: "spring".into(),
        };
        assert_eq!(derive(&cmd), RoundId::from_label("spring").to_hex());
        assert_eq!(derive(&cmd).len(), 66);
    }

    #[test]
    fn principal_is_twenty_bytes() {
        let cmd = IdCommand::Principal {
            name: "alice".into(),
        };
        assert_eq!(derive(&cmd).len(), 42);
    }
}

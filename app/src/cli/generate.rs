//! `generate` subcommands: fresh client ids and Reality short ids.
//!
//! Both reuse the launcher's own generators, so the output has exactly the
//! shape a normal run would produce.

use clap::{Parser, Subcommand};
use xr_core::credentials::{generate_client_id, generate_short_id};

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    #[command(subcommand)]
    pub command: GenerateCommands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum GenerateCommands {
    /// Random v4 UUID for VLESS_UUID / VMESS_UUID
    Uuid,
    /// 16 hex characters for the Reality shortIds list
    ShortId,
}

pub fn render(cmd: &GenerateCommands) -> String {
    match cmd {
        GenerateCommands::Uuid => generate_client_id(None),
        GenerateCommands::ShortId => generate_short_id(),
    }
}

pub fn run(args: GenerateArgs) {
    println!("{}", render(&args.command));
}

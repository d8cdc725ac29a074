pub mod generate;
pub mod link;
pub mod run;
pub mod version;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "xray-runner", version)]
#[command(about = "Launch and supervise an Xray-core VLESS+Reality or VMess node", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Flags for the default `run` command
    #[command(flatten)]
    pub run: run::RunArgs,
}

impl Args {
    /// The subcommand to execute; bare invocation means `run`.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Run(self.run))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the engine, write config and link, then supervise it (default)
    Run(run::RunArgs),
    /// 生成客户端 ID 或 Reality short id
    Generate(generate::GenerateArgs),
    /// Print the share link from the last run
    Link(link::LinkArgs),
    /// Print version information
    Version,
}

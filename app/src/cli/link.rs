use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use xr_config::ProtocolKind;
use xr_core::EnginePaths;

#[derive(Parser, Debug)]
pub struct LinkArgs {
    /// Directory the launcher ran in [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Fail unless the stored link is for this protocol
    #[arg(long)]
    pub protocol: Option<ProtocolKind>,
}

fn scheme_of(kind: ProtocolKind) -> &'static str {
    match kind {
        ProtocolKind::VlessReality => "vless://",
        ProtocolKind::VMess => "vmess://",
    }
}

/// Read the stored share link from `dir`.
pub fn read_link(dir: &Path, expect: Option<ProtocolKind>) -> Result<String> {
    let path = EnginePaths::in_dir(dir).results;
    let link = std::fs::read_to_string(&path)
        .with_context(|| format!("read {} (has the launcher run here?)", path.display()))?;
    let link = link.trim().to_string();
    if let Some(kind) = expect {
        if !link.starts_with(scheme_of(kind)) {
            bail!("{} does not hold a {kind} link", path.display());
        }
    }
    Ok(link)
}

pub fn run(args: LinkArgs) -> Result<()> {
    let dir = match args.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("read current directory")?,
    };
    println!("{}", read_link(&dir, args.protocol)?);
    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use xr_config::ProtocolKind;
use xr_core::fetcher::ArtifactSpec;
use xr_types::ports::http::HttpClient;

use crate::bootstrap;
use crate::reqwest_http::ReqwestHttpClient;
use crate::settings::LauncherSettings;

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Protocol variant to serve
    #[arg(long, env = "XR_PROTOCOL", default_value_t = ProtocolKind::VlessReality)]
    pub protocol: ProtocolKind,

    /// Directory holding the engine, config and link files [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Discard the engine's stdout/stderr
    #[arg(long)]
    pub quiet: bool,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let settings = LauncherSettings::from_env()?;
    let workdir = bootstrap::resolve_workdir(args.workdir.as_deref())?;
    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::new().context("build HTTP client")?);

    let prepared = bootstrap::prepare(
        http.clone(),
        ArtifactSpec::default(),
        &settings,
        args.protocol,
        &workdir,
    )
    .await?;

    println!("{}", bootstrap::banner(&prepared));

    bootstrap::serve(http, &settings, &prepared, args.quiet).await
}

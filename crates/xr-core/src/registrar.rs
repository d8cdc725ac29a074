//! Optional node registration with a remote inventory API.
//!
//! Nothing in here can stop the launcher: every failure ends up as a
//! [`RegistrationOutcome`] that the caller logs and moves past.
//!
//! Endpoint resolution, first match wins:
//! 1. opt-out flag set → skip, no request at all
//! 2. explicit endpoint → use it
//! 3. stdin is a terminal → ask, bounded by [`PROMPT_TIMEOUT`]
//! 4. otherwise → skip

use crate::error::LauncherError;
use serde_json::json;
use std::fmt;
use std::future::Future;
use std::io::{self, BufRead, Write};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use xr_config::{node_name, ProtocolVariant, ServerIdentity};
use xr_types::ports::http::{HttpClient, HttpRequest};

pub const REGISTRATION_TIMEOUT_SECS: u64 = 10;
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrarSettings {
    /// Opt-out flag (`SKIP_NODE_UPLOAD`).
    pub skip: bool,
    /// Explicit endpoint (`NODE_API_URL`).
    pub api_url: Option<String>,
    /// Endpoint offered as choice 1 in the prompt; hidden when unset.
    pub default_api_url: Option<String>,
    /// Whether stdin is an interactive terminal.
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OptedOut,
    NonInteractive,
    Declined,
    PromptTimedOut,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OptedOut => "SKIP_NODE_UPLOAD is set",
            Self::NonInteractive => "no endpoint configured and stdin is not a terminal",
            Self::Declined => "operator declined",
            Self::PromptTimedOut => "no answer within the prompt timeout",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointDecision {
    Use(String),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered { status: u16 },
    Skipped(SkipReason),
    Failed(String),
}

/// Boxed future yielding one operator line, `None` at end of input.
pub type AnswerFuture<'a> = Pin<Box<dyn Future<Output = io::Result<Option<String>>> + Send + 'a>>;

/// Where prompt answers come from, one line per call.
pub trait AnswerSource {
    fn next_answer(&mut self) -> AnswerFuture<'_>;
}

impl<R> AnswerSource for Lines<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn next_answer(&mut self) -> AnswerFuture<'_> {
        Box::pin(self.next_line())
    }
}

/// The process's stdin, read on a detached thread per answer.
///
/// A line that never arrives leaves only that thread blocked; the runtime
/// can still shut down once the prompt has timed out.
#[derive(Debug, Default)]
pub struct StdinAnswers;

impl AnswerSource for StdinAnswers {
    fn next_answer(&mut self) -> AnswerFuture<'_> {
        let (tx, rx) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("prompt-stdin".into())
            .spawn(move || {
                let mut line = String::new();
                let read = match std::io::stdin().lock().read_line(&mut line) {
                    Ok(0) => Ok(None),
                    Ok(_) => Ok(Some(line)),
                    Err(e) => Err(e),
                };
                let _ = tx.send(read);
            });
        match spawned {
            Ok(_) => Box::pin(async move { rx.await.unwrap_or(Ok(None)) }),
            Err(e) => Box::pin(std::future::ready(Err(e))),
        }
    }
}

enum Answer {
    Line(String),
    Closed,
    TimedOut,
}

async fn read_answer<S>(source: &mut S, wait: Duration) -> Answer
where
    S: AnswerSource,
{
    match tokio::time::timeout(wait, source.next_answer()).await {
        Ok(Ok(Some(line))) => Answer::Line(line.trim().to_string()),
        Ok(Ok(None)) => Answer::Closed,
        Ok(Err(e)) => {
            debug!(error = %e, "prompt read failed");
            Answer::Closed
        }
        Err(_) => Answer::TimedOut,
    }
}

/// `10s` for whole seconds, `300ms` and the like otherwise.
fn countdown_label(wait: Duration) -> String {
    if wait.subsec_nanos() == 0 {
        format!("{}s", wait.as_secs())
    } else {
        format!("{wait:?}")
    }
}

/// Print a prompt without a trailing newline so the answer lands on the
/// same line.
fn ask(prompt: &str) {
    print!("{prompt}");
    let _ = std::io::stdout().flush();
}

/// Ask the operator where to register. Each read is bounded by `wait`; a
/// timeout counts as "skip".
pub async fn prompt_for_endpoint<R>(
    input: R,
    default_api_url: Option<&str>,
    wait: Duration,
) -> EndpointDecision
where
    R: AsyncBufRead + Unpin + Send,
{
    prompt_with(&mut input.lines(), default_api_url, wait).await
}

async fn prompt_with<S>(source: &mut S, default_api_url: Option<&str>, wait: Duration) -> EndpointDecision
where
    S: AnswerSource,
{
    println!("==========================================");
    println!("Node upload");
    println!("==========================================");
    match default_api_url {
        Some(url) => println!("1. Use default API ({url})"),
        None => println!("1. Use default API (not configured)"),
    }
    println!("2. Enter custom API URL");
    println!("3. Skip (Enter or anything else)");
    ask(&format!("Choice ({}): ", countdown_label(wait)));

    let choice = match read_answer(source, wait).await {
        Answer::Line(choice) => choice,
        Answer::Closed => return EndpointDecision::Skip(SkipReason::Declined),
        Answer::TimedOut => return EndpointDecision::Skip(SkipReason::PromptTimedOut),
    };

    match choice.as_str() {
        "1" => match default_api_url {
            Some(url) => EndpointDecision::Use(url.to_string()),
            None => EndpointDecision::Skip(SkipReason::Declined),
        },
        "2" => {
            ask("API URL: ");
            match read_answer(source, wait).await {
                Answer::Line(url) if !url.is_empty() => EndpointDecision::Use(url),
                Answer::TimedOut => EndpointDecision::Skip(SkipReason::PromptTimedOut),
                _ => EndpointDecision::Skip(SkipReason::Declined),
            }
        }
        _ => EndpointDecision::Skip(SkipReason::Declined),
    }
}

/// Apply the resolution order from the module docs. `input` is only read
/// when the prompt is actually shown.
pub async fn resolve_endpoint<R>(settings: &RegistrarSettings, input: R, wait: Duration) -> EndpointDecision
where
    R: AsyncBufRead + Unpin + Send,
{
    resolve_with(settings, &mut input.lines(), wait).await
}

async fn resolve_with<S>(settings: &RegistrarSettings, source: &mut S, wait: Duration) -> EndpointDecision
where
    S: AnswerSource,
{
    if settings.skip {
        return EndpointDecision::Skip(SkipReason::OptedOut);
    }
    if let Some(url) = settings.api_url.as_deref().filter(|u| !u.trim().is_empty()) {
        return EndpointDecision::Use(url.trim().to_string());
    }
    if !settings.interactive {
        return EndpointDecision::Skip(SkipReason::NonInteractive);
    }
    prompt_with(source, settings.default_api_url.as_deref(), wait).await
}

pub struct NodeRegistrar {
    http: Arc<dyn HttpClient>,
    settings: RegistrarSettings,
    prompt_timeout: Duration,
}

impl NodeRegistrar {
    pub fn new(http: Arc<dyn HttpClient>, settings: RegistrarSettings) -> Self {
        Self {
            http,
            settings,
            prompt_timeout: PROMPT_TIMEOUT,
        }
    }

    pub fn with_prompt_timeout(mut self, wait: Duration) -> Self {
        self.prompt_timeout = wait;
        self
    }

    /// Register using the process's stdin for the prompt.
    pub async fn register(
        &self,
        link: &str,
        identity: &ServerIdentity,
        variant: &ProtocolVariant,
    ) -> RegistrationOutcome {
        self.register_with(link, identity, variant, &mut StdinAnswers).await
    }

    /// Register, reading prompt answers from `input`.
    pub async fn register_with_input<R>(
        &self,
        link: &str,
        identity: &ServerIdentity,
        variant: &ProtocolVariant,
        input: R,
    ) -> RegistrationOutcome
    where
        R: AsyncBufRead + Unpin + Send,
    {
        self.register_with(link, identity, variant, &mut input.lines()).await
    }

    async fn register_with<S>(
        &self,
        link: &str,
        identity: &ServerIdentity,
        variant: &ProtocolVariant,
        source: &mut S,
    ) -> RegistrationOutcome
    where
        S: AnswerSource,
    {
        let url = match resolve_with(&self.settings, source, self.prompt_timeout).await {
            EndpointDecision::Use(url) => url,
            EndpointDecision::Skip(reason) => {
                info!(%reason, "skipping node upload");
                return RegistrationOutcome::Skipped(reason);
            }
        };

        let name = node_name(&identity.public_ip, variant, identity.listen_port);
        info!(%url, node = %name, "uploading node to inventory API");

        match self.post(&url, &name, link).await {
            Ok(status) => {
                info!(status, "node uploaded");
                RegistrationOutcome::Registered { status }
            }
            Err(e) => {
                warn!(error = %e, "node upload failed, server keeps running");
                RegistrationOutcome::Failed(e.to_string())
            }
        }
    }

    async fn post(&self, url: &str, name: &str, link: &str) -> Result<u16, LauncherError> {
        let body = serde_json::to_vec(&json!({ "name": name, "config": link }))
            .map_err(|e| LauncherError::RegistrationFailed(e.to_string()))?;
        let rsp = self
            .http
            .execute(HttpRequest::post_json(url, body, REGISTRATION_TIMEOUT_SECS))
            .await
            .map_err(|e| LauncherError::RegistrationFailed(e.to_string()))?;

        let text = rsp.text();
        if !text.is_empty() {
            debug!(response = %text, "inventory API response");
        }
        if rsp.is_success() {
            Ok(rsp.status)
        } else {
            Err(LauncherError::RegistrationFailed(format!(
                "HTTP {}: {}",
                rsp.status,
                text.trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn opt_out_wins_over_everything() {
        let settings = RegistrarSettings {
            skip: true,
            api_url: Some("http://inventory.test/nodes".into()),
            default_api_url: Some("http://default.test/nodes".into()),
            interactive: true,
        };
        let decision = resolve_endpoint(&settings, &b"1\n"[..], WAIT).await;
        assert_eq!(decision, EndpointDecision::Skip(SkipReason::OptedOut));
    }

    #[tokio::test]
    async fn explicit_url_skips_prompt() {
        let settings = RegistrarSettings {
            api_url: Some(" http://inventory.test/nodes ".into()),
            interactive: true,
            ..Default::default()
        };
        let decision = resolve_endpoint(&settings, &b"3\n"[..], WAIT).await;
        assert_eq!(decision, EndpointDecision::Use("http://inventory.test/nodes".into()));
    }

    #[tokio::test]
    async fn non_interactive_without_url_skips() {
        let decision = resolve_endpoint(&RegistrarSettings::default(), &b"1\n"[..], WAIT).await;
        assert_eq!(decision, EndpointDecision::Skip(SkipReason::NonInteractive));
    }

    #[tokio::test]
    async fn prompt_choices() {
        let default = Some("http://default.test/nodes");
        assert_eq!(
            prompt_for_endpoint(&b"1\n"[..], default, WAIT).await,
            EndpointDecision::Use("http://default.test/nodes".into())
        );
        assert_eq!(
            prompt_for_endpoint(&b"2\nhttp://custom.test/api\n"[..], default, WAIT).await,
            EndpointDecision::Use("http://custom.test/api".into())
        );
        assert_eq!(
            prompt_for_endpoint(&b"2\n\n"[..], default, WAIT).await,
            EndpointDecision::Skip(SkipReason::Declined)
        );
        assert_eq!(
            prompt_for_endpoint(&b"\n"[..], default, WAIT).await,
            EndpointDecision::Skip(SkipReason::Declined)
        );
        assert_eq!(
            prompt_for_endpoint(&b""[..], default, WAIT).await,
            EndpointDecision::Skip(SkipReason::Declined)
        );
        // choice 1 without a configured default is a skip
        assert_eq!(
            prompt_for_endpoint(&b"1\n"[..], None, WAIT).await,
            EndpointDecision::Skip(SkipReason::Declined)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn silent_terminal_times_out() {
        // One end of a pipe nobody writes to.
        let (_keep_open, reader) = tokio::io::duplex(64);
        let reader = tokio::io::BufReader::new(reader);
        let decision = prompt_for_endpoint(reader, None, PROMPT_TIMEOUT).await;
        assert_eq!(decision, EndpointDecision::Skip(SkipReason::PromptTimedOut));
    }

    #[test]
    fn countdown_keeps_sub_second_waits() {
        assert_eq!(countdown_label(PROMPT_TIMEOUT), "10s");
        assert_eq!(countdown_label(Duration::from_millis(300)), "300ms");
        assert_eq!(countdown_label(Duration::from_millis(1500)), "1.5s");
    }
}

//! Client for the local AI assistant service.
//!
//! Every request first checks `/health`; if the service is down, slow, or
//! answers with something unusable, the client answers from a canned set of
//! offline tips instead. No failure in this module is fatal.

use crate::error::WurpError;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const QUERY_TIMEOUT: Duration = Duration::from_secs(30);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;

/// The assistant verbs with their own prompt template and offline tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiSubcommand {
    Explain,
    Suggest,
    Debug,
    Code,
    Review,
    Optimise,
    Test,
}

impl AiSubcommand {
    pub const ALL: [AiSubcommand; 7] = [
        Self::Explain,
        Self::Suggest,
        Self::Debug,
        Self::Code,
        Self::Review,
        Self::Optimise,
        Self::Test,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "explain" => Some(Self::Explain),
            "suggest" => Some(Self::Suggest),
            "debug" => Some(Self::Debug),
            "code" => Some(Self::Code),
            "review" => Some(Self::Review),
            "optimise" | "optimize" => Some(Self::Optimise),
            "test" => Some(Self::Test),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Explain => "explain",
            Self::Suggest => "suggest",
            Self::Debug => "debug",
            Self::Code => "code",
            Self::Review => "review",
            Self::Optimise => "optimise",
            Self::Test => "test",
        }
    }

    /// Wraps the user's text in the instruction sent upstream.
    pub fn phrase(self, prompt: &str) -> String {
        match self {
            Self::Explain => format!("Explain what this shell command does, step by step: {}", prompt),
            Self::Suggest => format!("Suggest shell commands to accomplish this task: {}", prompt),
            Self::Debug => format!("Help debug this error and suggest a fix: {}", prompt),
            Self::Code => format!("Write code for the following request: {}", prompt),
            Self::Review => format!("Review this code or command and point out problems: {}", prompt),
            Self::Optimise => format!("Suggest optimisations for this command or code: {}", prompt),
            Self::Test => format!("Write tests for the following code: {}", prompt),
        }
    }

    /// Offline tip used when the service cannot answer.
    pub fn fallback(self, prompt: &str) -> String {
        match self {
            Self::Explain => format!(
                "📖 Command explanation for: {}\n\
                 This is a local fallback explanation.\n\
                 • Run 'man <command>' for the full manual\n\
                 • Most commands describe their flags with '--help'",
                prompt
            ),
            Self::Suggest => format!(
                "💡 Suggestions for: {}\n\
                 • Try using 'man' command for documentation\n\
                 • Use '--help' flag for command options",
                prompt
            ),
            Self::Debug => format!(
                "🔍 Debug help for: {}\n\
                 • Check error logs\n\
                 • Verify command syntax\n\
                 • Check file permissions",
                prompt
            ),
            Self::Code => format!(
                "🧩 Code help for: {}\n\
                 • Start from the smallest working example\n\
                 • Check the language's standard library before adding dependencies",
                prompt
            ),
            Self::Review => format!(
                "🔎 Review checklist for: {}\n\
                 • Are errors handled rather than ignored?\n\
                 • Are inputs validated and quoted?\n\
                 • Is there a test covering the change?",
                prompt
            ),
            Self::Optimise => format!(
                "⚡ Optimisation tips for: {}\n\
                 • Measure before changing anything ('time <command>')\n\
                 • Avoid spawning processes inside tight loops\n\
                 • Prefer streaming over loading whole files",
                prompt
            ),
            Self::Test => format!(
                "🧪 Testing tips for: {}\n\
                 • Cover the empty and boundary inputs first\n\
                 • Keep each test to one behaviour\n\
                 • Replace network and disk access with test doubles",
                prompt
            ),
        }
    }
}

/// Tip for subcommands outside the known set.
fn generic_fallback(subcommand: &str, prompt: &str) -> String {
    let known: Vec<&str> = AiSubcommand::ALL.iter().map(|s| s.name()).collect();
    format!(
        "🤔 No offline tips for '{}': {}\n\
         • Known subcommands: {}",
        subcommand,
        prompt,
        known.join(", ")
    )
}

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplySource {
    Remote { provider: String, cost: f64 },
    LocalFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AiReply {
    pub text: String,
    pub source: ReplySource,
}

impl AiReply {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ReplySource::LocalFallback)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    success: bool,
    content: Option<String>,
    provider: Option<String>,
    cost: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub name: String,
    #[serde(default)]
    pub is_healthy: bool,
    #[serde(default)]
    pub requests_today: u64,
    #[serde(default)]
    pub cost_today: f64,
}

pub struct AiClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
    fallback_delay: Duration,
}

impl AiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), base_url)
    }

    /// Creates a client over any transport (used by tests).
    pub fn with_http_client(http: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            fallback_delay: Duration::from_millis(500),
        }
    }

    /// Pause applied before an offline answer is returned.
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Asks the assistant. An empty prompt is rejected before any request;
    /// every other failure degrades to the offline tip.
    pub async fn query(&self, subcommand: &str, prompt: &str) -> Result<AiReply, WurpError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(WurpError::EmptyPrompt);
        }

        let known = AiSubcommand::parse(subcommand);
        let phrased = match known {
            Some(sub) => sub.phrase(prompt),
            None => prompt.to_string(),
        };

        match self.generate(&phrased).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!("AI service unavailable, using local fallback: {:#}", e);
                Ok(self.local_fallback(known, subcommand, prompt).await)
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<AiReply> {
        let health = self.http.get(&self.url("/health"), QUERY_TIMEOUT).await?;
        if !health.is_success() {
            return Err(anyhow!("health check returned {}", health.status));
        }

        let body = json!({
            "prompt": prompt,
            "maxTokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });
        let response = self
            .http
            .post_json(
                &self.url("/api/ai/generate"),
                &[("Accept", "application/json")],
                &body,
                QUERY_TIMEOUT,
            )
            .await?;
        if !response.is_success() {
            return Err(anyhow!("generate returned {}", response.status));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&response.body).context("malformed generate response")?;
        if !parsed.success {
            return Err(anyhow!("service reported failure"));
        }
        let text = parsed
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("generate response had no content"))?;

        let provider = parsed.provider.unwrap_or_else(|| "unknown".to_string());
        info!("AI reply from provider {}", provider);
        Ok(AiReply {
            text,
            source: ReplySource::Remote {
                provider,
                cost: parsed.cost.unwrap_or(0.0),
            },
        })
    }

    async fn local_fallback(&self, known: Option<AiSubcommand>, subcommand: &str, prompt: &str) -> AiReply {
        tokio::time::sleep(self.fallback_delay).await;
        let text = match known {
            Some(sub) => sub.fallback(prompt),
            None => generic_fallback(subcommand, prompt),
        };
        AiReply {
            text,
            source: ReplySource::LocalFallback,
        }
    }

    /// Short check of `/health`.
    pub async fn check_health(&self) -> bool {
        match self.http.get(&self.url("/health"), HEALTH_TIMEOUT).await {
            Ok(response) => response.is_success(),
            Err(e) => {
                debug!("Health check failed: {}", e);
                false
            }
        }
    }

    /// Prints per-provider counters and today's spend. Stops at the first
    /// failure; lines already written stay written.
    pub async fn status_report<W: Write>(&self, out: &mut W) -> Result<()> {
        if let Err(e) = self.write_status(out).await {
            writeln!(out, "❌ Could not fetch AI status: {:#}", e)?;
        }
        Ok(())
    }

    async fn write_status<W: Write>(&self, out: &mut W) -> Result<()> {
        let response = self.http.get(&self.url("/api/ai/status"), QUERY_TIMEOUT).await?;
        if !response.is_success() {
            return Err(anyhow!("status endpoint returned {}", response.status));
        }
        let providers: Vec<ProviderStatus> =
            serde_json::from_str(&response.body).context("malformed status response")?;

        writeln!(out, "📊 AI provider status:")?;
        for provider in &providers {
            writeln!(
                out,
                "  {} {}: {} requests today, ${:.4}",
                if provider.is_healthy { "✅" } else { "❌" },
                provider.name,
                provider.requests_today,
                provider.cost_today
            )?;
        }

        let response = self.http.get(&self.url("/api/ai/spend"), QUERY_TIMEOUT).await?;
        if !response.is_success() {
            return Err(anyhow!("spend endpoint returned {}", response.status));
        }
        let spend: f64 = response
            .body
            .trim()
            .parse()
            .with_context(|| format!("malformed spend value '{}'", response.body.trim()))?;
        writeln!(out, "💰 Total spend today: ${:.2}", spend)?;
        Ok(())
    }

    /// The `ai` built-in: `ai <subcommand> <text...>`, `ai status`, `ai health`.
    pub async fn handle_command<W: Write>(&self, args: &[&str], out: &mut W) -> Result<()> {
        let Some(first) = args.first() else {
            let names: Vec<&str> = AiSubcommand::ALL.iter().map(|s| s.name()).collect();
            writeln!(out, "AI command requires subcommand ({})", names.join(", "))?;
            return Ok(());
        };

        let subcommand = first.to_lowercase();
        match subcommand.as_str() {
            "status" => return self.status_report(out).await,
            "health" => {
                if self.check_health().await {
                    writeln!(out, "✅ AI service is available at {}", self.base_url)?;
                } else {
                    writeln!(out, "❌ AI service is not reachable at {}", self.base_url)?;
                }
                return Ok(());
            }
            _ => {}
        }

        let prompt = args[1..].join(" ");
        writeln!(out, "🤖 AI {}: {}", subcommand, prompt)?;

        match self.query(&subcommand, &prompt).await {
            Ok(reply) => match reply.source {
                ReplySource::Remote { provider, cost } => {
                    writeln!(out, "✨ {}", reply.text)?;
                    writeln!(out, "   via {} (${:.4})", provider, cost)?;
                }
                ReplySource::LocalFallback => {
                    writeln!(out, "🔧 AI service not available - using local fallback")?;
                    writeln!(out, "{}", reply.text)?;
                }
            },
            Err(e) => {
                writeln!(out, "❌ {}", e)?;
                writeln!(out, "Usage: ai {} <text>", subcommand)?;
            }
        }
        Ok(())
    }
}

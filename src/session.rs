//! The interactive read-eval loop and one-shot command dispatch.
//!
//! Input arrives as [`InputEvent`]s so that Ctrl-C is just another event the
//! loop can acknowledge and discard. Production input races stdin against a
//! Ctrl-C listener that lives as long as the session; tests feed a scripted
//! queue.

use crate::{
    command_router::{classify, Builtin, CommandRouter, Route, SessionState},
    theme::ThemeRegistry,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, warn};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    /// Ctrl-C, at the prompt or since the previous prompt.
    Interrupt,
    Eof,
}

#[async_trait]
pub trait InputSource: Send {
    async fn next_event(&mut self) -> Result<InputEvent>;
}

/// Ctrl-C listener registered once for the whole session. A Ctrl-C that
/// arrives while nothing is reading input (a running command, an AI call) is
/// held and reported at the next prompt instead of being lost.
struct Interrupts {
    #[cfg(unix)]
    signal: tokio::signal::unix::Signal,
    #[cfg(windows)]
    signal: tokio::signal::windows::CtrlC,
}

impl Interrupts {
    fn listen() -> Result<Self> {
        #[cfg(unix)]
        let signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
        #[cfg(windows)]
        let signal = tokio::signal::windows::ctrl_c()?;
        Ok(Self { signal })
    }

    async fn recv(&mut self) -> Option<()> {
        self.signal.recv().await
    }
}

/// Reads lines from stdin, turning Ctrl-C into [`InputEvent::Interrupt`].
pub struct StdinSource<R = BufReader<Stdin>> {
    lines: Lines<R>,
    interrupts: Interrupts,
}

impl StdinSource<BufReader<Stdin>> {
    /// Must be called inside the tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> StdinSource<R> {
    /// Reads lines from `reader` instead of stdin.
    pub fn with_reader(reader: R) -> Result<Self> {
        Ok(Self {
            lines: reader.lines(),
            interrupts: Interrupts::listen()?,
        })
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> InputSource for StdinSource<R> {
    async fn next_event(&mut self) -> Result<InputEvent> {
        tokio::select! {
            line = self.lines.next_line() => Ok(match line? {
                Some(line) => InputEvent::Line(line),
                None => InputEvent::Eof,
            }),
            received = self.interrupts.recv() => match received {
                Some(()) => Ok(InputEvent::Interrupt),
                None => Err(anyhow!("interrupt listener closed")),
            },
        }
    }
}

/// Input replayed from a fixed queue; an empty queue reads as end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// One `Line` event per string.
    pub fn lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(lines.into_iter().map(|l| InputEvent::Line(l.to_string())))
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_event(&mut self) -> Result<InputEvent> {
        Ok(self.events.pop_front().unwrap_or(InputEvent::Eof))
    }
}

fn is_exit(line: &str) -> bool {
    let line = line.trim().to_lowercase();
    line == "exit" || line == "quit"
}

pub struct InteractiveSession {
    router: CommandRouter,
    state: SessionState,
}

impl InteractiveSession {
    pub fn new(router: CommandRouter, state: SessionState) -> Self {
        Self { router, state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Loops until `exit`/`quit` or end of input.
    pub async fn run<I: InputSource, W: Write>(&mut self, input: &mut I, out: &mut W) -> Result<()> {
        writeln!(out, "🎯 Interactive mode - Type commands or 'exit' to quit")?;
        writeln!(out, "Features: History, AI commands, themes\n")?;

        loop {
            write!(out, "{}> ", self.state.themes.prompt_string())?;
            out.flush()?;

            let line = match input.next_event().await? {
                InputEvent::Line(line) => line,
                InputEvent::Interrupt => {
                    writeln!(out, "\n👋 Use 'exit' to quit gracefully")?;
                    continue;
                }
                InputEvent::Eof => {
                    debug!("End of input");
                    writeln!(out)?;
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            if is_exit(&line) {
                writeln!(out, "👋 Goodbye!")?;
                break;
            }

            // `history` itself is not recorded
            if classify(&line) != Route::Intercepted(Builtin::History) {
                self.record(&line);
            }

            self.router.dispatch(&line, &mut self.state, out).await?;
            writeln!(out)?;
        }

        info!("Session ended with {} history entries", self.state.history.len());
        Ok(())
    }

    fn record(&mut self, line: &str) {
        if let Err(e) = self.state.history.append(line) {
            warn!("Could not save history: {}", e);
        }
    }
}

/// Non-interactive dispatch of `wurp <command> [args...]`. History is never
/// read or written on this path.
pub async fn run_one_shot<W: Write>(
    router: &CommandRouter,
    themes: &mut ThemeRegistry,
    args: &[String],
    out: &mut W,
) -> Result<()> {
    let Some(command) = args.first() else {
        return Ok(());
    };
    let rest: Vec<&str> = args[1..].iter().map(String::as_str).collect();

    match command.to_lowercase().as_str() {
        "ai" => router.ai().handle_command(&rest, out).await?,
        "theme" => CommandRouter::handle_theme_command(themes, &rest, out)?,
        "help" => write_help(out)?,
        "version" => writeln!(out, "Wurp (Warp Terminal Clone) v{}", VERSION)?,
        other => {
            writeln!(out, "Unknown command: {}", other)?;
            writeln!(out, "Run 'wurp help' for available commands.")?;
        }
    }
    Ok(())
}

pub fn write_help<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "🚀 Wurp (Warp Terminal Clone) - Help")?;
    writeln!(out, "═══════════════════════════════════")?;
    writeln!(out)?;
    writeln!(out, "Built-in Commands:")?;
    writeln!(out, "  ai explain <command>     - Explain a command")?;
    writeln!(out, "  ai suggest <task>        - Get command suggestions")?;
    writeln!(out, "  ai debug <error>         - Debug help")?;
    writeln!(out, "  ai code|review|optimise|test <text>")?;
    writeln!(out, "  ai status | ai health    - AI service status")?;
    writeln!(out, "  theme [name]             - Change/show theme")?;
    writeln!(out, "  clear                    - Clear screen")?;
    writeln!(out, "  history                  - Show command history")?;
    writeln!(out, "  help                     - Show this help")?;
    writeln!(out, "  exit/quit                - Exit terminal")?;
    writeln!(out)?;
    writeln!(out, "Anything else runs in your shell.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai_client::AiClient;
    use crate::executor::Executor;
    use crate::history::HistoryStore;
    use crate::http_client::mock::MockHttpClient;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn session_with(history: HistoryStore) -> InteractiveSession {
        let ai = AiClient::with_http_client(Arc::new(MockHttpClient::unreachable()), "http://localhost:5000")
            .with_fallback_delay(Duration::ZERO);
        let router = CommandRouter::new(ai, Executor::new("sh"));
        InteractiveSession::new(router, SessionState::new(ThemeRegistry::new(), history))
    }

    fn router() -> CommandRouter {
        let ai = AiClient::with_http_client(Arc::new(MockHttpClient::unreachable()), "http://localhost:5000")
            .with_fallback_delay(Duration::ZERO);
        CommandRouter::new(ai, Executor::new("sh"))
    }

    #[tokio::test]
    async fn test_exit_terminates_before_remaining_input() {
        let mut session = session_with(HistoryStore::in_memory());
        let mut input = ScriptedInput::lines(["EXIT", "echo never"]);
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        assert_eq!(input.remaining(), 1);
        assert!(String::from_utf8(out).unwrap().contains("👋 Goodbye!"));
        assert!(session.state().history.is_empty());
    }

    #[tokio::test]
    async fn test_interrupt_does_not_terminate() {
        let mut session = session_with(HistoryStore::in_memory());
        let mut input = ScriptedInput::new([
            InputEvent::Interrupt,
            InputEvent::Line("theme dark".to_string()),
            InputEvent::Line("quit".to_string()),
        ]);
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Use 'exit' to quit gracefully"));
        assert!(text.contains("Theme changed to: dark"));
        assert_eq!(session.state().themes.active_name(), "dark");
    }

    #[tokio::test]
    async fn test_blank_lines_are_not_recorded() {
        let mut session = session_with(HistoryStore::in_memory());
        let mut input = ScriptedInput::lines(["", "   ", "theme", "exit"]);
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        assert_eq!(session.state().history.entries(), &["theme".to_string()]);
    }

    #[tokio::test]
    async fn test_end_of_input_terminates() {
        let mut session = session_with(HistoryStore::in_memory());
        let mut input = ScriptedInput::default();
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        assert!(String::from_utf8(out).unwrap().contains("Interactive mode"));
    }

    #[tokio::test]
    async fn test_prompt_follows_active_theme() {
        let mut session = session_with(HistoryStore::in_memory());
        let mut input = ScriptedInput::lines(["theme wurp", "exit"]);
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[36mwurp\x1b[0m> "));
        assert!(text.contains("\x1b[96m❯\x1b[0m> "));
    }

    #[tokio::test]
    async fn test_history_survives_in_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history");
        let mut session = session_with(HistoryStore::open(&path));
        let mut input = ScriptedInput::lines(["echo one", "history", "exit"]);
        let mut out = Vec::new();

        session.run(&mut input, &mut out).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "echo one\n");
        assert_eq!(HistoryStore::open(&path).entries(), &["echo one".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_interrupt_while_busy_is_reported_at_next_prompt() {
        use tokio::io::AsyncWriteExt;

        let (reader, mut writer) = tokio::io::duplex(64);
        let mut input = StdinSource::with_reader(BufReader::new(reader)).unwrap();

        // Ctrl-C lands while nothing is reading input, as during a running command
        let status = std::process::Command::new("sh")
            .args(["-c", &format!("kill -INT {}", std::process::id())])
            .status()
            .unwrap();
        assert!(status.success());

        let event = tokio::time::timeout(Duration::from_secs(5), input.next_event())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, InputEvent::Interrupt);

        writer.write_all(b"ls\n").await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), input.next_event())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, InputEvent::Line("ls".to_string()));
    }

    #[tokio::test]
    async fn test_one_shot_version_and_unknown() {
        let router = router();
        let mut themes = ThemeRegistry::new();
        let mut out = Vec::new();

        run_one_shot(&router, &mut themes, &["version".to_string()], &mut out).await.unwrap();
        run_one_shot(&router, &mut themes, &["frobnicate".to_string()], &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(&format!("v{}", VERSION)));
        assert!(text.contains("Unknown command: frobnicate"));
        assert!(text.contains("wurp help"));
    }

    #[tokio::test]
    async fn test_one_shot_theme_and_help() {
        let router = router();
        let mut themes = ThemeRegistry::new();
        let mut out = Vec::new();

        run_one_shot(&router, &mut themes, &["theme".to_string(), "dark".to_string()], &mut out)
            .await
            .unwrap();
        run_one_shot(&router, &mut themes, &["HELP".to_string()], &mut out).await.unwrap();

        assert_eq!(themes.active_name(), "dark");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Built-in Commands:"));
    }

    #[tokio::test]
    async fn test_one_shot_ai_uses_fallback() {
        let router = router();
        let mut themes = ThemeRegistry::new();
        let args: Vec<String> = ["ai", "explain", "ls", "-la"].iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();

        run_one_shot(&router, &mut themes, &args, &mut out).await.unwrap();

        assert!(String::from_utf8(out).unwrap().contains("📖 Command explanation for: ls -la"));
    }
}

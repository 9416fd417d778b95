use crate::{
    ai_client::AiClient,
    config::Config,
    executor::Executor,
    history::{HistoryStore, DEFAULT_RECENT},
    theme::ThemeRegistry,
};
use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use std::io::Write;
use tracing::{debug, info};

/// Verbs handled inside the process instead of by the OS shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Builtin<'a> {
    Ai(Vec<&'a str>),
    Theme(Vec<&'a str>),
    Clear,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    Intercepted(Builtin<'a>),
    /// The untouched input line, for the shell.
    PassThrough(&'a str),
}

/// Decides from the first whitespace-delimited token (case-insensitive)
/// whether `line` is a built-in. Everything else, blank lines included,
/// passes through.
pub fn classify(line: &str) -> Route<'_> {
    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return Route::PassThrough(line);
    };
    let rest: Vec<&str> = tokens.collect();

    match verb.to_lowercase().as_str() {
        "ai" => Route::Intercepted(Builtin::Ai(rest)),
        "theme" => Route::Intercepted(Builtin::Theme(rest)),
        "clear" => Route::Intercepted(Builtin::Clear),
        "history" => Route::Intercepted(Builtin::History),
        _ => Route::PassThrough(line),
    }
}

/// Mutable state of one interactive run.
pub struct SessionState {
    pub themes: ThemeRegistry,
    pub history: HistoryStore,
}

impl SessionState {
    pub fn new(themes: ThemeRegistry, history: HistoryStore) -> Self {
        Self { themes, history }
    }
}

pub struct CommandRouter {
    ai: AiClient,
    executor: Executor,
}

impl CommandRouter {
    pub fn new(ai: AiClient, executor: Executor) -> Self {
        Self { ai, executor }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            AiClient::new(&config.service_url).with_fallback_delay(config.fallback_delay()),
            Executor::new(&config.shell),
        )
    }

    pub fn ai(&self) -> &AiClient {
        &self.ai
    }

    /// Runs one input line against the session state.
    pub async fn dispatch<W: Write>(&self, line: &str, state: &mut SessionState, out: &mut W) -> Result<()> {
        match classify(line) {
            Route::Intercepted(builtin) => {
                debug!("Built-in command: {:?}", builtin);
                match builtin {
                    Builtin::Ai(args) => self.ai.handle_command(&args, out).await,
                    Builtin::Theme(args) => Self::handle_theme_command(&mut state.themes, &args, out),
                    Builtin::Clear => Self::clear_screen(out),
                    Builtin::History => Self::show_history(&state.history, out),
                }
            }
            Route::PassThrough(line) => {
                self.executor.execute_passthrough(line, &state.themes, out).await?;
                Ok(())
            }
        }
    }

    /// `theme` shows the current and available themes; `theme <name>` switches.
    pub fn handle_theme_command<W: Write>(themes: &mut ThemeRegistry, args: &[&str], out: &mut W) -> Result<()> {
        let Some(name) = args.first() else {
            writeln!(out, "Current theme: {}", themes.active_name())?;
            writeln!(out, "Available themes:")?;
            for name in themes.names() {
                writeln!(out, "  • {}", name)?;
            }
            return Ok(());
        };

        match themes.set_active(name) {
            Ok(()) => {
                info!("Theme switched to {}", themes.active_name());
                writeln!(out, "✅ Theme changed to: {}", themes.active_name())?;
            }
            Err(e) => writeln!(out, "❌ {}", e)?,
        }
        Ok(())
    }

    fn show_history<W: Write>(history: &HistoryStore, out: &mut W) -> Result<()> {
        for (index, entry) in history.recent(DEFAULT_RECENT) {
            writeln!(out, "{:>3}: {}", index, entry)?;
        }
        Ok(())
    }

    fn clear_screen<W: Write>(out: &mut W) -> Result<()> {
        execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }
}

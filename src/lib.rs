//! Wurp - a small AI-assisted shell wrapper.
//!
//! Each input line is either handled by a built-in (`ai`, `theme`, `clear`,
//! `history`) or handed verbatim to the OS shell, with its output captured
//! and echoed back. The AI assistant is a local HTTP service; when it is not
//! reachable, canned offline tips are shown instead.
//!
//! # Architecture
//!
//! - [`config`] - Configuration file and environment overrides
//! - [`error`] - User-facing validation errors
//! - [`history`] - Command history mirrored to a bounded file
//! - [`theme`] - Color themes and the active-theme registry
//! - [`http_client`] - HTTP client abstraction
//! - [`ai_client`] - AI service client with local fallback
//! - [`executor`] - Pass-through execution in the OS shell
//! - [`command_router`] - Classifies and dispatches input lines
//! - [`session`] - Interactive loop and one-shot commands
//!
//! # Example
//!
//! ```ignore
//! use wurp::command_router::{CommandRouter, SessionState};
//! use wurp::config::Config;
//! use wurp::history::HistoryStore;
//! use wurp::session::{InteractiveSession, StdinSource};
//! use wurp::theme::ThemeRegistry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let state = SessionState::new(ThemeRegistry::new(), HistoryStore::open_resolved(config.history_path()));
//!     let mut session = InteractiveSession::new(CommandRouter::from_config(&config), state);
//!     session.run(&mut StdinSource::new()?, &mut std::io::stdout()).await
//! }
//! ```

pub mod ai_client;
pub mod command_router;
pub mod config;
pub mod error;
pub mod executor;
pub mod history;
pub mod http_client;
pub mod session;
pub mod theme;

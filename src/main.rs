use clap::{Arg, Command};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wurp::command_router::{CommandRouter, SessionState};
use wurp::config::Config;
use wurp::history::HistoryStore;
use wurp::session::{run_one_shot, InteractiveSession, StdinSource, VERSION};
use wurp::theme::ThemeRegistry;

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        println!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("WURP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> anyhow::Result<()> {
    let matches = Command::new("wurp")
        .version(VERSION)
        .about("AI-assisted terminal shell wrapper")
        .long_about("Runs shell commands with history, color themes and an AI assistant; with no command it starts an interactive session")
        .arg(Arg::new("command")
            .help("One-shot command: ai, theme, help or version")
            .num_args(1..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true))
        .arg(Arg::new("config")
            .long("config")
            .help("Show configuration information")
            .action(clap::ArgAction::SetTrue))
        .get_matches();

    if matches.get_flag("config") {
        Config::show_config_info()?;
        return Ok(());
    }

    let config = Config::load()?;
    let mut themes = ThemeRegistry::new();
    if let Err(e) = themes.set_active(&config.default_theme) {
        warn!("Ignoring configured theme: {}", e);
    }
    let router = CommandRouter::from_config(&config);

    println!("🚀 Wurp (Warp Terminal Clone) v{}", VERSION);
    println!("AI-Powered Terminal built with Rust");
    println!("═══════════════════════════════════════\n");

    let args: Vec<String> = matches
        .get_many::<String>("command")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();

    let mut stdout = std::io::stdout();

    if !args.is_empty() {
        info!("One-shot command: {:?}", args);
        return run_one_shot(&router, &mut themes, &args, &mut stdout).await;
    }

    let history = HistoryStore::open_resolved(config.history_path());
    info!("Loaded {} history entries", history.len());

    let mut session = InteractiveSession::new(router, SessionState::new(themes, history));
    session.run(&mut StdinSource::new()?, &mut stdout).await
}

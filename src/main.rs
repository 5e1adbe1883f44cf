use std::path::PathBuf;
use std::sync::Arc;

use announcements_core::render::{render_board_html, render_board_text};
use announcements_core::{BoardState, DismissedSet, ExtraMode};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hub_announcements::board::Board;
use hub_announcements::client::AnnouncementClient;
use hub_announcements::config::BoardConfig;

#[derive(Parser)]
#[command(name = "hubann")]
#[command(about = "Dismissible announcements from a JupyterHub announcement service")]
struct Cli {
    /// Hub base URL (overrides HUB_ANNOUNCEMENTS_URL)
    #[arg(long, global = true)]
    hub_url: Option<String>,

    /// API token (overrides JUPYTERHUB_API_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Dismissal store file (overrides HUB_ANNOUNCEMENTS_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Poll interval in seconds (overrides HUB_ANNOUNCEMENTS_INTERVAL_SECS)
    #[arg(long, global = true)]
    interval_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the service and print the board whenever it changes
    ///
    /// Cards are closed with the `dismiss` subcommand. A running `watch`
    /// reads the dismissed set once at start, so it hides a card dismissed
    /// elsewhere only after it is restarted.
    Watch,
    /// Fetch once and print the undismissed announcements
    List {
        /// Print HTML markup instead of text
        #[arg(long)]
        html: bool,

        /// Maximum number of announcements to request
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Print the most recent announcement
    Latest {
        /// Attach site extra info: "separate" or "combined"
        #[arg(long)]
        extra: Option<ExtraMode>,
    },
    /// Hide an announcement by its timestamp
    Dismiss { timestamp: String },
}

impl Cli {
    fn config(&self) -> BoardConfig {
        let mut config = BoardConfig::from_env();
        if let Some(url) = &self.hub_url {
            config.hub_url = url.clone();
        }
        if let Some(token) = &self.token {
            config.api_token = Some(token.clone());
        }
        if let Some(path) = &self.store {
            config.store_path = Some(path.clone());
        }
        if let Some(secs) = self.interval_secs.filter(|s| *s > 0) {
            config.poll_interval = std::time::Duration::from_secs(secs);
        }
        config
    }
}

/// Log to stderr so stdout only carries rendered announcements.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "hub_announcements=info,announcements_core=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = cli.config();

    match cli.command {
        Some(Commands::List { html, limit }) => {
            config.limit = limit;
            let client = AnnouncementClient::new(&config.hub_url, config.api_token.clone())?
                .with_limit(config.limit);
            let store = config.open_store()?;

            let mut state = BoardState::new(DismissedSet::load(&store));
            state.replace_announcements(client.list().await?);

            let now = chrono::Utc::now();
            let rendered = if html {
                render_board_html(&state, now)
            } else {
                render_board_text(&state, now)
            };
            match rendered {
                Some(output) => print!("{}", output),
                None => tracing::info!("No announcements to show"),
            }
        }
        Some(Commands::Latest { extra }) => {
            let client = AnnouncementClient::new(&config.hub_url, config.api_token.clone())?;
            let latest = client.latest(extra).await?;

            if latest.is_empty() {
                tracing::info!("No announcements to show");
            } else {
                println!("{}", serde_json::to_string_pretty(&latest)?);
            }
        }
        Some(Commands::Dismiss { timestamp }) => {
            let store = config.open_store()?;
            DismissedSet::load(&store)
                .with(&timestamp)
                .persist(&store)?;
            println!("Dismissed {}", timestamp);
        }
        Some(Commands::Watch) | None => {
            watch(config).await?;
        }
    }

    Ok(())
}

async fn watch(config: BoardConfig) -> anyhow::Result<()> {
    let client = AnnouncementClient::new(&config.hub_url, config.api_token.clone())?
        .with_limit(config.limit);
    let store = Arc::new(config.open_store()?);
    tracing::info!(
        "Watching {} (dismissals in {})",
        client.base_url(),
        store.path().display()
    );

    let board = Board::mount(client, store, config.poll_interval);
    let mut changes = board.subscribe();

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                match board.render_text() {
                    Some(output) => println!("{}", output),
                    None => tracing::info!("No announcements to show"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, unmounting board");
                break;
            }
        }
    }

    board.unmount();
    Ok(())
}

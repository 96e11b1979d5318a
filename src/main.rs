mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, ConfigOverrides};
use crate::features::files::{
    FeedPoller, FeedScreen, FeedTab, FeedView, FileFeedClient, HttpFileStore,
};
use crate::features::session::{Session, SessionStore};
use crate::modules::storage::DiskSaver;
use crate::shared::notifications::{ConsoleNotifier, Notifier};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "filedrop", version, about = "Share files through a filedrop endpoint")]
struct Cli {
    /// Endpoint URL (overrides FILEDROP_ENDPOINT_URL)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Session file holding your display name (overrides FILEDROP_SESSION_FILE)
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Directory downloads are saved to (overrides FILEDROP_DOWNLOAD_DIR)
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the current display name
    Whoami,
    /// Set the display name used for uploads and favorites
    Rename { name: String },
    /// List all uploaded files
    List,
    /// List your favorite files
    Favorites,
    /// Upload a file
    Upload {
        path: PathBuf,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Download a file by id
    Download {
        id: i64,
        /// Save under this name instead of the uploaded one
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete one of your files
    Delete { id: i64 },
    /// Add a file to your favorites, or remove it
    Favorite { id: i64 },
    /// Save the sample welcome file
    Welcome,
    /// Keep the feed on screen, refreshing it periodically
    Watch {
        #[arg(long, value_enum, default_value_t = FeedTab::All)]
        tab: FeedTab,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> anyhow::Result<ExitCode> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(ConfigOverrides {
        endpoint_url: cli.endpoint,
        session_file: cli.session_file,
        download_dir: cli.download_dir,
    })
    .map_err(|e| anyhow::anyhow!(e))?;

    let session_store = SessionStore::new(config.session.path.clone());
    let mut session = Session::load(session_store.clone()).await;

    match &cli.command {
        Command::Whoami => {
            if session.identity().is_blank() {
                println!("No name set. Run `filedrop rename <name>`.");
            } else {
                println!("{}", session.identity());
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Rename { name } => {
            session
                .rename(name)
                .await
                .with_context(|| format!("saving {}", session_store.path().display()))?;
            if session.identity().is_blank() {
                println!("Name cleared");
            } else {
                println!("You are now {}", session.identity());
            }
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let endpoint = config.endpoint().map_err(|e| anyhow::anyhow!(e))?;
    let store = Arc::new(HttpFileStore::new(endpoint)?);
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let saver = Arc::new(DiskSaver::new(config.download.dir.clone()));
    let client = Arc::new(FileFeedClient::new(store, saver, notifier));

    tracing::info!(
        "Using endpoint {}, downloads go to {}",
        endpoint.url,
        config.download.dir.display()
    );

    let identity = session.identity().clone();
    let succeeded = match cli.command {
        Command::Whoami | Command::Rename { .. } => true,
        Command::List => {
            let view = FeedView::new(client, session, FeedTab::All);
            view.sync().await;
            println!("{}", view.screen().await);
            true
        }
        Command::Favorites => {
            let view = FeedView::new(client, session, FeedTab::Favorites);
            view.sync().await;
            println!("{}", view.screen().await);
            true
        }
        Command::Upload { path, description } => client
            .upload_path(&identity, &path, &description)
            .await
            .is_ok(),
        Command::Download { id, name } => client
            .download_file(id, name.as_deref().unwrap_or_default())
            .await
            .is_ok(),
        Command::Delete { id } => client.delete_file(&identity, id).await.is_ok(),
        Command::Favorite { id } => client.toggle_favorite(&identity, id).await.is_ok(),
        Command::Welcome => client.download_placeholder().await.is_ok(),
        Command::Watch { tab } => {
            let view = Arc::new(FeedView::new(client, session, tab));
            watch(view, config.poll.interval).await?;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Poll the feed and reprint it whenever it changes, until Ctrl-C
async fn watch(view: Arc<FeedView>, interval: Duration) -> anyhow::Result<()> {
    let poller = FeedPoller::new(Arc::clone(&view), interval).spawn();
    let mut redraw = tokio::time::interval(Duration::from_secs(1));
    let mut shown: Option<FeedScreen> = None;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for Ctrl-C")?;
                break;
            }
            _ = redraw.tick() => {
                if !poller.is_running() {
                    anyhow::bail!("feed poller stopped unexpectedly");
                }
                let screen = view.screen().await;
                if shown.as_ref() != Some(&screen) {
                    println!("\n== {:?} ==\n{}", view.tab().await, screen);
                    shown = Some(screen);
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

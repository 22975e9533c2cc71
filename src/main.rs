use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use clap::Parser;
use tokio::sync::{broadcast, oneshot};

use simpleaudio::context::AppContext;
use simpleaudio::http::{self, state::ServerState};
use simpleaudio::media::metadata::LoftyReader;
use simpleaudio::rpc::{backend::Backend, bridge};
use simpleaudio::{cli, settings};

/// Set once the first Ctrl+C is received. A second Ctrl+C force-exits.
static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

async fn wait_for_interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    if SHUTTING_DOWN.swap(true, Ordering::SeqCst) {
        eprintln!("\nsimpleaudio: forced exit");
        std::process::exit(1);
    }
}

/// Serve RPC requests from stdin on a dedicated thread. The receiver fires
/// when the host closes the stream.
fn spawn_bridge(backend: Arc<Backend>) -> oneshot::Receiver<std::io::Result<()>> {
    let (done_tx, done_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("rpc-bridge".into())
        .spawn(move || {
            let stdin = std::io::stdin().lock();
            let stdout = std::io::stdout().lock();
            let _ = done_tx.send(bridge::run(&backend, stdin, stdout));
        })
        .unwrap_or_else(|e| {
            eprintln!("error: failed to start RPC thread: {}", e);
            std::process::exit(1);
        });
    done_rx
}

#[tokio::main]
async fn main() {
    // stdout carries the RPC protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();

    let file_settings = settings::find_settings_file(args.config.as_deref()).and_then(|path| {
        match settings::load_settings(&path) {
            Ok(s) => {
                tracing::debug!("Loaded settings from {}", path.display());
                Some(s)
            }
            Err(e) => {
                tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
                None
            }
        }
    });
    let settings = settings::Settings::resolve(file_settings, &args);
    let ctx = Arc::new(AppContext::from_settings(&settings));
    tracing::debug!("Data directory: {}", ctx.data_dir().display());

    // Indexing and tag extraction are blocking disk work; keep them off the async workers.
    let startup_ctx = Arc::clone(&ctx);
    let backend = match tokio::task::spawn_blocking(move || {
        Backend::start(startup_ctx, Arc::new(LoftyReader))
    })
    .await
    {
        Ok(b) => Arc::new(b),
        Err(e) => {
            eprintln!("error: startup failed: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Found {} audio files", backend.playlist().len());

    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    let server_task = if backend.playlist().is_empty() {
        tracing::info!("Playlist is empty -- track server not started");
        None
    } else {
        match http::bind_loopback(ctx.port).await {
            Ok(listener) => {
                tracing::info!("Serving tracks on http://127.0.0.1:{}", ctx.port);
                let app = http::build_router(ServerState::new(backend.library_root()));
                Some(http::spawn_server(
                    listener,
                    app,
                    http::IDLE_TIMEOUT,
                    shutdown_tx.subscribe(),
                ))
            }
            Err(e) => {
                // The RPC surface still works; only playback URLs are dead.
                tracing::error!("Failed to bind 127.0.0.1:{}: {}", ctx.port, e);
                None
            }
        }
    };

    let bridge_done = spawn_bridge(Arc::clone(&backend));

    tokio::select! {
        result = bridge_done => match result {
            Ok(Ok(())) => tracing::info!("Host closed the request stream"),
            Ok(Err(e)) => tracing::error!("RPC stream error: {}", e),
            Err(_) => tracing::error!("RPC thread exited without reporting"),
        },
        _ = wait_for_interrupt() => tracing::info!("Interrupted -- shutting down"),
    }

    let _ = shutdown_tx.send(());
    if let Some(task) = server_task {
        // In-flight transfers get a moment to drain; the process exit ends the rest.
        let _ = tokio::time::timeout(Duration::from_secs(1), task).await;
    }

    tracing::info!("SimpleAudio backend unloaded");
}

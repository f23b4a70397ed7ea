use crate::{cli, context, rest, storage};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The main application state.
/// Decoupled from CLI parsing so tests can inject their own storage.
pub struct App<S: storage::Storage = storage::SqliteStorage> {
    config: context::Context,
    storage: S,
    shutdown: CancellationToken,
}

impl App {
    /// Builds the App from CLI arguments: logging, data dir and schema.
    pub fn from_cli() -> Result<(App, cli::Cli)> {
        let cli = crate::cli::parse();

        crate::tracing::init();
        crate::tracing::set_log_file(cli.log_file.as_deref().map(Path::new))?;

        let ctx = context::Context::from_cli(&cli);
        log_startup_info(&ctx);

        let storage = init_storage(&ctx.data_dir, &ctx.db_path(), ctx.reset)?;

        Ok((App::new(ctx, storage), cli))
    }
}

impl<S: storage::Storage + Clone + Send + Sync + 'static> App<S> {
    fn new(config: context::Context, storage: S) -> Self {
        Self {
            config,
            storage,
            shutdown: CancellationToken::new(),
        }
    }

    /// Serves the REST API until Ctrl-C or until the server task exits.
    pub async fn run_daemon(&mut self) -> Result<()> {
        self.log_runtime_config();

        let mut rest_handle = self.spawn_rest_server();
        self.wait_for_shutdown(&mut rest_handle).await
    }

    fn spawn_rest_server(&self) -> JoinHandle<()> {
        let addr = self.config.api_listen;
        let store = self.storage.clone();
        let token = self.shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = rest::serve(addr, store, token).await {
                log::error!("REST server failed: {:#}", e);
            }
        })
    }

    async fn wait_for_shutdown(&self, rest_task: &mut JoinHandle<()>) -> Result<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => log::info!("🧨 Ctrl-C received, shutting down..."),
            _ = &mut *rest_task => log::error!("REST task exited unexpectedly"),
        }

        self.shutdown.cancel();

        // Polling a completed JoinHandle again panics.
        if !rest_task.is_finished() {
            let _ = rest_task.await;
        }

        log::info!("✅ Shutdown complete");
        Ok(())
    }

    fn log_runtime_config(&self) {
        log::info!("🌐 REST API: http://{}", self.config.api_listen);
        if let Some(path) = self.config.log_file.as_deref() {
            log::info!("📝 Log file: {}", path.to_string_lossy());
        }
    }
}

fn log_startup_info(ctx: &context::Context) {
    log::info!("🚀 Starting contact-patient");
    log::info!("📂 Data dir: {}", ctx.data_dir.to_string_lossy());
}

fn init_storage(data_dir: &Path, db_path: &Path, reset: bool) -> Result<storage::SqliteStorage> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let sqlite = storage::SqliteStorage::new(db_path);
    if reset {
        log::warn!("🧹 Resetting database {}", db_path.display());
        sqlite.reset_all().context("resetting storage")?;
    }
    sqlite.init().context("initializing storage")?;

    Ok(sqlite)
}

pub async fn run() -> Result<()> {
    let (mut app, cli) = App::from_cli()?;

    if let Some(cmd) = &cli.cmd {
        return cmd.run(&app.config);
    }

    app.run_daemon().await
}

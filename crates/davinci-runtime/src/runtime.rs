//! The event loop.
//!
//! [`DavinciRuntime`] owns the frozen [`RuntimeContext`] and a [`Router`].
//! Events arrive on an `mpsc` channel fed by the platform side; each one is
//! routed on its own task so handlers interleave at await points.
//!
//! ```rust,ignore
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! let runtime = DavinciRuntime::builder(gateway)
//!     .profile("production")
//!     .build()?;
//! runtime.run(rx).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use davinci_core::{BoxedGateway, InboundEvent};
use davinci_framework::{RuntimeContext, Router};
use davinci_media::ImagePipeline;
use davinci_storage::{BookmarkStore, open_store};

use crate::config::{ConfigLoader, DavinciConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// A configured bot, ready to consume events.
pub struct DavinciRuntime {
    config: DavinciConfig,
    router: Router,
}

impl DavinciRuntime {
    /// Starts a builder that loads configuration from the usual places.
    pub fn builder(gateway: BoxedGateway) -> RuntimeBuilder {
        RuntimeBuilder::new(gateway)
    }

    /// Initializes logging from `config`, then assembles the bot.
    pub fn from_config(config: &DavinciConfig, gateway: BoxedGateway) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);
        let runtime = Self::assemble(config, gateway)?;

        info!(
            prefix = %config.bot.prefix,
            storage = ?config.storage.backend,
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );
        Ok(runtime)
    }

    /// Opens the services and registers the command set without touching
    /// the global subscriber.
    pub fn assemble(config: &DavinciConfig, gateway: BoxedGateway) -> RuntimeResult<Self> {
        let store = open_store(&config.storage)?;
        let images = ImagePipeline::from_config(&config.media)?;

        let mut builder = RuntimeContext::builder(gateway);
        builder
            .settings(config.bot.to_settings())
            .service::<dyn BookmarkStore>(store)
            .service(Arc::new(images));
        davinci_commands::install(&mut builder)?;
        let context = builder.build();

        debug!(
            commands = context.commands().len(),
            text_commands = context.text_commands().len(),
            buttons = context.buttons().len(),
            "Commands registered"
        );

        Ok(Self {
            config: config.clone(),
            router: Router::new(context),
        })
    }

    pub fn config(&self) -> &DavinciConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<RuntimeContext> {
        self.router.runtime()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.context().shutdown_token().clone()
    }

    /// Consumes events until Ctrl+C, SIGTERM, or the channel closes.
    pub async fn run(&self, events: mpsc::Receiver<InboundEvent>) -> RuntimeResult<()> {
        let signals = shutdown_signal()?;
        info!("Da Vinci is now running. Press Ctrl+C to stop.");
        self.run_until(events, signals).await
    }

    /// Consumes events until `shutdown` resolves, the shutdown token is
    /// cancelled, or the channel closes.
    pub async fn run_until<F>(
        &self,
        mut events: mpsc::Receiver<InboundEvent>,
        shutdown: F,
    ) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let token = self.shutdown_token();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = token.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.dispatch(event),
                    None => {
                        info!("Event stream closed");
                        break;
                    }
                },
            }
        }

        self.stop().await;
        Ok(())
    }

    fn dispatch(&self, event: InboundEvent) {
        let router = self.router.clone();
        self.context().tasks().spawn(async move {
            router.route(event).await;
        });
    }

    /// Cancels every session and waits for in-flight handlers.
    pub async fn stop(&self) {
        info!("Stopping Da Vinci");
        let context = self.context();
        context.shutdown_token().cancel();
        context.tasks().close();
        context.tasks().wait().await;
        info!("Runtime stopped");
    }
}

impl std::fmt::Debug for DavinciRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DavinciRuntime")
            .field("config", &self.config)
            .field("context", self.context())
            .finish()
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
fn shutdown_signal() -> RuntimeResult<impl Future<Output = ()>> {
    #[cfg(unix)]
    let sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(RuntimeError::Signal)?;

    #[cfg(unix)]
    return Ok(wait_for_signal(sigterm));

    #[cfg(not(unix))]
    return Ok(wait_for_signal());
}

#[cfg(unix)]
async fn wait_for_signal(mut sigterm: signal::unix::Signal) {
    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => warn!(error = %e, "Ctrl+C handler failed, shutting down"),
        },
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => warn!(error = %e, "Ctrl+C handler failed, shutting down"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration, then builds a [`DavinciRuntime`].
pub struct RuntimeBuilder {
    gateway: BoxedGateway,
    config_loader: ConfigLoader,
    init_logging: bool,
}

impl RuntimeBuilder {
    pub fn new(gateway: BoxedGateway) -> Self {
        Self {
            gateway,
            config_loader: ConfigLoader::new().with_current_dir().with_user_config_dir(),
            init_logging: true,
        }
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Overrides one configuration key.
    pub fn set<V: serde::Serialize>(mut self, key: &str, value: V) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    pub fn merge(mut self, config: DavinciConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Leaves the global subscriber alone, e.g. when the caller installed one.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn build(self) -> RuntimeResult<DavinciRuntime> {
        let config = self.config_loader.load()?;
        if self.init_logging {
            DavinciRuntime::from_config(&config, self.gateway)
        } else {
            DavinciRuntime::assemble(&config, self.gateway)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use davinci_core::{InboundEvent, Reply, TextMessage};
    use davinci_framework::testing::{RecordingGateway, text_message};
    use davinci_storage::StorageConfig;
    use tokio::sync::mpsc;
    use tokio_test::assert_ok;

    use super::*;

    fn memory_config() -> DavinciConfig {
        DavinciConfig {
            storage: StorageConfig::memory(),
            ..Default::default()
        }
    }

    fn titles(replies: &[Reply]) -> Vec<String> {
        replies
            .iter()
            .filter_map(|r| r.embeds.first().and_then(|e| e.title.clone()))
            .collect()
    }

    #[test]
    fn test_assemble_registers_commands_and_services() {
        let gateway = RecordingGateway::new();
        let runtime = DavinciRuntime::assemble(&memory_config(), gateway).unwrap();
        let context = runtime.context();

        assert_eq!(context.settings().prefix, "!");
        assert!(context.text_commands().resolve("ping").is_ok());
        assert!(context.commands().resolve("bookmark").is_ok());
        assert!(context.get_service::<dyn BookmarkStore>().is_some());
        assert!(context.get_service::<ImagePipeline>().is_some());
    }

    #[test]
    fn test_assemble_fails_on_bad_storage() {
        let mut config = memory_config();
        config.storage = StorageConfig {
            path: None,
            ..StorageConfig::default()
        };
        let err = DavinciRuntime::assemble(&config, RecordingGateway::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::Storage(_)));
    }

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let gateway = RecordingGateway::new();
        let runtime = DavinciRuntime::assemble(&memory_config(), gateway.clone()).unwrap();
        let (tx, rx) = mpsc::channel(8);

        tx.send(InboundEvent::TextMessage(TextMessage {
            message: text_message("m1", "u1", "!ping"),
        }))
            .await
            .unwrap();
        tx.send(InboundEvent::TextMessage(TextMessage {
            message: text_message("m2", "u1", "hello"),
        }))
            .await
            .unwrap();
        drop(tx);

        assert_ok!(runtime.run_until(rx, std::future::pending()).await);

        assert_eq!(titles(&gateway.responses()), ["Pong!"]);
        assert!(runtime.shutdown_token().is_cancelled());
    }

    #[tokio::test]
    async fn test_shutdown_future_stops_loop() {
        let runtime =
            DavinciRuntime::assemble(&memory_config(), RecordingGateway::new()).unwrap();
        let (_tx, rx) = mpsc::channel(8);

        tokio::time::timeout(
            Duration::from_secs(5),
            runtime.run_until(rx, async {}),
        )
        .await
        .unwrap()
        .unwrap();
    }

    #[tokio::test]
    async fn test_token_cancel_stops_loop() {
        let runtime = Arc::new(
            DavinciRuntime::assemble(&memory_config(), RecordingGateway::new()).unwrap(),
        );
        let (_tx, rx) = mpsc::channel(8);
        let token = runtime.shutdown_token();

        let handle = tokio::spawn({
            let runtime = Arc::clone(&runtime);
            async move { runtime.run_until(rx, std::future::pending()).await }
        });
        token.cancel();
        handle.await.unwrap().unwrap();
    }
}

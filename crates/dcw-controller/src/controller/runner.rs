use std::time::Instant;

use anyhow::Context;
use dcw_dispatch::{BatchRequest, DispatchClient, Generator};
use tokio_util::sync::CancellationToken;

use super::{checkpoint::CheckpointStore, config::ControllerConfig, telemetry};

/// What a finished run got through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Batches acknowledged by the worker.
    pub batches: u64,
    /// Candidates in those batches.
    pub candidates: u64,
    /// Whether the whole space has been handed out.
    pub exhausted: bool,
}

/// Picks up the stored checkpoint, or starts over when there is none or
/// `config.fresh` is set.
///
/// A stored checkpoint always wins over the vocabulary, length and formatter
/// in `config`; a mismatch is only logged.
pub async fn load_generator(
    config: &ControllerConfig,
    store: &CheckpointStore,
) -> anyhow::Result<Generator> {
    if !config.fresh {
        if let Some(bytes) = store.load().await? {
            let generator = Generator::resume(&bytes).with_context(|| {
                format!("failed to resume from {}", store.path().display())
            })?;

            let requested = config.fresh_generator()?;
            if generator.config() != requested.config() {
                tracing::warn!(
                    "Checkpoint {} was written for a different space; ignoring the configured one",
                    store.path().display()
                );
            }
            tracing::info!(
                "Resuming from {} at {:?}",
                store.path().display(),
                generator.state()?.current_positions
            );
            return Ok(generator);
        }
    }

    tracing::info!("Starting from the first candidate");
    Ok(config.fresh_generator()?)
}

/// Drives one generator against one worker.
#[derive(Debug)]
pub struct Controller {
    generator: Generator,
    client: DispatchClient,
    store: CheckpointStore,
    batch_size: usize,
    checkpoint_every: u64,
}

impl Controller {
    pub fn new(
        generator: Generator,
        client: DispatchClient,
        store: CheckpointStore,
        batch_size: usize,
        checkpoint_every: u64,
    ) -> Self {
        Self {
            generator,
            client,
            store,
            batch_size,
            checkpoint_every,
        }
    }

    /// Loads the generator and connects to the worker described by `config`.
    pub async fn start(config: &ControllerConfig) -> anyhow::Result<Self> {
        let store = CheckpointStore::new(&config.checkpoint_path);
        let generator = load_generator(config, &store).await?;
        let client = DispatchClient::connect(config.client.clone())
            .await
            .context("failed to connect to worker")?;

        Ok(Self::new(
            generator,
            client,
            store,
            config.batch_size,
            config.checkpoint_every,
        ))
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Generates and dispatches batches until the space is exhausted or
    /// `shutdown` fires.
    ///
    /// The checkpoint is persisted every `checkpoint_every` acknowledged
    /// batches and once more on the way out. A failed dispatch returns the
    /// error without persisting, so the batch is generated again on restart.
    #[tracing::instrument(level = "info", skip_all, fields(client = %self.client.config().id))]
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut unsaved = 0;

        loop {
            if shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, stopping after {} batches", summary.batches);
                break;
            }

            let generator = self.generator.clone();
            let batch_size = self.batch_size;
            let batch =
                match tokio::task::spawn_blocking(move || generator.try_next_batch(batch_size))
                    .await?
                {
                    Ok(batch) => batch,
                    Err(dcw::Error::SpaceExhausted) => {
                        summary.exhausted = true;
                        break;
                    }
                    Err(e) => return Err(e.into()),
                };

            let count = batch.len() as u64;
            let request =
                BatchRequest::new(&self.client.config().id, summary.batches, batch).encode()?;

            let start = Instant::now();
            if let Err(e) = self.client.call(request).await {
                telemetry::increment_dispatch_errors();
                tracing::error!("Batch {} failed: {}", summary.batches, e);
                let _ = self.client.close().await;
                return Err(e).context("failed to dispatch batch");
            }
            telemetry::record_dispatch_duration(start.elapsed().as_secs_f64() * 1000.0);
            telemetry::record_batch_dispatched(count);

            tracing::debug!("Batch {} of {} candidates acknowledged", summary.batches, count);
            summary.batches += 1;
            summary.candidates += count;
            unsaved += 1;

            if unsaved >= self.checkpoint_every {
                self.persist().await?;
                unsaved = 0;
            }

            if self.generator.is_done()? {
                summary.exhausted = true;
                break;
            }
        }

        self.persist().await?;
        self.client.close().await?;

        tracing::info!(
            "Dispatched {} candidates in {} batches (exhausted: {})",
            summary.candidates,
            summary.batches,
            summary.exhausted
        );
        Ok(summary)
    }

    async fn persist(&self) -> anyhow::Result<()> {
        let checkpoint = self.generator.current_state()?;
        self.store.save(&checkpoint).await?;
        telemetry::increment_checkpoints_saved();
        Ok(())
    }
}

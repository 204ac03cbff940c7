use std::path::PathBuf;

use async_trait::async_trait;
use ponto_core::{Embedding, EmbeddingProvider, FacePipeline, ProviderError};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Messages sent from request handlers to the engine thread.
enum EngineRequest {
    Embed {
        image: Vec<u8>,
        reply: oneshot::Sender<Result<Option<Embedding>, ProviderError>>,
    },
}

/// Clone-safe handle to the engine thread.
///
/// The thread exits once every handle has been dropped.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

#[async_trait]
impl EmbeddingProvider for EngineHandle {
    async fn embed(&self, image: &[u8]) -> Result<Option<Embedding>, ProviderError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Embed {
                image: image.to_vec(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| ProviderError::Unavailable)?;
        reply_rx.await.map_err(|_| ProviderError::Unavailable)?
    }
}

/// Synchronous embedder owned by the engine thread.
pub trait Backend: 'static {
    fn embed(&mut self, image: &[u8]) -> Result<Option<Embedding>, ProviderError>;
}

impl Backend for FacePipeline {
    fn embed(&mut self, image: &[u8]) -> Result<Option<Embedding>, ProviderError> {
        FacePipeline::embed(self, image)
    }
}

/// Spawn the engine on a dedicated OS thread, backed by the ONNX models in
/// `model_dir`.
pub fn spawn_engine(model_dir: PathBuf) -> Result<EngineHandle, EngineError> {
    tracing::info!(model_dir = %model_dir.display(), "starting engine");
    spawn_engine_with(move || FacePipeline::load(&model_dir))
}

/// Spawn the engine with a custom backend loader.
///
/// Nothing is loaded here: the thread calls `load` on the first request and
/// keeps the backend for its lifetime. Requests queue on the channel, so
/// concurrent first calls still load exactly once. A failed load is reported
/// to that caller and attempted again on the next request.
pub fn spawn_engine_with<B, L>(mut load: L) -> Result<EngineHandle, EngineError>
where
    B: Backend,
    L: FnMut() -> Result<B, ProviderError> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(16);

    std::thread::Builder::new()
        .name("ponto-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            let mut backend: Option<B> = None;

            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Embed { image, reply } => {
                        let result = loaded(&mut backend, &mut load).and_then(|b| b.embed(&image));
                        if let Err(err) = &result {
                            tracing::warn!(error = %err, "embedding failed");
                        }
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })?;

    Ok(EngineHandle { tx })
}

/// Lazily load the backend into `slot`.
fn loaded<'a, B>(
    slot: &'a mut Option<B>,
    load: &mut impl FnMut() -> Result<B, ProviderError>,
) -> Result<&'a mut B, ProviderError> {
    if slot.is_none() {
        let started = std::time::Instant::now();
        *slot = Some(load()?);
        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "face models loaded");
    }
    slot.as_mut().ok_or(ProviderError::Unavailable)
}

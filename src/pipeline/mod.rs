//! Two-stage rasterization pipeline
//!
//! submission -> draw call queue -> transform worker -> triangle queue ->
//! rasterize worker -> framebuffer
//!
//! Both queues are bounded: a full queue blocks its producer. Closing the
//! draw call queue is the only shutdown signal; it drains through both
//! workers so everything already submitted is rasterized.

mod completion;
mod config;
mod draw_call;
mod worker;

pub use config::{load_config, PipelineConfig};
pub use draw_call::{DrawCall, DrawCallDesc, Shading, Triangle, TriangleShading};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::{ConfigError, RasterError};
use crate::rasterizer::{Framebuffer, IndexedTarget, Mat4, Texture, Vec2, Vec3};

use completion::Completion;
use worker::{rasterize_loop, transform_loop};

/// Submission side of the draw call queue
struct Submitter {
    sender: Option<flume::Sender<DrawCall>>,
    next_id: u64,
}

/// Handle to a running pipeline that rasterizes into a shared target.
///
/// The target is written only by the rasterize worker. Read it after
/// [`sync`](Self::sync) / [`wait`](Self::wait), or through
/// [`with_target`](Self::with_target) which does both.
pub struct Rasterizer<T: IndexedTarget + Send + 'static = Framebuffer> {
    target: Arc<Mutex<T>>,
    config: PipelineConfig,
    // Held across id allocation and enqueue so ids enter the queue in order
    submitter: Mutex<Submitter>,
    closed: AtomicBool,
    completion: Arc<Completion>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: IndexedTarget + Send + 'static> Rasterizer<T> {
    /// Start the transform and rasterize workers
    pub fn new(target: Arc<Mutex<T>>, config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (dc_tx, dc_rx) = flume::bounded(config.draw_call_capacity);
        let (tri_tx, tri_rx) = flume::bounded(config.triangle_capacity);
        let completion = Arc::new(Completion::new());

        let transform = thread::Builder::new()
            .name("raster-transform".to_string())
            .spawn(move || transform_loop(dc_rx, tri_tx))
            .map_err(ConfigError::Spawn)?;

        let rasterize = {
            let target = Arc::clone(&target);
            let completion = Arc::clone(&completion);
            thread::Builder::new()
                .name("raster-fill".to_string())
                .spawn(move || rasterize_loop(tri_rx, target, completion))
                .map_err(ConfigError::Spawn)?
        };

        log::info!(
            "Rasterizer started (draw call queue {}, triangle queue {})",
            config.draw_call_capacity,
            config.triangle_capacity
        );

        Ok(Self {
            target,
            config,
            submitter: Mutex::new(Submitter { sender: Some(dc_tx), next_id: 1 }),
            closed: AtomicBool::new(false),
            completion,
            workers: Mutex::new(vec![transform, rasterize]),
        })
    }

    fn lock_submitter(&self) -> MutexGuard<'_, Submitter> {
        self.submitter.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and enqueue a draw call. Blocks while the draw call queue is full.
    pub fn submit(&self, desc: DrawCallDesc) -> Result<u64, RasterError> {
        let mut submitter = self.lock_submitter();
        let Some(sender) = submitter.sender.clone() else {
            return Err(RasterError::ClosedPipeline);
        };

        let id = submitter.next_id;
        let dc = desc.validate(id).map_err(|e| {
            log::warn!("Rejected draw call: {}", e);
            RasterError::from(e)
        })?;

        submitter.next_id += 1;
        self.completion.issue(id);
        log::trace!("Submitting draw call {} ({} triangles)", id, dc.triangle_count());

        sender.send(dc).map_err(|_| {
            log::error!("Transform worker gone, draw call {} not queued", id);
            RasterError::ClosedPipeline
        })?;
        Ok(id)
    }

    /// Submit triangles with one palette index each
    pub fn submit_flat(&self, transform: Mat4, vertices: Vec<Vec3>, colors: Vec<u8>) -> Result<u64, RasterError> {
        self.submit(DrawCallDesc::flat(transform, vertices, colors))
    }

    /// Submit triangles textured with one UV per vertex
    pub fn submit_textured(
        &self,
        transform: Mat4,
        vertices: Vec<Vec3>,
        uvs: Vec<Vec2>,
        texture: Arc<Texture>,
    ) -> Result<u64, RasterError> {
        self.submit(DrawCallDesc::textured(transform, vertices, uvs, texture))
    }

    /// Block until draw call `id` has been fully rasterized
    pub fn wait(&self, id: u64) -> Result<(), RasterError> {
        self.completion.wait(id)
    }

    /// Flush the pipeline: submit an empty draw call and wait for it
    pub fn sync(&self) -> Result<(), RasterError> {
        let id = self.submit_flat(Mat4::IDENTITY, Vec::new(), Vec::new())?;
        self.wait(id)
    }

    /// Sync, then run `f` with exclusive access to the target
    pub fn with_target<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, RasterError> {
        self.sync()?;
        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut target))
    }

    pub fn target(&self) -> Arc<Mutex<T>> {
        Arc::clone(&self.target)
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// Highest draw call id whose triangles have all been rasterized
    pub fn last_completed(&self) -> u64 {
        self.completion.last_completed()
    }

    /// True once `destroy` has started. Does not wait on blocked submitters.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the draw call queue and wait for both workers to drain it.
    /// Later submissions fail with `ClosedPipeline`. Safe to call twice.
    pub fn destroy(&self) {
        self.closed.store(true, Ordering::Release);
        let sender = self.lock_submitter().sender.take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let workers = std::mem::take(&mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in workers {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                log::error!("Pipeline worker {} panicked", name);
            }
        }

        log::info!("Rasterizer stopped after draw call {}", self.last_completed());
    }
}

impl<T: IndexedTarget + Send + 'static> Drop for Rasterizer<T> {
    fn drop(&mut self) {
        self.destroy();
    }
}

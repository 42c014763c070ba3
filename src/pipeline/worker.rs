//! Worker loops for the two pipeline stages

use std::sync::{Arc, Mutex, PoisonError};

use super::completion::{CloseOnDrop, Completion};
use super::draw_call::{DrawCall, Triangle, TriangleShading};
use crate::rasterizer::{fill_triangle, FlatShader, IndexedTarget, TexturedShader};

/// Items on the triangle queue
#[derive(Debug)]
pub(crate) enum RasterJob {
    Triangle(Triangle),
    /// Follows the last triangle of the draw call with this id
    Retire(u64),
}

/// Transform stage: runs until the draw call queue is closed and drained,
/// then drops `triangles`, which closes the triangle queue.
pub(crate) fn transform_loop(draw_calls: flume::Receiver<DrawCall>, triangles: flume::Sender<RasterJob>) {
    log::debug!("Transform worker started");

    for dc in draw_calls.iter() {
        log::trace!("Transforming draw call {} ({} triangles)", dc.id, dc.triangle_count());

        for tri in dc.triangles() {
            if triangles.send(RasterJob::Triangle(tri)).is_err() {
                log::error!("Rasterize worker gone, dropping draw call {}", dc.id);
                return;
            }
        }

        if triangles.send(RasterJob::Retire(dc.id)).is_err() {
            log::error!("Rasterize worker gone, dropping draw call {}", dc.id);
            return;
        }
    }

    log::debug!("Transform worker finished");
}

/// Rasterize stage: fills triangles into `target` and publishes retired ids.
/// Closes `completion` on exit.
pub(crate) fn rasterize_loop<T: IndexedTarget>(
    jobs: flume::Receiver<RasterJob>,
    target: Arc<Mutex<T>>,
    completion: Arc<Completion>,
) {
    let _close = CloseOnDrop(&completion);
    log::debug!("Rasterize worker started");

    for job in jobs.iter() {
        match job {
            RasterJob::Triangle(tri) => {
                let mut target = target.lock().unwrap_or_else(PoisonError::into_inner);
                rasterize(&tri, &mut *target);
            }
            RasterJob::Retire(id) => {
                log::trace!("Draw call {} rasterized", id);
                completion.publish(id);
            }
        }
    }

    log::debug!("Rasterize worker finished");
}

/// Fill one triangle with the shader its shading calls for
pub(crate) fn rasterize<T: IndexedTarget + ?Sized>(tri: &Triangle, target: &mut T) {
    let screen = tri.to_screen();
    let (width, height) = (target.width(), target.height());

    match &tri.shading {
        TriangleShading::Flat(color) => {
            fill_triangle(&screen, width, height, &mut FlatShader::new(target, *color));
        }
        TriangleShading::Textured { texture, .. } => {
            fill_triangle(&screen, width, height, &mut TexturedShader::new(target, texture));
        }
    }
}

//! Progressive rendering: coarse passes first, finer passes later.
//!
//! Each pass is one synchronous composite. Passes are handed to a
//! [`PassScheduler`]; a [`CancelToken`] stops passes that have not started
//! and suppresses callbacks for frames that finish after cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::compositor::{frame_size, surface_len, CompositeOptions, RenderedFrame};
use crate::engine::ProjectionEngine;
use crate::error::RenderResult;

/// Unit of work handed to a scheduler.
pub type PassTask = Box<dyn FnOnce() + Send + 'static>;

/// Callback receiving a finished frame.
pub type FrameCallback = Box<dyn FnOnce(RenderedFrame) + Send + 'static>;

/// One pass: a downsample factor and where to deliver its frame.
pub struct RenderPass {
    pub downsample: usize,
    pub on_frame: FrameCallback,
}

impl RenderPass {
    pub fn new(downsample: usize, on_frame: impl FnOnce(RenderedFrame) + Send + 'static) -> Self {
        Self {
            downsample,
            on_frame: Box::new(on_frame),
        }
    }
}

impl std::fmt::Debug for RenderPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPass")
            .field("downsample", &self.downsample)
            .finish_non_exhaustive()
    }
}

/// Runs pass tasks in submission order.
pub trait PassScheduler: Send + Sync {
    fn submit(&self, task: PassTask);
}

/// Runs each task immediately on the caller's thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineScheduler;

impl PassScheduler for InlineScheduler {
    fn submit(&self, task: PassTask) {
        task();
    }
}

/// Timer-driven scheduler for contexts without a frame loop.
///
/// A worker on the tokio runtime runs tasks one at a time on the blocking
/// pool, waiting `stagger` before every task after the first.
#[derive(Debug, Clone)]
pub struct StaggeredScheduler {
    sender: mpsc::UnboundedSender<PassTask>,
}

impl StaggeredScheduler {
    pub fn new(handle: &Handle, stagger: Duration) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<PassTask>();

        handle.spawn(async move {
            let mut first = true;
            while let Some(task) = receiver.recv().await {
                if !first {
                    tokio::time::sleep(stagger).await;
                }
                first = false;

                if let Err(e) = tokio::task::spawn_blocking(task).await {
                    tracing::error!(error = %e, "Progressive pass panicked");
                }
            }
            tracing::debug!("Staggered scheduler stopped");
        });

        Self { sender }
    }

    /// Scheduler on the runtime of the calling context, if there is one.
    pub fn from_current(stagger: Duration) -> Option<Self> {
        Handle::try_current()
            .ok()
            .map(|handle| Self::new(&handle, stagger))
    }
}

impl PassScheduler for StaggeredScheduler {
    fn submit(&self, task: PassTask) {
        if self.sender.send(task).is_err() {
            tracing::warn!("Scheduler worker has stopped, dropping pass");
        }
    }
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct ProgressiveRenderer<S> {
    engine: ProjectionEngine,
    scheduler: S,
}

impl<S: PassScheduler> ProgressiveRenderer<S> {
    pub fn new(engine: ProjectionEngine, scheduler: S) -> Self {
        Self { engine, scheduler }
    }

    /// Submit every pass in order and return a token that cancels the rest.
    ///
    /// All pass sizes are checked before anything is submitted, so a surface
    /// that cannot be allocated is reported here instead of inside a pass.
    pub fn run(&self, options: CompositeOptions, passes: Vec<RenderPass>) -> RenderResult<CancelToken> {
        options.view.validate()?;
        for pass in &passes {
            let (w, h) = frame_size(options.width, options.height, pass.downsample);
            surface_len(w, h, pass.downsample)?;
        }

        let token = CancelToken::new();
        let options = Arc::new(options);

        for (index, pass) in passes.into_iter().enumerate() {
            let engine = self.engine.clone();
            let options = Arc::clone(&options);
            let token = token.clone();

            self.scheduler.submit(Box::new(move || {
                if token.is_cancelled() {
                    tracing::debug!(pass = index, "Skipping cancelled pass");
                    return;
                }

                let pass_options = CompositeOptions {
                    downsample: pass.downsample,
                    ..(*options).clone()
                };
                match engine.render_composite(&pass_options) {
                    Ok(frame) if !token.is_cancelled() => (pass.on_frame)(frame),
                    Ok(_) => {
                        tracing::debug!(pass = index, "Discarding frame of cancelled pass");
                    }
                    Err(e) => {
                        tracing::warn!(pass = index, error = %e, "Progressive pass failed");
                    }
                }
            }));
        }

        Ok(token)
    }
}

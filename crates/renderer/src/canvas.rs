use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::compile::{build_program, missing_required_uniforms, POSITION_ATTRIBUTE};
use crate::error::AttachError;
use crate::geometry::{quad_bytes, POSITION_COMPONENTS, QUAD_VERTEX_COUNT};
use crate::host::{Cancellable, CanvasTarget, FrameScheduler, GraphicsContext};
use crate::pointer::PointerTracker;
use crate::timeline::FrameClock;
use crate::types::{CanvasConfig, CanvasSize};
use crate::uniforms::{FrameUniforms, UniformLocations};

/// Counters describing what a canvas has rendered so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    /// Ticks that issued a draw.
    pub frames: u64,
    /// Seconds since attach as of the last tick.
    pub elapsed: f32,
    /// Seconds between the last two ticks.
    pub delta: f32,
    /// Speed-scaled time accumulator.
    pub phase: f32,
    /// Drawing buffer size used by the last tick.
    pub resolution: CanvasSize,
    /// Drawing buffer resizes performed by the frame loop.
    pub resizes: u64,
}

struct GpuResources<G: GraphicsContext> {
    program: G::Program,
    quad: G::Buffer,
}

impl<G: GraphicsContext> GpuResources<G> {
    fn release(self, gl: &G) {
        gl.delete_buffer(self.quad);
        gl.delete_program(self.program);
    }
}

type Locations<T> =
    UniformLocations<<<T as CanvasTarget>::Context as GraphicsContext>::UniformLocation>;

struct CanvasState<T: CanvasTarget> {
    label: String,
    target: T,
    gl: T::Context,
    resources: Option<GpuResources<T::Context>>,
    locations: Locations<T>,
    uniforms: FrameUniforms,
    clock: FrameClock,
    pointer: Option<PointerTracker>,
    render_scale: f32,
    stats: FrameStats,
}

impl<T: CanvasTarget> CanvasState<T> {
    fn tick(&mut self, now_ms: f64) {
        if self.resources.is_none() {
            return;
        }
        let time = self.clock.advance(now_ms, self.uniforms.speed);
        let resolution = self.reconcile_size();

        self.uniforms.resolution = resolution.as_uniform();
        self.uniforms.time = time.elapsed;
        self.uniforms.pointer = self.pointer.as_ref().map(PointerTracker::position);
        self.locations.push(&self.gl, &self.uniforms);
        self.gl.draw_triangles(QUAD_VERTEX_COUNT);

        self.stats.frames += 1;
        self.stats.elapsed = time.elapsed;
        self.stats.delta = time.delta;
        self.stats.phase = time.phase;
        self.stats.resolution = resolution;
    }

    /// Matches the drawing buffer to the laid-out size. Only touches the
    /// target and viewport when the size actually changed.
    fn reconcile_size(&mut self) -> CanvasSize {
        let desired = self.target.display_size().scaled(self.render_scale);
        if self.target.drawing_buffer_size() != desired {
            self.target.set_drawing_buffer_size(desired);
            self.gl.viewport(desired);
            self.stats.resizes += 1;
            tracing::debug!(
                canvas = %self.label,
                width = desired.width,
                height = desired.height,
                "resized drawing buffer"
            );
        }
        desired
    }

    fn release(&mut self) {
        if let Some(resources) = self.resources.take() {
            resources.release(&self.gl);
        }
    }
}

/// A live shader canvas: one context, one linked program, one quad buffer and
/// one repeating frame task.
///
/// Dropping the handle disposes it.
pub struct ShaderCanvas<T: CanvasTarget> {
    label: String,
    state: Rc<RefCell<CanvasState<T>>>,
    frame_task: Option<Box<dyn Cancellable>>,
    pointer_subscription: Option<Box<dyn Cancellable>>,
    disposed: bool,
}

impl<T: CanvasTarget + 'static> ShaderCanvas<T> {
    /// Builds the program for `config` on `target` and starts its frame task.
    ///
    /// On error nothing is left allocated and nothing is scheduled.
    pub fn attach<S>(target: T, scheduler: &S, config: &CanvasConfig) -> Result<Self, AttachError>
    where
        S: FrameScheduler + ?Sized,
    {
        let label = target.label();
        let options = config.options.sanitized();
        let render_scale = config.effective_render_scale();

        let gl = target
            .context()
            .ok_or_else(|| AttachError::ContextUnavailable {
                canvas: label.clone(),
                reason: "rendering context request returned nothing".to_string(),
            })?;

        let missing = missing_required_uniforms(&config.fragment, &config.uniforms);
        if !missing.is_empty() {
            tracing::warn!(
                canvas = %label,
                missing = ?missing,
                "fragment shader does not declare required uniforms"
            );
        }

        let program = build_program(&gl, &config.fragment)
            .map_err(|err| AttachError::from_program(&label, err))?;

        let Some(quad) = gl.create_vertex_buffer(quad_bytes()) else {
            gl.delete_program(program);
            return Err(AttachError::ContextUnavailable {
                canvas: label,
                reason: "failed to allocate quad buffer".to_string(),
            });
        };
        if !gl.bind_vertex_attribute(&program, &quad, POSITION_ATTRIBUTE, POSITION_COMPONENTS) {
            GpuResources::<T::Context> { program, quad }.release(&gl);
            return Err(AttachError::ProgramLink {
                canvas: label,
                log: format!("attribute '{POSITION_ATTRIBUTE}' is not active in the linked program"),
            });
        }

        gl.use_program(&program);
        let locations = UniformLocations::resolve(&gl, &program, &config.uniforms);
        let initial = target.drawing_buffer_size();
        gl.viewport(initial);

        let mut pointer_subscription = None;
        let pointer = if config.interactive {
            let tracker = PointerTracker::new();
            pointer_subscription = target.subscribe_pointer(tracker.clone());
            if pointer_subscription.is_none() {
                tracing::warn!(canvas = %label, "pointer events unavailable; pointer uniform stays at origin");
            }
            Some(tracker)
        } else {
            None
        };

        let state = Rc::new(RefCell::new(CanvasState {
            label: label.clone(),
            target,
            gl,
            resources: Some(GpuResources { program, quad }),
            locations,
            uniforms: FrameUniforms::new(&options, initial),
            clock: FrameClock::new(scheduler.now()),
            pointer,
            render_scale,
            stats: FrameStats {
                resolution: initial,
                ..FrameStats::default()
            },
        }));

        let weak = Rc::downgrade(&state);
        let frame_task = match scheduler.start(Box::new(move |now_ms| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            // A re-entrant frame for the same canvas is skipped, never overlapped.
            let Ok(mut state) = shared.try_borrow_mut() else {
                return;
            };
            state.tick(now_ms);
        })) {
            Ok(task) => task,
            Err(err) => {
                if let Some(mut subscription) = pointer_subscription {
                    subscription.cancel();
                }
                state.borrow_mut().release();
                return Err(AttachError::SchedulerUnavailable {
                    canvas: label,
                    reason: err.to_string(),
                });
            }
        };

        tracing::info!(
            canvas = %label,
            width = initial.width,
            height = initial.height,
            interactive = config.interactive,
            speed = options.speed,
            "attached shader canvas"
        );

        Ok(Self {
            label,
            state,
            frame_task: Some(frame_task),
            pointer_subscription,
            disposed: false,
        })
    }
}

impl<T: CanvasTarget> ShaderCanvas<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stats(&self) -> FrameStats {
        self.state.borrow().stats
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Stops the frame task, detaches the pointer listener and deletes the
    /// program and quad buffer. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(mut task) = self.frame_task.take() {
            task.cancel();
        }
        if let Some(mut subscription) = self.pointer_subscription.take() {
            subscription.cancel();
        }
        let mut state = self.state.borrow_mut();
        state.release();
        tracing::info!(canvas = %self.label, frames = state.stats.frames, "disposed shader canvas");
    }
}

impl<T: CanvasTarget> Drop for ShaderCanvas<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Attaches like [`ShaderCanvas::attach`], logging a failure instead of
/// returning it.
pub fn attach_or_log<T, S>(target: T, scheduler: &S, config: &CanvasConfig) -> Option<ShaderCanvas<T>>
where
    T: CanvasTarget + 'static,
    S: FrameScheduler + ?Sized,
{
    match ShaderCanvas::attach(target, scheduler, config) {
        Ok(canvas) => Some(canvas),
        Err(err) => {
            tracing::error!(canvas = %err.canvas(), kind = ?err.kind(), "{err}");
            None
        }
    }
}

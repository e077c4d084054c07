use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use renderer::{Cancellable, FrameCallback, FrameScheduler, HostError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// `requestAnimationFrame` driven scheduler.
///
/// Each task keeps exactly one outstanding frame request: the next request is
/// made only after the callback returns, and cancelling revokes the pending
/// one.
#[derive(Clone)]
pub struct AnimationFrameScheduler {
    window: Window,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    pub fn current() -> Option<Self> {
        web_sys::window().map(Self::new)
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or(0.0)
    }

    fn start(&self, callback: FrameCallback) -> Result<Box<dyn Cancellable>, HostError> {
        let frame_loop = Rc::new(FrameLoop {
            window: self.window.clone(),
            pending: Cell::new(None),
            running: Cell::new(false),
            cancelled: Cell::new(false),
            closure: RefCell::new(None),
        });

        let weak: Weak<FrameLoop> = Rc::downgrade(&frame_loop);
        let mut callback = callback;
        let closure = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let Some(frame_loop) = weak.upgrade() else {
                return;
            };
            frame_loop.pending.set(None);
            if frame_loop.cancelled.get() {
                return;
            }
            frame_loop.running.set(true);
            callback(timestamp);
            frame_loop.running.set(false);
            if !frame_loop.cancelled.get() {
                if let Err(err) = frame_loop.request() {
                    tracing::error!(error = %err, "animation frame loop stopped");
                }
            }
        });
        *frame_loop.closure.borrow_mut() = Some(closure);

        frame_loop.request()?;
        Ok(Box::new(AnimationFrameTask { frame_loop }))
    }
}

struct FrameLoop {
    window: Window,
    pending: Cell<Option<i32>>,
    running: Cell<bool>,
    cancelled: Cell<bool>,
    closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameLoop {
    fn request(&self) -> Result<(), HostError> {
        let closure = self.closure.borrow();
        let Some(closure) = closure.as_ref() else {
            return Err(HostError::new("frame callback already released"));
        };
        let handle = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|err| HostError::new(format!("requestAnimationFrame failed: {err:?}")))?;
        self.pending.set(Some(handle));
        Ok(())
    }
}

struct AnimationFrameTask {
    frame_loop: Rc<FrameLoop>,
}

impl Cancellable for AnimationFrameTask {
    fn cancel(&mut self) {
        let frame_loop = &self.frame_loop;
        if frame_loop.cancelled.replace(true) {
            return;
        }
        if let Some(handle) = frame_loop.pending.take() {
            let _ = frame_loop.window.cancel_animation_frame(handle);
        }
        let closure = frame_loop.closure.borrow_mut().take();
        if let Some(closure) = closure {
            if frame_loop.running.get() {
                // Still on the stack; dropping it now would free a running closure.
                closure.forget();
            }
        }
    }
}

impl Drop for AnimationFrameTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

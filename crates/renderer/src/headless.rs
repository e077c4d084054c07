//! In-memory host used by tests and `canvasctl simulate`.
//!
//! The context keeps a ledger of every shader, program and buffer so leaks
//! and double frees are observable, records uniform writes, viewport changes
//! and draw calls, and performs a lexical GLSL check (balanced delimiters, a
//! `main` entry point, varyings matched across stages) that yields
//! driver-style diagnostics. The scheduler only fires when told to.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};

use crate::compile::{declarations, strip_comments};
use crate::error::HostError;
use crate::host::{Cancellable, CanvasTarget, Document, FrameCallback, FrameScheduler, GraphicsContext};
use crate::pointer::{ClientRect, PointerTracker};
use crate::types::{CanvasSize, ShaderStage, UniformValue};

/// Backing store size of a freshly created HTML canvas.
pub const DEFAULT_DRAWING_BUFFER: CanvasSize = CanvasSize::new(300, 150);

#[derive(Debug)]
struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: bool,
}

#[derive(Debug)]
struct ProgramRecord {
    uniforms: BTreeSet<String>,
    attributes: BTreeSet<String>,
    linked: bool,
}

#[derive(Debug, Default)]
struct GlState {
    next_id: u32,
    shaders: BTreeMap<u32, ShaderRecord>,
    programs: BTreeMap<u32, ProgramRecord>,
    buffers: BTreeMap<u32, usize>,
    current_program: Option<u32>,
    enabled_attributes: BTreeMap<String, u32>,
    uniforms: BTreeMap<String, UniformValue>,
    viewport: Option<CanvasSize>,
    viewport_calls: u64,
    draw_calls: u64,
    drawn_vertices: u64,
    invalid_deletes: u64,
}

impl GlState {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug)]
pub struct HeadlessShader(u32);

#[derive(Debug)]
pub struct HeadlessProgram(u32);

#[derive(Debug)]
pub struct HeadlessBuffer(u32);

#[derive(Debug, Clone)]
pub struct HeadlessUniform {
    name: String,
}

/// Recording graphics context. Every context handed out by one
/// [`HeadlessCanvas`] shares the same ledger, like repeated `getContext`
/// calls returning the same object.
#[derive(Debug, Clone)]
pub struct HeadlessContext {
    state: Rc<RefCell<GlState>>,
}

impl GraphicsContext for HeadlessContext {
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;
    type Buffer = HeadlessBuffer;
    type UniformLocation = HeadlessUniform;

    fn create_shader(&self, stage: ShaderStage) -> Option<HeadlessShader> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.shaders.insert(
            id,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: false,
            },
        );
        Some(HeadlessShader(id))
    }

    fn compile_shader(&self, shader: &HeadlessShader, source: &str) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        let record = state
            .shaders
            .get_mut(&shader.0)
            .ok_or_else(|| "ERROR: invalid shader object".to_string())?;
        record.source = source.to_string();
        let verdict = lint_glsl(source);
        record.compiled = verdict.is_ok();
        verdict
    }

    fn delete_shader(&self, shader: HeadlessShader) {
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader.0).is_none() {
            state.invalid_deletes += 1;
        }
    }

    fn create_program(&self) -> Option<HeadlessProgram> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.programs.insert(
            id,
            ProgramRecord {
                uniforms: BTreeSet::new(),
                attributes: BTreeSet::new(),
                linked: false,
            },
        );
        Some(HeadlessProgram(id))
    }

    fn link_program(
        &self,
        program: &HeadlessProgram,
        vertex: &HeadlessShader,
        fragment: &HeadlessShader,
    ) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        let (vertex_source, fragment_source) = {
            let (Some(vs), Some(fs)) = (state.shaders.get(&vertex.0), state.shaders.get(&fragment.0))
            else {
                return Err("ERROR: invalid shader attached to program".to_string());
            };
            if vs.stage != ShaderStage::Vertex || fs.stage != ShaderStage::Fragment {
                return Err("ERROR: program requires one vertex and one fragment shader".to_string());
            }
            if !vs.compiled || !fs.compiled {
                return Err(
                    "ERROR: one or more attached shaders not successfully compiled".to_string(),
                );
            }
            (vs.source.clone(), fs.source.clone())
        };

        let vertex_varyings: BTreeSet<String> = declarations(&vertex_source, "varying")
            .into_iter()
            .map(|decl| decl.name)
            .collect();
        if let Some(missing) = declarations(&fragment_source, "varying")
            .into_iter()
            .find(|decl| !vertex_varyings.contains(&decl.name))
        {
            return Err(format!(
                "ERROR: varying '{}' is read by the fragment shader but not declared in the vertex shader",
                missing.name
            ));
        }

        let uniforms = declarations(&vertex_source, "uniform")
            .into_iter()
            .chain(declarations(&fragment_source, "uniform"))
            .map(|decl| decl.name)
            .collect();
        let attributes = declarations(&vertex_source, "attribute")
            .into_iter()
            .map(|decl| decl.name)
            .collect();

        let record = state
            .programs
            .get_mut(&program.0)
            .ok_or_else(|| "ERROR: invalid program object".to_string())?;
        record.uniforms = uniforms;
        record.attributes = attributes;
        record.linked = true;
        Ok(())
    }

    fn delete_program(&self, program: HeadlessProgram) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program.0).is_none() {
            state.invalid_deletes += 1;
        }
        if state.current_program == Some(program.0) {
            state.current_program = None;
        }
    }

    fn use_program(&self, program: &HeadlessProgram) {
        self.state.borrow_mut().current_program = Some(program.0);
    }

    fn create_vertex_buffer(&self, data: &[u8]) -> Option<HeadlessBuffer> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.buffers.insert(id, data.len());
        Some(HeadlessBuffer(id))
    }

    fn bind_vertex_attribute(
        &self,
        program: &HeadlessProgram,
        buffer: &HeadlessBuffer,
        name: &str,
        _components: i32,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        let active = state
            .programs
            .get(&program.0)
            .is_some_and(|record| record.linked && record.attributes.contains(name));
        if !active || !state.buffers.contains_key(&buffer.0) {
            return false;
        }
        state.enabled_attributes.insert(name.to_string(), buffer.0);
        true
    }

    fn delete_buffer(&self, buffer: HeadlessBuffer) {
        let mut state = self.state.borrow_mut();
        if state.buffers.remove(&buffer.0).is_none() {
            state.invalid_deletes += 1;
        }
        state.enabled_attributes.retain(|_, bound| *bound != buffer.0);
    }

    fn uniform_location(&self, program: &HeadlessProgram, name: &str) -> Option<HeadlessUniform> {
        let state = self.state.borrow();
        let record = state.programs.get(&program.0)?;
        (record.linked && record.uniforms.contains(name)).then(|| HeadlessUniform {
            name: name.to_string(),
        })
    }

    fn set_uniform(&self, location: &HeadlessUniform, value: UniformValue) {
        self.state
            .borrow_mut()
            .uniforms
            .insert(location.name.clone(), value);
    }

    fn viewport(&self, size: CanvasSize) {
        let mut state = self.state.borrow_mut();
        state.viewport = Some(size);
        state.viewport_calls += 1;
    }

    fn draw_triangles(&self, vertex_count: i32) {
        let mut state = self.state.borrow_mut();
        state.draw_calls += 1;
        state.drawn_vertices += u64::try_from(vertex_count).unwrap_or(0);
    }
}

/// Lexical stand-in for a GLSL front end.
fn lint_glsl(source: &str) -> Result<(), String> {
    let stripped = strip_comments(source);
    let mut open: Vec<(char, usize)> = Vec::new();
    for (index, line) in stripped.lines().enumerate() {
        let line_no = index + 1;
        for ch in line.chars() {
            match ch {
                '(' | '{' | '[' => open.push((ch, line_no)),
                ')' | '}' | ']' => {
                    let expected = match ch {
                        ')' => '(',
                        '}' => '{',
                        _ => '[',
                    };
                    match open.pop() {
                        Some((found, _)) if found == expected => {}
                        _ => return Err(format!("ERROR: 0:{line_no}: '{ch}' : syntax error")),
                    }
                }
                _ => {}
            }
        }
    }
    if let Some((ch, line_no)) = open.pop() {
        return Err(format!(
            "ERROR: 0:{line_no}: '{ch}' : syntax error: unexpected end of file"
        ));
    }

    let tokens: Vec<&str> = stripped
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .collect();
    if !tokens.windows(2).any(|pair| pair == ["void", "main"]) {
        return Err("ERROR: 0:0: 'main' : function not defined".to_string());
    }
    Ok(())
}

struct CanvasInner {
    id: String,
    webgl: Cell<bool>,
    drawing: Cell<CanvasSize>,
    display: Cell<CanvasSize>,
    buffer_resizes: Cell<u64>,
    gl: Rc<RefCell<GlState>>,
    listeners: RefCell<Vec<(u64, PointerTracker)>>,
    next_listener: Cell<u64>,
}

/// In-memory canvas element with an optional recording context.
#[derive(Clone)]
pub struct HeadlessCanvas {
    inner: Rc<CanvasInner>,
}

impl HeadlessCanvas {
    /// Canvas laid out at `width`x`height` whose backing store still has the
    /// default size, like a fresh `<canvas>` styled by CSS.
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            inner: Rc::new(CanvasInner {
                id: id.into(),
                webgl: Cell::new(true),
                drawing: Cell::new(DEFAULT_DRAWING_BUFFER),
                display: Cell::new(CanvasSize::new(width, height)),
                buffer_resizes: Cell::new(0),
                gl: Rc::new(RefCell::new(GlState::default())),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Same canvas, but requests for a graphics context fail.
    pub fn without_context(self) -> Self {
        self.inner.webgl.set(false);
        self
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn set_display_size(&self, width: u32, height: u32) {
        self.inner.display.set(CanvasSize::new(width, height));
    }

    /// Number of times the backing store was resized.
    pub fn buffer_resizes(&self) -> u64 {
        self.inner.buffer_resizes.get()
    }

    pub fn live_shaders(&self) -> usize {
        self.inner.gl.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.inner.gl.borrow().programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.inner.gl.borrow().buffers.len()
    }

    pub fn live_objects(&self) -> usize {
        self.live_shaders() + self.live_programs() + self.live_buffers()
    }

    /// Deletes of objects that did not exist (double frees).
    pub fn invalid_deletes(&self) -> u64 {
        self.inner.gl.borrow().invalid_deletes
    }

    pub fn draw_calls(&self) -> u64 {
        self.inner.gl.borrow().draw_calls
    }

    pub fn drawn_vertices(&self) -> u64 {
        self.inner.gl.borrow().drawn_vertices
    }

    pub fn viewport(&self) -> Option<CanvasSize> {
        self.inner.gl.borrow().viewport
    }

    pub fn viewport_calls(&self) -> u64 {
        self.inner.gl.borrow().viewport_calls
    }

    /// Last value written to uniform `name`.
    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.inner.gl.borrow().uniforms.get(name).copied()
    }

    pub fn uniforms(&self) -> BTreeMap<String, UniformValue> {
        self.inner.gl.borrow().uniforms.clone()
    }

    /// Whether attribute `name` is wired to a live buffer.
    pub fn attribute_enabled(&self, name: &str) -> bool {
        self.inner.gl.borrow().enabled_attributes.contains_key(name)
    }

    pub fn pointer_listeners(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Delivers a pointer move in canvas-local client coordinates (origin at
    /// the element's top-left corner).
    pub fn pointer_move(&self, x: f64, y: f64) {
        let display = self.inner.display.get();
        let rect = ClientRect::new(0.0, 0.0, f64::from(display.width), f64::from(display.height));
        for (_, tracker) in self.inner.listeners.borrow().iter() {
            tracker.record_client(x, y, rect);
        }
    }
}

impl CanvasTarget for HeadlessCanvas {
    type Context = HeadlessContext;

    fn label(&self) -> String {
        self.inner.id.clone()
    }

    fn context(&self) -> Option<HeadlessContext> {
        self.inner.webgl.get().then(|| HeadlessContext {
            state: Rc::clone(&self.inner.gl),
        })
    }

    fn drawing_buffer_size(&self) -> CanvasSize {
        self.inner.drawing.get()
    }

    fn display_size(&self) -> CanvasSize {
        self.inner.display.get()
    }

    fn set_drawing_buffer_size(&self, size: CanvasSize) {
        self.inner.drawing.set(size);
        self.inner.buffer_resizes.set(self.inner.buffer_resizes.get() + 1);
    }

    fn subscribe_pointer(&self, tracker: PointerTracker) -> Option<Box<dyn Cancellable>> {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner.listeners.borrow_mut().push((id, tracker));
        Some(Box::new(HeadlessListener {
            canvas: Rc::downgrade(&self.inner),
            id,
        }))
    }
}

struct HeadlessListener {
    canvas: Weak<CanvasInner>,
    id: u64,
}

impl Cancellable for HeadlessListener {
    fn cancel(&mut self) {
        if let Some(canvas) = self.canvas.upgrade() {
            canvas
                .listeners
                .borrow_mut()
                .retain(|(listener, _)| *listener != self.id);
        }
    }
}

/// Document holding headless canvases plus any other selectable elements.
#[derive(Default)]
pub struct HeadlessDocument {
    canvases: RefCell<BTreeMap<String, HeadlessCanvas>>,
    elements: RefCell<BTreeSet<String>>,
    backgrounds: RefCell<BTreeMap<String, String>>,
}

impl HeadlessDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, canvas: HeadlessCanvas) {
        self.canvases
            .borrow_mut()
            .insert(canvas.id().to_string(), canvas);
    }

    /// Registers a non-canvas element reachable by `selector`.
    pub fn add_element(&self, selector: impl Into<String>) {
        self.elements.borrow_mut().insert(selector.into());
    }

    pub fn canvas(&self, id: &str) -> Option<HeadlessCanvas> {
        self.canvases.borrow().get(id).cloned()
    }

    pub fn canvases(&self) -> Vec<HeadlessCanvas> {
        self.canvases.borrow().values().cloned().collect()
    }

    /// Background painted on `selector`, if any.
    pub fn background(&self, selector: &str) -> Option<String> {
        self.backgrounds.borrow().get(selector).cloned()
    }
}

impl Document for HeadlessDocument {
    type Target = HeadlessCanvas;

    fn canvas_by_id(&self, id: &str) -> Option<HeadlessCanvas> {
        self.canvas(id)
    }

    fn set_background(&self, selector: &str, color: &str) -> bool {
        let known = self.elements.borrow().contains(selector)
            || selector
                .strip_prefix('#')
                .is_some_and(|id| self.canvases.borrow().contains_key(id));
        if known {
            self.backgrounds
                .borrow_mut()
                .insert(selector.to_string(), color.to_string());
        }
        known
    }
}

struct TaskSlot {
    id: u64,
    callback: Option<FrameCallback>,
    active: Rc<Cell<bool>>,
}

#[derive(Default)]
struct SchedulerInner {
    now_ms: f64,
    slots: Vec<TaskSlot>,
    next_id: u64,
    fired: u64,
}

impl SchedulerInner {
    fn slot_mut(&mut self, id: u64) -> Option<&mut TaskSlot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }

    /// Drops slots of cancelled tasks.
    fn compact(&mut self) {
        self.slots.retain(|slot| slot.active.get());
    }
}

/// Frame scheduler advanced explicitly by the caller.
///
/// Each [`advance`](Self::advance) moves the clock and fires every active
/// task exactly once, mirroring one display refresh. Cancelled tasks are
/// forgotten, so attaching and disposing canvases repeatedly keeps the
/// scheduler bounded by the number of live tasks.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler whose clock starts at `now_ms`.
    pub fn starting_at(now_ms: f64) -> Self {
        let scheduler = Self::default();
        scheduler.inner.borrow_mut().now_ms = now_ms;
        scheduler
    }

    pub fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }

    /// Moves the clock without firing anything.
    pub fn skip(&self, delta_ms: f64) {
        self.inner.borrow_mut().now_ms += delta_ms;
    }

    /// Moves the clock by `delta_ms` and fires one frame. Returns how many
    /// tasks ran.
    pub fn advance(&self, delta_ms: f64) -> usize {
        let (now, due) = {
            let mut inner = self.inner.borrow_mut();
            inner.compact();
            inner.now_ms += delta_ms;
            let due: Vec<u64> = inner
                .slots
                .iter()
                .filter(|slot| slot.callback.is_some())
                .map(|slot| slot.id)
                .collect();
            (inner.now_ms, due)
        };

        let mut ran = 0;
        for id in due {
            let taken = {
                let mut inner = self.inner.borrow_mut();
                inner.slot_mut(id).and_then(|slot| {
                    if slot.active.get() {
                        slot.callback.take().map(|cb| (cb, Rc::clone(&slot.active)))
                    } else {
                        None
                    }
                })
            };
            let Some((mut callback, active)) = taken else {
                continue;
            };
            callback(now);
            ran += 1;
            let mut inner = self.inner.borrow_mut();
            inner.fired += 1;
            if active.get() {
                if let Some(slot) = inner.slot_mut(id) {
                    slot.callback = Some(callback);
                }
            }
        }
        ran
    }

    /// Fires `frames` frames spaced `interval_ms` apart.
    pub fn run(&self, frames: usize, interval_ms: f64) {
        for _ in 0..frames {
            self.advance(interval_ms);
        }
    }

    /// Total callbacks fired across all tasks.
    pub fn ticks_fired(&self) -> u64 {
        self.inner.borrow().fired
    }

    /// Tasks still waiting for a frame.
    pub fn active_tasks(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.active.get())
            .count()
    }

    /// Task slots currently held, cancelled or not.
    pub fn tracked_tasks(&self) -> usize {
        self.inner.borrow().slots.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn now(&self) -> f64 {
        self.now_ms()
    }

    fn start(&self, callback: FrameCallback) -> Result<Box<dyn Cancellable>, HostError> {
        let active = Rc::new(Cell::new(true));
        let mut inner = self.inner.borrow_mut();
        inner.compact();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.slots.push(TaskSlot {
            id,
            callback: Some(callback),
            active: Rc::clone(&active),
        });
        Ok(Box::new(ManualTask {
            scheduler: Rc::downgrade(&self.inner),
            id,
            active,
        }))
    }
}

struct ManualTask {
    scheduler: Weak<RefCell<SchedulerInner>>,
    id: u64,
    active: Rc<Cell<bool>>,
}

impl Cancellable for ManualTask {
    fn cancel(&mut self) {
        if !self.active.replace(false) {
            return;
        }
        let Some(scheduler) = self.scheduler.upgrade() else {
            return;
        };
        // The callback is absent while it runs; `advance` drops it afterwards.
        let dropped = match scheduler.try_borrow_mut() {
            Ok(mut inner) => inner.slot_mut(self.id).and_then(|slot| slot.callback.take()),
            Err(_) => None,
        };
        drop(dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lint_reports_unbalanced_delimiters() {
        let err = lint_glsl("void main() {\n  float x = (1.0;\n}").unwrap_err();
        assert!(err.starts_with("ERROR: 0:3"), "{err}");
        assert!(lint_glsl("void main() { }").is_ok());
    }

    #[test]
    fn lint_requires_main() {
        let err = lint_glsl("float helper() { return 1.0; }").unwrap_err();
        assert!(err.contains("main"));
    }

    #[test]
    fn scheduler_fires_each_task_once_per_advance() {
        let scheduler = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let mut task = scheduler
            .start(Box::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();
        scheduler.run(3, 16.0);
        assert_eq!(hits.get(), 3);
        task.cancel();
        task.cancel();
        scheduler.run(3, 16.0);
        assert_eq!(hits.get(), 3);
        assert_eq!(scheduler.ticks_fired(), 3);
        assert_eq!(scheduler.active_tasks(), 0);
    }

    #[test]
    fn cancelled_tasks_do_not_accumulate() {
        let scheduler = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _keeper = scheduler
            .start(Box::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();
        for _ in 0..100 {
            let mut task = scheduler.start(Box::new(|_| {})).unwrap();
            scheduler.advance(16.0);
            task.cancel();
        }
        scheduler.advance(16.0);
        assert_eq!(scheduler.tracked_tasks(), 1);
        assert_eq!(scheduler.active_tasks(), 1);
        assert_eq!(hits.get(), 101);
    }

    #[test]
    fn cancel_during_callback_stops_the_task() {
        let scheduler = ManualScheduler::new();
        let slot: Rc<RefCell<Option<Box<dyn Cancellable>>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));
        let (inner_slot, counter) = (Rc::clone(&slot), Rc::clone(&hits));
        let task = scheduler
            .start(Box::new(move |_| {
                counter.set(counter.get() + 1);
                if let Some(mut task) = inner_slot.borrow_mut().take() {
                    task.cancel();
                }
            }))
            .unwrap();
        *slot.borrow_mut() = Some(task);
        scheduler.run(3, 16.0);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.tracked_tasks(), 0);
    }

    #[test]
    fn scheduler_passes_clock_to_callbacks() {
        let scheduler = ManualScheduler::starting_at(1_000.0);
        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        let _task = scheduler.start(Box::new(move |ts| sink.set(ts))).unwrap();
        scheduler.advance(16.5);
        assert_eq!(seen.get(), 1_016.5);
    }

    #[test]
    fn listeners_are_removed_on_cancel() {
        let canvas = HeadlessCanvas::new("c", 100, 100);
        let tracker = PointerTracker::new();
        let mut subscription = canvas.subscribe_pointer(tracker.clone()).unwrap();
        canvas.pointer_move(50.0, 25.0);
        assert_eq!(tracker.position(), [0.5, 0.75]);
        subscription.cancel();
        assert_eq!(canvas.pointer_listeners(), 0);
        canvas.pointer_move(10.0, 10.0);
        assert_eq!(tracker.position(), [0.5, 0.75]);
    }

    #[test]
    fn document_backgrounds_need_a_matching_element() {
        let document = HeadlessDocument::new();
        document.insert(HeadlessCanvas::new("hero-canvas", 10, 10));
        document.add_element(".hero");
        assert!(document.set_background(".hero", "#1A1A1A"));
        assert!(document.set_background("#hero-canvas", "#000"));
        assert!(!document.set_background(".missing", "#fff"));
        assert_eq!(document.background(".hero").as_deref(), Some("#1A1A1A"));
    }
}

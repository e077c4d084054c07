use crate::canvas::ShaderCanvas;
use crate::error::AttachError;
use crate::host::{CanvasTarget, Document, FrameScheduler};
use crate::types::CanvasConfig;

/// Background painted when a canvas cannot be brought up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    /// Element to paint; `#<canvas id>` when absent.
    pub selector: Option<String>,
    /// CSS color value.
    pub background: String,
}

impl Fallback {
    pub fn selector_for(&self, canvas_id: &str) -> String {
        self.selector
            .clone()
            .unwrap_or_else(|| format!("#{canvas_id}"))
    }
}

/// One canvas of a page: which element, which effect, what to do on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSpec {
    pub id: String,
    pub config: CanvasConfig,
    pub fallback: Option<Fallback>,
}

impl CanvasSpec {
    pub fn new(id: impl Into<String>, config: CanvasConfig) -> Self {
        Self {
            id: id.into(),
            config,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Every shader canvas mounted on one document.
///
/// Canvases are independent: one failing never prevents the others from
/// attaching, and failures are kept for inspection.
pub struct Page<T: CanvasTarget> {
    canvases: Vec<(String, ShaderCanvas<T>)>,
    failures: Vec<AttachError>,
}

impl<T: CanvasTarget + 'static> Page<T> {
    pub fn mount<D, S>(document: &D, scheduler: &S, specs: &[CanvasSpec]) -> Self
    where
        D: Document<Target = T> + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        let mut page = Self::new();
        for spec in specs {
            page.attach(document, scheduler, spec);
        }
        tracing::info!(
            mounted = page.canvases.len(),
            failed = page.failures.len(),
            "mounted shader canvases"
        );
        page
    }

    /// Attaches one more canvas, replacing any live canvas with the same id.
    /// Returns whether the attach succeeded; failures are logged, recorded
    /// and answered with the canvas's fallback.
    pub fn attach<D, S>(&mut self, document: &D, scheduler: &S, spec: &CanvasSpec) -> bool
    where
        D: Document<Target = T> + ?Sized,
        S: FrameScheduler + ?Sized,
    {
        if let Some(index) = self.canvases.iter().position(|(id, _)| *id == spec.id) {
            let (_, mut previous) = self.canvases.remove(index);
            previous.dispose();
        }

        let attached = match document.canvas_by_id(&spec.id) {
            Some(target) => ShaderCanvas::attach(target, scheduler, &spec.config),
            None => Err(AttachError::TargetMissing {
                canvas: spec.id.clone(),
            }),
        };
        match attached {
            Ok(canvas) => {
                self.canvases.push((spec.id.clone(), canvas));
                true
            }
            Err(err) => {
                tracing::error!(canvas = %spec.id, kind = ?err.kind(), "{err}");
                if let Some(fallback) = &spec.fallback {
                    apply_fallback(document, &spec.id, fallback);
                }
                self.failures.push(err);
                false
            }
        }
    }
}

fn apply_fallback<D: Document + ?Sized>(document: &D, canvas_id: &str, fallback: &Fallback) {
    let selector = fallback.selector_for(canvas_id);
    if document.set_background(&selector, &fallback.background) {
        tracing::info!(
            canvas = %canvas_id,
            selector = %selector,
            background = %fallback.background,
            "applied fallback background"
        );
    } else {
        tracing::warn!(canvas = %canvas_id, selector = %selector, "fallback element not found");
    }
}

impl<T: CanvasTarget> Default for Page<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CanvasTarget> Page<T> {
    pub fn new() -> Self {
        Self {
            canvases: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn canvases(&self) -> impl Iterator<Item = (&str, &ShaderCanvas<T>)> {
        self.canvases
            .iter()
            .map(|(id, canvas)| (id.as_str(), canvas))
    }

    pub fn canvas(&self, id: &str) -> Option<&ShaderCanvas<T>> {
        self.canvases
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, canvas)| canvas)
    }

    pub fn failures(&self) -> &[AttachError] {
        &self.failures
    }

    /// Ids of the canvases still rendering.
    pub fn live_ids(&self) -> Vec<&str> {
        self.canvases
            .iter()
            .filter(|(_, canvas)| !canvas.is_disposed())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn dispose_all(&mut self) {
        for (_, canvas) in &mut self.canvases {
            canvas.dispose();
        }
        self.canvases.clear();
    }
}

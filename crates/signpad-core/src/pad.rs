//! Signature capture state machine.
//!
//! The pad owns the stroke model and a drawing surface. Pointer events move
//! it between [`CaptureState::Idle`] and [`CaptureState::Drawing`]; every move
//! while drawing records a sample and renders it. Validation and export only
//! read the sealed strokes.

use crate::config::PadConfig;
use crate::ink::render_sample;
use crate::input::PointerEvent;
use crate::stroke::{SamplePoint, Stroke};
use crate::surface::{Surface, SurfaceError, SurfaceSize};
use crate::validate::{Rejection, Verdict, validate_with};
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The strokes did not pass validation; the message is user-facing.
    #[error("{0}")]
    Rejected(#[from] Rejection),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

impl ExportError {
    /// The rejection to show the user, if validation failed.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            ExportError::Rejected(r) => Some(*r),
            ExportError::Surface(_) => None,
        }
    }
}

/// Capture lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Drawing,
}

/// Callback fired when the "has signature" flag changes or the pad is cleared.
pub type SignatureListener = Box<dyn FnMut(bool)>;

/// A freehand signature pad over some [`Surface`].
pub struct SignaturePad<S: Surface> {
    surface: S,
    config: PadConfig,
    state: CaptureState,
    /// Sealed strokes, in drawing order.
    strokes: Vec<Stroke>,
    /// Stroke in progress; non-empty only while drawing.
    current: Stroke,
    /// Smoothed velocity of the last rendered sample.
    velocity: f64,
    has_signature: bool,
    listener: Option<SignatureListener>,
}

impl<S: Surface> SignaturePad<S> {
    /// Create a pad with the default configuration.
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, PadConfig::default())
    }

    /// Create a pad and paint the surface background.
    pub fn with_config(mut surface: S, config: PadConfig) -> Self {
        surface.fill_background();
        Self {
            surface,
            config,
            state: CaptureState::Idle,
            strokes: Vec::new(),
            current: Stroke::new(),
            velocity: 0.0,
            has_signature: false,
            listener: None,
        }
    }

    /// Register a callback for signature presence changes.
    pub fn set_listener(&mut self, listener: impl FnMut(bool) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Dispatch a normalized pointer event.
    pub fn handle_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(sample) => self.pointer_down(sample),
            PointerEvent::Move(sample) => self.pointer_move(sample),
            PointerEvent::Up => self.pointer_up(),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    /// Start a stroke. A stroke still in progress is sealed first, since its
    /// ink is already on the surface.
    pub fn pointer_down(&mut self, sample: SamplePoint) {
        if self.state == CaptureState::Drawing {
            self.finish_stroke();
        }
        self.current.clear();
        self.current.push(sample);
        self.velocity = 0.0;
        self.state = CaptureState::Drawing;
    }

    /// Record and render a sample. Ignored while idle.
    pub fn pointer_move(&mut self, sample: SamplePoint) {
        if self.state != CaptureState::Drawing {
            return;
        }
        self.current.push(sample);

        if let Some(velocity) = render_sample(
            &mut self.surface,
            &self.config.ink,
            self.current.points(),
            self.velocity,
        ) {
            self.velocity = velocity;
            self.mark_drawn();
        }
    }

    pub fn pointer_up(&mut self) {
        self.finish_stroke();
    }

    /// Leaving the surface ends the stroke exactly like releasing the pointer.
    pub fn pointer_leave(&mut self) {
        self.finish_stroke();
    }

    /// Discard all strokes, repaint the background and reset the flag.
    /// Works from either state; an in-progress stroke is dropped.
    pub fn clear(&mut self) {
        self.surface.fill_background();
        self.strokes.clear();
        self.current.clear();
        self.velocity = 0.0;
        self.state = CaptureState::Idle;
        self.has_signature = false;
        log::info!("Signature pad cleared");
        self.notify(false);
    }

    /// True until ink is drawn after creation or the last [`clear`](Self::clear).
    pub fn is_empty(&self) -> bool {
        !self.has_signature
    }

    /// Propagate a container resize to the surface.
    ///
    /// The surface repaints its background, so previously drawn ink is gone
    /// while the recorded strokes remain and still take part in validation.
    pub fn resize(&mut self, size: SurfaceSize) {
        log::info!(
            "Resizing signature surface to {}x{} @{}x",
            size.width,
            size.height,
            size.scale_factor
        );
        self.surface.resize(size);
    }

    /// Run the validity heuristics over the sealed strokes.
    pub fn validate(&self) -> Result<(), Rejection> {
        validate_with(&self.strokes, &self.config.rules)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from(self.validate())
    }

    /// Validate, then encode the surface as a PNG data URL.
    ///
    /// On rejection nothing is cleared; the user can keep refining the same
    /// signature.
    pub fn export_image(&self) -> Result<String, ExportError> {
        if let Err(rejection) = self.validate() {
            log::warn!("Signature rejected: {}", rejection);
            return Err(rejection.into());
        }
        Ok(self.surface.to_data_url()?)
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn current_stroke(&self) -> &Stroke {
        &self.current
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn finish_stroke(&mut self) {
        if self.state == CaptureState::Drawing && !self.current.is_empty() {
            let stroke = self.current.take();
            log::debug!(
                "Sealed stroke {} with {} points",
                self.strokes.len(),
                stroke.len()
            );
            self.strokes.push(stroke);
        }
        self.current.clear();
        self.state = CaptureState::Idle;
    }

    fn mark_drawn(&mut self) {
        if !self.has_signature {
            self.has_signature = true;
            self.notify(true);
        }
    }

    fn notify(&mut self, has_signature: bool) {
        if let Some(listener) = self.listener.as_mut() {
            listener(has_signature);
        }
    }
}

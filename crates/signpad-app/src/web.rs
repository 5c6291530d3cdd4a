//! WebAssembly entry point and the HTML canvas binding.

use crate::recording::Recording;
use kurbo::Point;
use signpad_core::input::now_millis;
use signpad_core::{
    ExportError, PadConfig, PointerEvent, PointerPhase, RawInput, SignaturePad, Surface,
    SurfaceError, SurfaceSize,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, TouchEvent};

/// A 2D canvas context as a pad surface.
///
/// The backing store is sized in physical pixels and the context transform
/// maps logical units onto it, so ink stays crisp on high-DPI screens. The
/// element's CSS size is pinned to the logical size.
struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    size: SurfaceSize,
    ink_color: String,
    background_color: String,
}

impl CanvasSurface {
    fn new(canvas: HtmlCanvasElement, config: &PadConfig) -> Result<Self, JsValue> {
        config
            .ink_color()
            .and(config.background_color())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let size = measure(&canvas);
        let mut surface = Self {
            canvas,
            ctx,
            size,
            ink_color: config.ink_color.clone(),
            background_color: config.background_color.clone(),
        };
        surface.resize(size);
        Ok(surface)
    }

    /// Top-left corner of the canvas in client coordinates.
    fn origin(&self) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        Point::new(rect.left(), rect.top())
    }
}

/// Logical size and device pixel ratio for a canvas. The canvas fills its
/// container, so the container is measured when there is one.
fn measure(canvas: &HtmlCanvasElement) -> SurfaceSize {
    let rect = match canvas.parent_element() {
        Some(container) => container.get_bounding_client_rect(),
        None => canvas.get_bounding_client_rect(),
    };
    let ratio = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);
    SurfaceSize::new(rect.width(), rect.height()).with_scale_factor(ratio)
}

impl Surface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        let (width, height) = size.physical();
        self.size = size;
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        let (css_width, css_height) = size.css_size();
        let style = self.canvas.style();
        if let Err(e) = style
            .set_property("width", &css_width)
            .and(style.set_property("height", &css_height))
        {
            log::warn!("Failed to pin canvas CSS size: {:?}", e);
        }

        // Changing the canvas dimensions resets all context state.
        let ratio = size.scale_factor;
        if let Err(e) = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            log::warn!("Failed to scale canvas context: {:?}", e);
        }
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.fill_background();
    }

    fn fill_background(&mut self) {
        self.ctx.set_fill_style_str(&self.background_color);
        self.ctx
            .fill_rect(0.0, 0.0, self.size.width, self.size.height);
    }

    fn stroke_segment(&mut self, from: Point, to: Point, width: f64) {
        self.ctx.set_stroke_style_str(&self.ink_color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn to_data_url(&self) -> Result<String, SurfaceError> {
        self.canvas
            .to_data_url_with_type("image/png")
            .map_err(|e| SurfaceError::Encode(format!("{:?}", e)))
    }
}

/// Read the first pointer position and pressure from a DOM mouse or touch
/// event. Touch events are default-prevented so the page does not scroll
/// while signing.
fn raw_input(event: &Event) -> Option<RawInput> {
    if let Some(touch_event) = event.dyn_ref::<TouchEvent>() {
        touch_event.prevent_default();
        let touch = touch_event.touches().get(0);
        return Some(RawInput::Touch {
            client: touch
                .as_ref()
                .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64)),
            force: touch.map(|t| t.force()).filter(|f| *f > 0.0),
        });
    }
    event.dyn_ref::<MouseEvent>().map(|m| RawInput::Mouse {
        client: Point::new(m.client_x() as f64, m.client_y() as f64),
    })
}

type SharedPad = Rc<RefCell<SignaturePad<CanvasSurface>>>;

/// Re-measure the canvas and resize the pad. Skipped while the pad is
/// borrowed by a call already in progress.
fn refit(pad: &SharedPad) {
    let Ok(mut pad) = pad.try_borrow_mut() else {
        log::debug!("Pad busy, skipping resize");
        return;
    };
    let size = measure(&pad.surface().canvas);
    if size != pad.surface().size() {
        pad.resize(size);
    }
}

/// Signature pad bound to an HTML canvas.
///
/// Wire `mousedown`/`touchstart` to [`pointer_down`](Self::pointer_down) and
/// so on; mouse and touch events go through the same methods. The pad
/// follows window `resize` events on its own; call
/// [`resize`](Self::resize) when only the container changed.
#[wasm_bindgen]
pub struct WebSignaturePad {
    pad: SharedPad,
    last_rejection: Option<String>,
    // Kept alive for as long as the listener is registered
    on_resize: Option<Closure<dyn Fn()>>,
}

#[wasm_bindgen]
impl WebSignaturePad {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<WebSignaturePad, JsValue> {
        Self::with_config(canvas, PadConfig::default())
    }

    /// Create a pad from a JSON configuration string.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config_json(
        canvas: HtmlCanvasElement,
        config: &str,
    ) -> Result<WebSignaturePad, JsValue> {
        let config = PadConfig::from_json(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::with_config(canvas, config)
    }

    /// Register `callback(hasSignature)`.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: js_sys::Function) {
        self.pad.borrow_mut().set_listener(move |has_signature| {
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_bool(has_signature)) {
                log::warn!("Signature listener failed: {:?}", e);
            }
        });
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, event: &Event) {
        self.dispatch(PointerPhase::Down, event);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, event: &Event) {
        self.dispatch(PointerPhase::Move, event);
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, event: &Event) {
        self.dispatch(PointerPhase::Up, event);
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self, event: &Event) {
        self.dispatch(PointerPhase::Leave, event);
    }

    /// Re-measure the canvas after its container changed size.
    pub fn resize(&mut self) {
        refit(&self.pad);
    }

    pub fn clear(&mut self) {
        self.last_rejection = None;
        self.pad.borrow_mut().clear();
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.pad.borrow().is_empty()
    }

    /// Validate and export. Returns `undefined` when the signature is
    /// rejected; the reason is then available from `lastRejection`.
    #[wasm_bindgen(js_name = toDataURL)]
    pub fn to_data_url(&mut self) -> Result<Option<String>, JsValue> {
        let exported = self.pad.borrow().export_image();
        match exported {
            Ok(url) => {
                self.last_rejection = None;
                Ok(Some(url))
            }
            Err(ExportError::Rejected(rejection)) => {
                self.last_rejection = Some(rejection.to_string());
                Ok(None)
            }
            Err(e) => Err(JsValue::from_str(&e.to_string())),
        }
    }

    /// User-facing reason of the last rejected export.
    #[wasm_bindgen(getter, js_name = lastRejection)]
    pub fn last_rejection(&self) -> Option<String> {
        self.last_rejection.clone()
    }

    /// Verdict as `{valid, reason}` JSON, without exporting.
    pub fn verdict(&self) -> String {
        serde_json::to_string(&self.pad.borrow().verdict()).unwrap_or_default()
    }

    /// Strokes captured so far, in the CLI's recording format.
    #[wasm_bindgen(js_name = toRecording)]
    pub fn to_recording(&self) -> Result<String, JsValue> {
        Recording::from_pad(&*self.pad.borrow())
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebSignaturePad {
    fn with_config(canvas: HtmlCanvasElement, config: PadConfig) -> Result<Self, JsValue> {
        let surface = CanvasSurface::new(canvas, &config)?;
        let pad = Rc::new(RefCell::new(SignaturePad::with_config(surface, config)));

        let mut web_pad = Self {
            pad,
            last_rejection: None,
            on_resize: None,
        };
        web_pad.listen_for_resize();
        Ok(web_pad)
    }

    fn listen_for_resize(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let pad = Rc::downgrade(&self.pad);
        let on_resize = Closure::wrap(Box::new(move || {
            if let Some(pad) = pad.upgrade() {
                refit(&pad);
            }
        }) as Box<dyn Fn()>);

        match window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref()) {
            Ok(()) => self.on_resize = Some(on_resize),
            Err(e) => log::warn!("Failed to listen for window resize: {:?}", e),
        }
    }

    fn dispatch(&mut self, phase: PointerPhase, event: &Event) {
        let Some(input) = raw_input(event) else {
            return;
        };
        let mut pad = self.pad.borrow_mut();
        let origin = pad.surface().origin();
        pad.handle_event(PointerEvent::from_raw(phase, &input, origin, now_millis()));
    }
}

impl Drop for WebSignaturePad {
    fn drop(&mut self) {
        let (Some(window), Some(on_resize)) = (web_sys::window(), self.on_resize.take()) else {
            return;
        };
        if let Err(e) =
            window.remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        {
            log::warn!("Failed to remove resize listener: {:?}", e);
        }
    }
}

/// Initialize logging and panic reporting.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Signature pad module loaded");
}

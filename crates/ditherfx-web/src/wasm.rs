#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: canvas-backed ditherfx effects.
//!
//! Only compiled on `wasm32` targets. Each exported class owns an
//! `Rc<RefCell<RunnerCore<WebHost, _>>>`; browser callbacks hold only a
//! `Weak` to it, so dropping the class (or calling `destroy`) ends the
//! animation even if the page forgets to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ditherfx_core::SurfaceSize;
use ditherfx_render::{DitherGradientFx, NoiseTextureFx, RasterFrame, XorShiftNoise};
use ditherfx_runtime::{
    DrawSurface, FrameHandle, FrameScheduler, HostError, ResizeObserver,
};
use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, Window};

use super::runner_core::{JsonConfigured, RunnerCore};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Receiver for browser callbacks.
trait CallbackSink {
    fn frame(&mut self, handle: FrameHandle, timestamp_ms: f64);
    fn resize(&mut self);
}

type SharedSink = Weak<RefCell<dyn CallbackSink>>;

/// Browser host: 2D canvas context, window `resize`, `requestAnimationFrame`.
pub struct WebHost {
    window: Option<Window>,
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
    sink: Option<SharedSink>,
    resize_listener: Option<Closure<dyn FnMut()>>,
    next_handle: u64,
    pending: Option<(FrameHandle, i32)>,
}

impl WebHost {
    fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            window: web_sys::window(),
            canvas,
            ctx: None,
            sink: None,
            resize_listener: None,
            next_handle: 0,
            pending: None,
        }
    }

    fn bind(&mut self, sink: SharedSink) {
        self.sink = Some(sink);
    }

    fn window(&self) -> Result<&Window, HostError> {
        self.window.as_ref().ok_or(HostError::ContextUnavailable)
    }
}

impl DrawSurface for WebHost {
    fn acquire(&mut self) -> Result<(), HostError> {
        self.window()?;
        let ctx = self
            .canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(HostError::ContextUnavailable)?;
        self.ctx = Some(ctx);
        Ok(())
    }

    fn container_size(&self) -> SurfaceSize {
        let rect = self.canvas.get_bounding_client_rect();
        SurfaceSize::from_layout(rect.width(), rect.height())
    }

    fn present(&mut self, frame: &RasterFrame) -> Result<(), HostError> {
        let ctx = self.ctx.as_ref().ok_or(HostError::ContextUnavailable)?;
        if self.canvas.width() != frame.width() {
            self.canvas.set_width(frame.width());
        }
        if self.canvas.height() != frame.height() {
            self.canvas.set_height(frame.height());
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame.as_bytes()),
            frame.width(),
            frame.height(),
        )
        .map_err(|e| HostError::Present(js_message(&e)))?;
        ctx.put_image_data(&image, 0.0, 0.0)
            .map_err(|e| HostError::Present(js_message(&e)))
    }
}

impl ResizeObserver for WebHost {
    fn observe(&mut self) -> Result<(), HostError> {
        let window = self.window()?.clone();
        let sink = self.sink.clone();
        let listener = Closure::wrap(Box::new(move || {
            let Some(sink) = sink.as_ref().and_then(Weak::upgrade) else {
                return;
            };
            if let Ok(mut sink) = sink.try_borrow_mut() {
                sink.resize();
            }
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())
            .map_err(|e| HostError::Observer(js_message(&e)))?;
        self.resize_listener = Some(listener);
        Ok(())
    }

    fn unobserve(&mut self) {
        let Some(listener) = self.resize_listener.take() else {
            return;
        };
        if let Some(window) = &self.window {
            let _ = window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref());
        }
    }
}

impl FrameScheduler for WebHost {
    fn request_frame(&mut self) -> Result<FrameHandle, HostError> {
        let window = self.window()?;
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        let sink = self.sink.clone();
        // Freed by wasm-bindgen once it fires; a cancelled callback is
        // reclaimed with the JS function.
        let callback = Closure::once_into_js(move |timestamp_ms: f64| {
            let Some(sink) = sink.as_ref().and_then(Weak::upgrade) else {
                return;
            };
            if let Ok(mut sink) = sink.try_borrow_mut() {
                sink.frame(handle, timestamp_ms);
            }
        });
        let id = window
            .request_animation_frame(callback.unchecked_ref())
            .map_err(|e| HostError::Present(js_message(&e)))?;
        self.pending = Some((handle, id));
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let (Some((pending, id)), Some(window)) = (self.pending, &self.window)
            && pending == handle
        {
            let _ = window.cancel_animation_frame(id);
            self.pending = None;
        }
    }
}

impl<F: JsonConfigured + 'static> CallbackSink for RunnerCore<WebHost, F> {
    fn frame(&mut self, handle: FrameHandle, timestamp_ms: f64) {
        self.on_frame(handle, timestamp_ms);
    }

    fn resize(&mut self) {
        self.on_resize();
    }
}

fn spawn<F: JsonConfigured + 'static>(
    canvas: HtmlCanvasElement,
    config: Option<String>,
) -> Rc<RefCell<RunnerCore<WebHost, F>>> {
    install_panic_hook();
    let core = Rc::new(RefCell::new(RunnerCore::<WebHost, F>::new(
        WebHost::new(canvas),
        config.as_deref(),
    )));
    let sink: SharedSink = Rc::downgrade(&core) as Weak<RefCell<dyn CallbackSink>>;
    let mut runner = core.borrow_mut();
    runner.host_mut().bind(sink);
    // Unsupported environments stay silent: nothing renders.
    runner.mount();
    drop(runner);
    core
}

fn with_core<F: JsonConfigured, R>(
    core: &Rc<RefCell<RunnerCore<WebHost, F>>>,
    fallback: R,
    f: impl FnOnce(&mut RunnerCore<WebHost, F>) -> R,
) -> R {
    match core.try_borrow_mut() {
        Ok(mut core) => f(&mut core),
        Err(_) => fallback,
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

/// Animated dithered gradient drawn into a `<canvas>`.
///
/// ```js
/// const fx = new DitherGradientCanvas(canvas, JSON.stringify({ angle: 120 }));
/// fx.setConfig(JSON.stringify({ colorFrom: "#06b6d4" }));
/// fx.destroy();
/// ```
#[wasm_bindgen]
pub struct DitherGradientCanvas {
    inner: Rc<RefCell<RunnerCore<WebHost, DitherGradientFx<XorShiftNoise>>>>,
}

#[wasm_bindgen]
impl DitherGradientCanvas {
    /// Mount on `canvas` and start animating. `config` is an optional JSON
    /// object with `colorFrom`, `colorMid`, `colorTo`, `intensity`, `speed`
    /// and `angle`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> Self {
        Self {
            inner: spawn(canvas, config),
        }
    }

    /// Replace the configuration; applies on the next frame.
    /// Returns `false` for malformed JSON.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, json: &str) -> bool {
        with_core(&self.inner, false, |core| core.set_config(json))
    }

    /// Stop animating and detach from the page. Idempotent.
    pub fn destroy(&self) {
        with_core(&self.inner, (), RunnerCore::destroy);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        with_core(&self.inner, false, |core| core.is_running())
    }

    #[wasm_bindgen(js_name = framesPresented)]
    pub fn frames_presented(&self) -> f64 {
        with_core(&self.inner, 0.0, |core| core.stats().frames_presented as f64)
    }
}

/// Film-grain overlay drawn into a `<canvas>`.
#[wasm_bindgen]
pub struct NoiseTextureCanvas {
    inner: Rc<RefCell<RunnerCore<WebHost, NoiseTextureFx<XorShiftNoise>>>>,
}

#[wasm_bindgen]
impl NoiseTextureCanvas {
    /// `config` is an optional JSON object with `opacity`, `speed`,
    /// `grain` (`"fine"`, `"medium"`, `"coarse"`) and `animate`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> Self {
        Self {
            inner: spawn(canvas, config),
        }
    }

    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&self, json: &str) -> bool {
        with_core(&self.inner, false, |core| core.set_config(json))
    }

    pub fn destroy(&self) {
        with_core(&self.inner, (), RunnerCore::destroy);
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        with_core(&self.inner, false, |core| core.is_running())
    }

    #[wasm_bindgen(js_name = framesPresented)]
    pub fn frames_presented(&self) -> f64 {
        with_core(&self.inner, 0.0, |core| core.stats().frames_presented as f64)
    }
}

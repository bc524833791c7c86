use super::OverlayLayer;
use crate::engine::*;
use crate::util::*;
use glam::{vec2, Vec2};
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos_use::use_resize_observer;
use send_wrapper::SendWrapper;
use std::cell::{OnceCell, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::warn;
use wasm_bindgen::Clamped;

/// Browser objects the engine paints into and listens through.
#[derive(Default)]
struct Surface {
	element: Option<web_sys::HtmlCanvasElement>,
	context: Option<web_sys::CanvasRenderingContext2d>,
	frame: Option<AnimationFrameRequestHandle>,
	listeners: Vec<WindowListenerHandle>,
}

impl Surface {
	fn present(&self, canvas: &InkCanvas) {
		let (Some(context), Some(raster)) = (&self.context, canvas.backing_store()) else {
			return;
		};
		let Some(data) = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
			Clamped(raster.as_bytes()),
			raster.width(),
			raster.height(),
		)
		.map_err(JsError::from)
		.ok_or_log() else {
			return;
		};
		context
			.put_image_data(&data, 0.0, 0.0)
			.map_err(JsError::from)
			.ok_or_log();
	}
}

struct Shared {
	canvas: RefCell<InkCanvas>,
	surface: Rc<RefCell<Surface>>,
	revision: RwSignal<u64>,
}

type Link = Rc<OnceCell<Weak<Shared>>>;

fn upgrade(link: &Link) -> Option<Rc<Shared>> {
	link.get().and_then(Weak::upgrade)
}

impl Shared {
	fn element(&self) -> Option<web_sys::HtmlCanvasElement> {
		self.surface.borrow().element.clone()
	}

	fn bump(&self) {
		self.revision.update(|revision| *revision += 1);
	}

	fn render_frame(&self) {
		let Ok(mut canvas) = self.canvas.try_borrow_mut() else {
			warn!("canvas busy during frame");
			return;
		};
		canvas.render_frame();
		self.surface.borrow().present(&canvas);
	}

	fn pointer_down(&self, event: &web_sys::PointerEvent) -> PointerDown {
		let Some(element) = self.element() else {
			return PointerDown::Ignored;
		};
		let sample = pointer_down_sample(event, &element);
		let mut canvas = self.canvas.borrow_mut();
		let down = canvas.pointer_down(sample);
		if let PointerDown::Stroke(_) = down {
			self.surface.borrow().present(&canvas);
		}
		down
	}

	fn pointer_move(&self, event: &web_sys::PointerEvent) {
		let Some(element) = self.element() else {
			return;
		};
		let samples = pointer_samples(event, &element);
		self.canvas
			.borrow_mut()
			.pointer_move(event.pointer_id(), &samples);
	}

	fn pointer_up(&self, event: &web_sys::PointerEvent, cancelled: bool) {
		let ended = {
			let mut canvas = self.canvas.borrow_mut();
			if cancelled {
				canvas.pointer_cancel(event.pointer_id())
			} else {
				canvas.pointer_up(event.pointer_id())
			}
		};
		if ended {
			self.bump();
		}
	}
}

/// Requests animation frames on behalf of the compositor.
struct BrowserFrames {
	link: Link,
	surface: Rc<RefCell<Surface>>,
}

impl FrameScheduler for BrowserFrames {
	fn schedule(&mut self) -> bool {
		let link = self.link.clone();
		let surface = self.surface.clone();
		let handle = request_animation_frame_with_handle(move || {
			surface.borrow_mut().frame = None;
			if let Some(shared) = upgrade(&link) {
				shared.render_frame();
			}
		})
		.map_err(JsError::from)
		.ok_or_log();
		let scheduled = handle.is_some();
		self.surface.borrow_mut().frame = handle;
		scheduled
	}

	fn cancel(&mut self) {
		if let Some(handle) = self.surface.borrow_mut().frame.take() {
			handle.cancel();
		}
	}
}

/// Pointer capture on the canvas element plus window listeners leased per session.
struct BrowserHost {
	link: Link,
	surface: Rc<RefCell<Surface>>,
}

impl BrowserHost {
	fn element(&self) -> Result<web_sys::HtmlCanvasElement, CaptureError> {
		self.surface
			.borrow()
			.element
			.clone()
			.ok_or(CaptureError::Unsupported)
	}
}

impl SessionHost for BrowserHost {
	fn capture_pointer(&mut self, pointer_id: i32) -> Result<(), CaptureError> {
		self.element()?.capture(pointer_id)
	}

	fn release_pointer(&mut self, pointer_id: i32) -> Result<(), CaptureError> {
		self.element()?.release(pointer_id)
	}

	fn attach_session_listeners(&mut self) {
		let on_move = {
			let link = self.link.clone();
			window_event_listener(ev::pointermove, move |event| {
				if let Some(shared) = upgrade(&link) {
					shared.pointer_move(&event);
				}
			})
		};
		let on_up = {
			let link = self.link.clone();
			window_event_listener(ev::pointerup, move |event| {
				if let Some(shared) = upgrade(&link) {
					shared.pointer_up(&event, false);
				}
			})
		};
		let on_cancel = {
			let link = self.link.clone();
			window_event_listener(ev::pointercancel, move |event| {
				if let Some(shared) = upgrade(&link) {
					shared.pointer_up(&event, true);
				}
			})
		};
		self.surface
			.borrow_mut()
			.listeners
			.extend([on_move, on_up, on_cancel]);
	}

	fn detach_session_listeners(&mut self) {
		let listeners = std::mem::take(&mut self.surface.borrow_mut().listeners);
		for listener in listeners {
			listener.remove();
		}
	}
}

/// Shared access to a browser-bound [`InkCanvas`].
///
/// The canvas is single-threaded; the wrapper only lets the handle travel through leptos
/// contexts and callbacks.
#[derive(Clone)]
pub struct CanvasHandle(Arc<SendWrapper<Rc<Shared>>>);

impl CanvasHandle {
	pub fn new(options: CanvasOptions) -> Result<Self, CanvasError> {
		let link: Link = Default::default();
		let surface: Rc<RefCell<Surface>> = Default::default();
		let canvas = InkCanvas::new(
			options,
			BrowserFrames {
				link: link.clone(),
				surface: surface.clone(),
			},
			BrowserHost {
				link: link.clone(),
				surface: surface.clone(),
			},
		)?;
		let shared = Rc::new(Shared {
			canvas: RefCell::new(canvas),
			surface,
			revision: RwSignal::new(0),
		});
		let _ = link.set(Rc::downgrade(&shared));
		Ok(Self(Arc::new(SendWrapper::new(shared))))
	}

	fn shared(&self) -> &Shared {
		&self.0
	}

	/// Bumped whenever the committed strokes change.
	pub fn revision(&self) -> Signal<u64> {
		self.shared().revision.into()
	}

	pub fn with<R>(&self, f: impl FnOnce(&InkCanvas) -> R) -> R {
		f(&self.shared().canvas.borrow())
	}

	/// Mutates the canvas and shows the result.
	pub fn update<R>(&self, f: impl FnOnce(&mut InkCanvas) -> R) -> R {
		let shared = self.shared();
		let mut canvas = shared.canvas.borrow_mut();
		let result = f(&mut canvas);
		shared.surface.borrow().present(&canvas);
		result
	}

	pub fn undo(&self) -> bool {
		let undone = self.update(InkCanvas::undo);
		self.shared().bump();
		undone
	}

	pub fn redo(&self) -> bool {
		let redone = self.update(InkCanvas::redo);
		self.shared().bump();
		redone
	}

	pub fn clear(&self) {
		self.update(InkCanvas::clear);
		self.shared().bump();
	}

	pub fn set_annotation_mode(&self, annotation_mode: bool) {
		if self.update(|canvas| canvas.set_annotation_mode(annotation_mode)) {
			self.shared().bump();
		}
	}

	pub fn export_png(&self) -> impl Future<Output = Option<Vec<u8>>> + 'static {
		self.shared().canvas.borrow_mut().export_png()
	}

	fn attach(&self, element: web_sys::HtmlCanvasElement) {
		let context = context_2d(&element);
		if context.is_none() {
			warn!("canvas has no 2d context");
		}
		let mut surface = self.shared().surface.borrow_mut();
		surface.element = Some(element);
		surface.context = context;
	}

	fn resize(&self, size: Vec2) {
		let ratio = device_pixel_ratio();
		if let Some(element) = self.shared().element() {
			let physical = (size * ratio).round().max(Vec2::ZERO);
			element.set_width(physical.x as u32);
			element.set_height(physical.y as u32);
		}
		self.update(|canvas| canvas.resize(size, ratio));
	}

	fn detach(&self) {
		let shared = self.shared();
		// Cancels through the engine so its pending-frame flag is reset too.
		shared.canvas.borrow_mut().detach();
		let mut surface = shared.surface.borrow_mut();
		surface.context = None;
		surface.element = None;
	}
}

#[component]
pub fn InkCanvasView(
	handle: CanvasHandle,
	#[prop(into)] brush_color: Signal<String>,
	#[prop(into)] brush_size: Signal<f32>,
	#[prop(into)] eraser: Signal<bool>,
	#[prop(into)] annotation_mode: Signal<bool>,
	#[prop(into)] overlays: Signal<Vec<CanvasOverlay>>,
	#[prop(into, optional)] awaiting_tap: Signal<bool>,
	#[prop(optional)] on_tap: Option<Callback<NormalizedPoint>>,
) -> impl IntoView {
	let node_ref = NodeRef::<html::Canvas>::new();
	let container = RwSignal::new(Vec2::ZERO);

	Effect::new({
		let handle = handle.clone();
		move |_| {
			let color = brush_color.get();
			handle.update(|canvas| canvas.set_brush_color(&color)).ok_or_warn();
		}
	});
	Effect::new({
		let handle = handle.clone();
		move |_| {
			let size = brush_size.get();
			handle.update(|canvas| canvas.set_brush_size(size)).ok_or_warn();
		}
	});
	Effect::new({
		let handle = handle.clone();
		move |_| {
			let eraser = eraser.get();
			handle.update(|canvas| canvas.set_eraser(eraser));
		}
	});
	Effect::new({
		let handle = handle.clone();
		move |_| {
			handle.set_annotation_mode(annotation_mode.get());
		}
	});
	if let Some(on_tap) = on_tap {
		handle.update(|canvas| canvas.set_on_tap(move |point| on_tap.run(point)));
	}

	Effect::new({
		let handle = handle.clone();
		move |_| {
			if let Some(element) = node_ref.get() {
				handle.attach(element);
			}
		}
	});
	on_cleanup({
		let handle = handle.clone();
		move || handle.detach()
	});

	use_resize_observer(node_ref, {
		let handle = handle.clone();
		move |entries, _| {
			let Some(entry) = entries.first() else {
				return;
			};
			let rect = entry.content_rect();
			let size = vec2(rect.width() as f32, rect.height() as f32);
			handle.resize(size);
			container.set(size);
		}
	});

	let pointerdown = {
		let handle = handle.clone();
		move |event: ev::PointerEvent| {
			if handle.shared().pointer_down(&event) != PointerDown::Ignored {
				event.prevent_default();
			}
		}
	};

	let hint = move || tap_hint(annotation_mode.get(), awaiting_tap.get());

	view! {
		<div class="InkCanvas" style="position:relative;width:100%;height:100%">
			<canvas
				node_ref=node_ref
				style="display:block;width:100%;height:100%;touch-action:none"
				on:pointerdown=pointerdown
			/>
			<OverlayLayer overlays=overlays container=container />
			{move || hint().map(|text| view! { <div class="TapHint">{text}</div> })}
		</div>
	}
}

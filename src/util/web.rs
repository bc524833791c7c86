use super::ResultExt;
use crate::engine::{CaptureError, PointerKind, PointerSample};
use glam::Vec2;
use wasm_bindgen::JsCast;

#[derive(thiserror::Error, Debug)]
#[error("javascript error: {0}")]
pub struct JsError(String);

impl From<wasm_bindgen::JsValue> for JsError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		JsError(format!("{:?}", value))
	}
}

impl From<JsError> for CaptureError {
	fn from(error: JsError) -> Self {
		CaptureError::Platform(error.0)
	}
}

pub trait PointerCapture {
	fn capture(&self, pointer_id: i32) -> Result<(), CaptureError>;
	fn release(&self, pointer_id: i32) -> Result<(), CaptureError>;
}

impl PointerCapture for web_sys::Element {
	fn capture(&self, pointer_id: i32) -> Result<(), CaptureError> {
		Ok(self.set_pointer_capture(pointer_id).map_err(JsError::from)?)
	}

	fn release(&self, pointer_id: i32) -> Result<(), CaptureError> {
		if !self.has_pointer_capture(pointer_id) {
			return Err(CaptureError::InactivePointer(pointer_id));
		}
		Ok(self.release_pointer_capture(pointer_id).map_err(JsError::from)?)
	}
}

pub trait CoordinateSource {
	/// Position relative to `element`'s border box, in CSS pixels.
	fn surface_position(&self, element: &web_sys::Element) -> Vec2;
}

/// Size of `element`'s border box, in CSS pixels.
pub fn bounding_size(element: &web_sys::Element) -> Vec2 {
	let rect = element.get_bounding_client_rect();
	Vec2::new(rect.width() as f32, rect.height() as f32)
}

impl CoordinateSource for web_sys::PointerEvent {
	fn surface_position(&self, element: &web_sys::Element) -> Vec2 {
		let rect = element.get_bounding_client_rect();
		Vec2::new(
			self.client_x() as f32 - rect.left() as f32,
			self.client_y() as f32 - rect.top() as f32,
		)
	}
}

fn sample(
	event: &web_sys::PointerEvent,
	element: &web_sys::Element,
	target_size: Vec2,
) -> PointerSample {
	PointerSample {
		pointer_id: event.pointer_id(),
		kind: PointerKind::from_pointer_type(&event.pointer_type()),
		position: event.surface_position(element),
		pressure: event.pressure(),
		timestamp: event.time_stamp(),
		primary_button: event.buttons() & 1 != 0,
		target_size,
	}
}

/// Every sample the browser coalesced into `event`, oldest first.
pub fn pointer_samples(
	event: &web_sys::PointerEvent,
	element: &web_sys::Element,
) -> Vec<PointerSample> {
	let target_size = bounding_size(element);
	let coalesced: Vec<PointerSample> = event
		.get_coalesced_events()
		.iter()
		.filter_map(|e| e.dyn_into::<web_sys::PointerEvent>().ok())
		.map(|e| sample(&e, element, target_size))
		.collect();
	if coalesced.is_empty() {
		vec![sample(event, element, target_size)]
	} else {
		coalesced
	}
}

pub fn pointer_down_sample(
	event: &web_sys::PointerEvent,
	element: &web_sys::Element,
) -> PointerSample {
	PointerSample {
		primary_button: event.button() == 0,
		..sample(event, element, bounding_size(element))
	}
}

pub fn encode_data_url(data: &[u8], mediatype: Option<&str>) -> String {
	use base64::engine::*;
	let mediatype = mediatype.unwrap_or("");
	let data = general_purpose::STANDARD.encode(data);
	format!("data:{mediatype};base64,{data}")
}

pub fn device_pixel_ratio() -> f32 {
	web_sys::window()
		.map(|window| window.device_pixel_ratio() as f32)
		.unwrap_or(1.0)
}

pub fn context_2d(
	element: &web_sys::HtmlCanvasElement,
) -> Option<web_sys::CanvasRenderingContext2d> {
	element
		.get_context("2d")
		.map_err(JsError::from)
		.ok_or_log()
		.flatten()
		.and_then(|context| context.dyn_into().ok())
}

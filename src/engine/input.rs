use super::*;
use crate::util::ResultExt;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// One raw pointer sample, in the target element's surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
	pub pointer_id: i32,
	pub kind: PointerKind,
	pub position: Vec2,
	pub pressure: f32,
	/// Milliseconds on the input source's monotonic clock.
	pub timestamp: f64,
	/// Whether the primary button is held. Only consulted for mice.
	pub primary_button: bool,
	/// Size of the target element's bounding box. Taps are normalized against it.
	pub target_size: Vec2,
}

/// A point normalized to the target's bounding box, both coordinates in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
	pub x: f32,
	pub y: f32,
}

impl NormalizedPoint {
	pub fn from_surface(position: Vec2, size: Vec2) -> Self {
		fn axis(value: f32, extent: f32) -> f32 {
			if extent > 0.0 && value.is_finite() {
				(value / extent).clamp(0.0, 1.0)
			} else {
				0.0
			}
		}
		Self {
			x: axis(position.x, size.x),
			y: axis(position.y, size.y),
		}
	}
}

/// What a pointer-down turned into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerDown {
	Tap(NormalizedPoint),
	Stroke(StrokeId),
	Ignored,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
	#[error("pointer capture is not supported")]
	Unsupported,

	#[error("pointer {0} is not active")]
	InactivePointer(i32),

	#[error("platform error: {0}")]
	Platform(String),
}

static_assertions::assert_impl_all!(CaptureError: std::error::Error, Send, Sync);

/// Platform services leased for the duration of one drawing session.
pub trait SessionHost {
	fn capture_pointer(&mut self, pointer_id: i32) -> Result<(), CaptureError>;
	fn release_pointer(&mut self, pointer_id: i32) -> Result<(), CaptureError>;
	/// Starts routing move/up/cancel events for the session.
	fn attach_session_listeners(&mut self);
	fn detach_session_listeners(&mut self);
}

/// A host with no pointer capture and nothing to attach.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedHost;

impl SessionHost for DetachedHost {
	fn capture_pointer(&mut self, _pointer_id: i32) -> Result<(), CaptureError> {
		Err(CaptureError::Unsupported)
	}

	fn release_pointer(&mut self, _pointer_id: i32) -> Result<(), CaptureError> {
		Err(CaptureError::Unsupported)
	}

	fn attach_session_listeners(&mut self) {}
	fn detach_session_listeners(&mut self) {}
}

/// The device-session view of a canvas, for drivers that deliver whole batches of samples.
pub trait InputSession {
	fn begin(&mut self, sample: PointerSample) -> PointerDown;
	/// Returns how many samples were stored.
	fn extend(&mut self, samples: &[PointerSample]) -> usize;
	fn end(&mut self);
}

impl InkCanvas {
	pub fn pointer_down(&mut self, sample: PointerSample) -> PointerDown {
		if self.annotation_mode {
			let size = sample.target_size;
			if !size.is_finite() || !size.cmpgt(Vec2::ZERO).all() {
				trace!(?size, "tap on a target with no area");
				return PointerDown::Ignored;
			}
			let point = NormalizedPoint::from_surface(sample.position, size);
			trace!(?point, "annotation tap");
			if let Some(on_tap) = self.on_tap.as_mut() {
				on_tap(point);
			}
			return PointerDown::Tap(point);
		}
		if let Some(session) = self.model.session() {
			trace!(
				pointer_id = sample.pointer_id,
				active = session.pointer_id,
				"ignoring second pointer"
			);
			return PointerDown::Ignored;
		}
		if sample.kind == PointerKind::Mouse && !sample.primary_button {
			return PointerDown::Ignored;
		}
		if !sample.position.is_finite() {
			return PointerDown::Ignored;
		}

		let brush = self.brush;
		let pressure = sample.pressure.clamp(0.0, 1.0);
		let width = estimate_width(
			sample.kind,
			brush.size,
			pressure,
			None,
			sample.position,
			sample.timestamp,
		);
		let point = StrokePoint::new(sample.position, sample.timestamp, pressure, width);
		let style = StrokeStyle {
			color: brush.color,
			base_size: brush.size,
			is_pen: sample.kind.is_pen(),
			is_eraser: brush.eraser,
		};
		let stroke = self.model.begin_stroke(style, point, None);

		let captured = self
			.host
			.capture_pointer(sample.pointer_id)
			.ok_or_warn()
			.is_some();
		self.host.attach_session_listeners();
		self.model.open_session(PointerSession {
			pointer_id: sample.pointer_id,
			kind: sample.kind,
			stroke,
			last_point: point,
			captured,
		});
		self.compositor.stamp_dot(&point, style.color, style.is_eraser);
		trace!(%stroke, pointer_id = sample.pointer_id, "stroke started");
		PointerDown::Stroke(stroke)
	}

	/// Feeds the coalesced samples of one move event, oldest first.
	pub fn pointer_move(&mut self, pointer_id: i32, samples: &[PointerSample]) -> usize {
		match self.model.session() {
			Some(session) if session.pointer_id == pointer_id => {}
			_ => return 0,
		}
		samples
			.iter()
			.filter(|sample| self.extend_stroke(sample))
			.count()
	}

	/// Ends the session if `pointer_id` owns it.
	pub fn pointer_up(&mut self, pointer_id: i32) -> bool {
		match self.model.session() {
			Some(session) if session.pointer_id == pointer_id => self.end_session().is_some(),
			_ => false,
		}
	}

	/// Cancellation keeps whatever was drawn, exactly like a release.
	pub fn pointer_cancel(&mut self, pointer_id: i32) -> bool {
		self.pointer_up(pointer_id)
	}

	pub fn is_drawing(&self) -> bool {
		self.model.session().is_some()
	}

	/// Closes the live session, releasing capture and the session listeners.
	pub fn end_session(&mut self) -> Option<StrokeId> {
		let session = self.model.take_session()?;
		if session.captured {
			self.host.release_pointer(session.pointer_id).ok_or_warn();
		}
		self.host.detach_session_listeners();
		trace!(stroke = %session.stroke, "stroke ended");
		Some(session.stroke)
	}

	fn extend_stroke(&mut self, sample: &PointerSample) -> bool {
		let min_distance = self.options.min_point_distance;
		let max_points = self.options.max_points_per_stroke;
		let Some(session) = self.model.session().copied() else {
			return false;
		};
		let last = session.last_point;
		if !sample.position.is_finite() || sample.timestamp < last.t {
			trace!(?sample, "discarding out of order sample");
			return false;
		}
		if last.position().distance(sample.position) < min_distance {
			return false;
		}

		let mut next = session;
		let Some(stroke) = self.model.active_stroke_mut() else {
			return false;
		};
		// A full record only hands over once there is a point to continue with.
		if stroke.len() >= max_points {
			let style = StrokeStyle::of(stroke);
			next.stroke = self.model.begin_stroke(style, last, Some(session.stroke));
			trace!(from = %session.stroke, to = %next.stroke, "splitting long stroke");
			if let Some(live) = self.model.session_mut() {
				live.stroke = next.stroke;
			}
		}

		let Some(stroke) = self.model.active_stroke_mut() else {
			return false;
		};
		let pressure = sample.pressure.clamp(0.0, 1.0);
		let width = estimate_width(
			session.kind,
			stroke.base_size(),
			pressure,
			Some(&last),
			sample.position,
			sample.timestamp,
		);
		let point = StrokePoint::new(sample.position, sample.timestamp, pressure, width);
		stroke.push(point);
		let segment = DrawSegment {
			from: last,
			to: point,
			color: stroke.color(),
			is_eraser: stroke.is_eraser(),
		};

		self.compositor.enqueue(segment, self.scheduler.as_mut());

		next.last_point = point;
		if let Some(live) = self.model.session_mut() {
			*live = next;
		}
		true
	}
}

impl InputSession for InkCanvas {
	fn begin(&mut self, sample: PointerSample) -> PointerDown {
		self.pointer_down(sample)
	}

	fn extend(&mut self, samples: &[PointerSample]) -> usize {
		let Some(session) = self.model.session() else {
			return 0;
		};
		let pointer_id = session.pointer_id;
		self.pointer_move(pointer_id, samples)
	}

	fn end(&mut self) {
		self.end_session();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::vec2;

	fn mouse(x: f32, y: f32, t: f64) -> PointerSample {
		PointerSample {
			pointer_id: 1,
			kind: PointerKind::Mouse,
			position: vec2(x, y),
			pressure: 0.5,
			timestamp: t,
			primary_button: true,
			target_size: vec2(200.0, 100.0),
		}
	}

	#[test]
	fn normalization_clamps() {
		let size = vec2(200.0, 100.0);
		assert_eq!(
			NormalizedPoint::from_surface(vec2(50.0, 25.0), size),
			NormalizedPoint { x: 0.25, y: 0.25 }
		);
		assert_eq!(
			NormalizedPoint::from_surface(vec2(-5.0, 500.0), size),
			NormalizedPoint { x: 0.0, y: 1.0 }
		);
		assert_eq!(
			NormalizedPoint::from_surface(vec2(5.0, 5.0), Vec2::ZERO),
			NormalizedPoint { x: 0.0, y: 0.0 }
		);
	}

	#[test]
	fn secondary_mouse_button_does_not_draw() {
		let mut canvas = InkCanvas::detached();
		let down = canvas.pointer_down(PointerSample {
			primary_button: false,
			..mouse(0.0, 0.0, 0.0)
		});
		assert_eq!(down, PointerDown::Ignored);
		assert_eq!(canvas.model().committed_count(), 0);
	}

	#[test]
	fn touch_ignores_button_state() {
		let mut canvas = InkCanvas::detached();
		let down = canvas.pointer_down(PointerSample {
			kind: PointerKind::Touch,
			primary_button: false,
			..mouse(0.0, 0.0, 0.0)
		});
		assert!(matches!(down, PointerDown::Stroke(_)));
	}

	#[test]
	fn foreign_pointer_events_are_ignored() {
		let mut canvas = InkCanvas::detached();
		canvas.pointer_down(mouse(0.0, 0.0, 0.0));
		assert_eq!(canvas.pointer_move(7, &[mouse(10.0, 0.0, 1.0)]), 0);
		assert!(!canvas.pointer_up(7));
		assert!(canvas.is_drawing());
		assert!(canvas.pointer_cancel(1));
		assert!(!canvas.is_drawing());
	}

	#[test]
	fn out_of_order_samples_are_dropped() {
		let mut canvas = InkCanvas::detached();
		canvas.pointer_down(mouse(0.0, 0.0, 10.0));
		let stored = canvas.pointer_move(1, &[mouse(5.0, 0.0, 5.0), mouse(10.0, 0.0, 12.0)]);
		assert_eq!(stored, 1);
		let points = canvas.model().strokes()[0].points();
		assert!(points.windows(2).all(|w| w[0].t <= w[1].t));
	}

	#[test]
	fn pressure_is_clamped() {
		let mut canvas = InkCanvas::detached();
		canvas.pointer_down(PointerSample {
			kind: PointerKind::Pen,
			pressure: 3.0,
			..mouse(0.0, 0.0, 0.0)
		});
		let first = canvas.model().strokes()[0].points()[0];
		assert_eq!(first.pressure, 1.0);
		assert!(canvas.model().strokes()[0].is_pen());
	}

	#[test]
	fn taps_normalize_against_the_target_not_the_store() {
		let mut canvas = InkCanvas::detached();
		canvas.set_annotation_mode(true);
		assert_eq!(
			canvas.pointer_down(mouse(50.0, 25.0, 0.0)),
			PointerDown::Tap(NormalizedPoint { x: 0.25, y: 0.25 })
		);
	}

	#[test]
	fn tap_on_a_target_without_area_is_ignored() {
		let mut canvas = InkCanvas::detached();
		let taps = std::rc::Rc::new(std::cell::Cell::new(0));
		canvas.set_on_tap({
			let taps = taps.clone();
			move |_| taps.set(taps.get() + 1)
		});
		canvas.set_annotation_mode(true);
		let down = canvas.pointer_down(PointerSample {
			target_size: Vec2::ZERO,
			..mouse(50.0, 25.0, 0.0)
		});
		assert_eq!(down, PointerDown::Ignored);
		assert_eq!(taps.get(), 0);
	}

	#[test]
	fn full_record_splits_only_when_the_stroke_goes_on() {
		let options = CanvasOptions::builder().max_points_per_stroke(4).build();
		let mut canvas = InkCanvas::new(options, ManualFrames, DetachedHost).unwrap();
		canvas.pointer_down(mouse(0.0, 0.0, 0.0));
		let moves = [mouse(5.0, 0.0, 1.0), mouse(10.0, 0.0, 2.0), mouse(15.0, 0.0, 3.0)];
		assert_eq!(canvas.pointer_move(1, &moves), 3);
		canvas.pointer_up(1);
		let lengths: Vec<usize> = canvas.model().strokes().iter().map(StrokeRecord::len).collect();
		assert_eq!(lengths, [4]);

		canvas.pointer_down(mouse(0.0, 10.0, 10.0));
		let moves = [
			mouse(5.0, 10.0, 11.0),
			mouse(10.0, 10.0, 12.0),
			mouse(15.0, 10.0, 13.0),
			mouse(20.0, 10.0, 14.0),
		];
		assert_eq!(canvas.pointer_move(1, &moves), 4);
		let strokes = canvas.model().strokes();
		assert_eq!(strokes.len(), 3);
		assert_eq!(strokes[1].len(), 4);
		assert_eq!(strokes[2].len(), 2);
		assert_eq!(strokes[2].continuation_of(), Some(strokes[1].id()));
		assert_eq!(strokes[2].first_point(), strokes[1].last_point());
	}
}

use super::raster::Raster;
use super::{Rgba, StrokePoint, StrokeRecord};
use glam::Vec2;
use itertools::Itertools;
use tracing::trace;

/// Spacing between stamped discs along a segment, in surface pixels.
pub const STAMP_STEP: f32 = 0.75;

/// Requests a single callback on the next display frame.
///
/// The compositor never asks twice before the frame arrives. The host answers by calling
/// [`InkCanvas::render_frame`](super::InkCanvas::render_frame).
pub trait FrameScheduler {
	/// Returns whether a frame is now on its way. A refusal is retried on the next enqueue.
	fn schedule(&mut self) -> bool;
	fn cancel(&mut self);
}

/// A scheduler for hosts that drive frames themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualFrames;

impl FrameScheduler for ManualFrames {
	fn schedule(&mut self) -> bool {
		true
	}

	fn cancel(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawSegment {
	pub from: StrokePoint,
	pub to: StrokePoint,
	pub color: Rgba,
	pub is_eraser: bool,
}

impl DrawSegment {
	pub fn paint_color(&self, background: Rgba) -> Rgba {
		if self.is_eraser {
			background
		} else {
			self.color
		}
	}
}

/// Paints `segment` by stamping discs from just past `from` up to and including `to`.
///
/// `from` was already stamped, either as the stroke's first dot or as the end of the previous
/// segment.
fn paint_segment(store: &mut Raster, segment: &DrawSegment, background: Rgba, step: f32) {
	let color = segment.paint_color(background);
	let p0 = segment.from.position();
	let p1 = segment.to.position();
	let (r0, r1) = (segment.from.radius(), segment.to.radius());
	let steps = (p0.distance(p1) / step).ceil().max(1.0) as u32;
	for i in 1..=steps {
		let s = i as f32 / steps as f32;
		store.stamp_disc(p0.lerp(p1, s), r0 + (r1 - r0) * s, color);
	}
}

fn paint_dot(store: &mut Raster, point: &StrokePoint, color: Rgba) {
	store.stamp_disc(point.position(), point.radius(), color);
}

fn paint_stroke(store: &mut Raster, stroke: &StrokeRecord, background: Rgba, step: f32) {
	let color = if stroke.is_eraser() {
		background
	} else {
		stroke.color()
	};
	// Continuations start at a point the previous record already painted.
	if stroke.continuation_of().is_none() {
		if let Some(first) = stroke.first_point() {
			paint_dot(store, first, color);
		}
	}
	for (from, to) in stroke.points().iter().tuple_windows() {
		let segment = DrawSegment {
			from: *from,
			to: *to,
			color: stroke.color(),
			is_eraser: stroke.is_eraser(),
		};
		paint_segment(store, &segment, background, step);
	}
}

/// Turns the stroke model into pixels.
///
/// Incremental work is queued and painted once per frame. Anything that invalidates the backing
/// store goes through [`Compositor::replay`] instead, so the pixels are always a function of the
/// committed strokes alone.
#[derive(Debug)]
pub struct Compositor {
	queue: Vec<DrawSegment>,
	frame_pending: bool,
	store: Option<Raster>,
	background: Rgba,
	stamp_step: f32,
	surface_size: Vec2,
	device_pixel_ratio: f32,
}

impl Compositor {
	pub fn new(background: Rgba, stamp_step: f32) -> Self {
		Self {
			queue: Vec::new(),
			frame_pending: false,
			store: None,
			background,
			stamp_step,
			surface_size: Vec2::ZERO,
			device_pixel_ratio: 1.0,
		}
	}

	pub fn background(&self) -> Rgba {
		self.background
	}

	pub fn backing_store(&self) -> Option<&Raster> {
		self.store.as_ref()
	}

	/// Container size in surface pixels, as of the last resize.
	pub fn surface_size(&self) -> Vec2 {
		self.surface_size
	}

	pub fn device_pixel_ratio(&self) -> f32 {
		self.device_pixel_ratio
	}

	pub fn pending_segments(&self) -> usize {
		self.queue.len()
	}

	pub fn frame_pending(&self) -> bool {
		self.frame_pending
	}

	pub fn enqueue(&mut self, segment: DrawSegment, scheduler: &mut dyn FrameScheduler) {
		self.queue.push(segment);
		if !self.frame_pending {
			self.frame_pending = scheduler.schedule();
			if !self.frame_pending {
				trace!("frame request refused");
			}
		}
	}

	/// Paints every queued segment. Returns how many were painted.
	pub fn render_frame(&mut self) -> usize {
		self.frame_pending = false;
		let Some(store) = self.store.as_mut() else {
			if !self.queue.is_empty() {
				trace!(dropped = self.queue.len(), "no backing store, dropping segments");
				self.queue.clear();
			}
			return 0;
		};
		let count = self.queue.len();
		for segment in self.queue.drain(..) {
			paint_segment(store, &segment, self.background, self.stamp_step);
		}
		count
	}

	/// Stamps a stroke's first point right away, after whatever is already queued.
	pub fn stamp_dot(&mut self, point: &StrokePoint, color: Rgba, is_eraser: bool) {
		self.render_pending();
		let color = if is_eraser { self.background } else { color };
		match self.store.as_mut() {
			Some(store) => paint_dot(store, point, color),
			None => trace!("no backing store, dropping dot"),
		}
	}

	/// Paints queued segments without touching the frame request.
	pub fn render_pending(&mut self) {
		if self.queue.is_empty() {
			return;
		}
		let frame_pending = self.frame_pending;
		self.render_frame();
		self.frame_pending = frame_pending;
	}

	pub fn cancel_frame(&mut self, scheduler: &mut dyn FrameScheduler) {
		if self.frame_pending {
			self.frame_pending = false;
			scheduler.cancel();
		}
	}

	pub fn discard_pending(&mut self) {
		self.queue.clear();
	}

	/// Repaints the background and every stroke in order.
	pub fn replay(&mut self, strokes: &[StrokeRecord]) {
		// Everything queued is already part of `strokes`.
		self.queue.clear();
		let Some(store) = self.store.as_mut() else {
			trace!("no backing store, skipping replay");
			return;
		};
		store.fill(self.background);
		for stroke in strokes {
			paint_stroke(store, stroke, self.background, self.stamp_step);
		}
	}

	/// Reallocates the backing store for a new container size and replays onto it.
	///
	/// Stored points keep their surface coordinates, so strokes do not rescale with the container.
	pub fn resize(&mut self, surface_size: Vec2, device_pixel_ratio: f32, strokes: &[StrokeRecord]) {
		self.surface_size = surface_size;
		self.store = Raster::for_surface(surface_size, device_pixel_ratio);
		self.device_pixel_ratio = self
			.store
			.as_ref()
			.map_or(device_pixel_ratio, Raster::scale);
		self.replay(strokes);
	}

	pub fn detach(&mut self) {
		self.store = None;
		self.queue.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::vec2;
	use std::cell::Cell;
	use std::rc::Rc;

	#[derive(Default, Clone)]
	struct CountingScheduler {
		scheduled: Rc<Cell<usize>>,
		cancelled: Rc<Cell<usize>>,
		refuse: bool,
	}

	impl FrameScheduler for CountingScheduler {
		fn schedule(&mut self) -> bool {
			self.scheduled.set(self.scheduled.get() + 1);
			!self.refuse
		}

		fn cancel(&mut self) {
			self.cancelled.set(self.cancelled.get() + 1);
		}
	}

	fn segment(x0: f32, x1: f32) -> DrawSegment {
		DrawSegment {
			from: StrokePoint::new(vec2(x0, 10.0), 0.0, 0.5, 4.0),
			to: StrokePoint::new(vec2(x1, 10.0), 1.0, 0.5, 4.0),
			color: Rgba::BLACK,
			is_eraser: false,
		}
	}

	fn attached() -> Compositor {
		let mut compositor = Compositor::new(Rgba::WHITE, STAMP_STEP);
		compositor.resize(vec2(40.0, 20.0), 1.0, &[]);
		compositor
	}

	#[test]
	fn one_frame_per_batch() {
		let mut compositor = attached();
		let mut scheduler = CountingScheduler::default();
		for i in 0..10 {
			compositor.enqueue(segment(i as f32, i as f32 + 1.0), &mut scheduler);
		}
		assert_eq!(scheduler.scheduled.get(), 1);
		assert_eq!(compositor.render_frame(), 10);
		assert_eq!(compositor.pending_segments(), 0);
		assert!(!compositor.frame_pending());

		compositor.enqueue(segment(0.0, 1.0), &mut scheduler);
		assert_eq!(scheduler.scheduled.get(), 2);
	}

	#[test]
	fn segment_is_continuous() {
		let mut compositor = attached();
		let mut scheduler = CountingScheduler::default();
		compositor.enqueue(segment(5.0, 35.0), &mut scheduler);
		compositor.render_frame();
		let store = compositor.backing_store().unwrap();
		for x in 6..=35 {
			assert_eq!(store.pixel(x, 10), Some(Rgba::BLACK), "gap at x = {x}");
		}
		assert_eq!(store.pixel(20, 2), Some(Rgba::WHITE));
	}

	#[test]
	fn eraser_paints_background() {
		let mut compositor = attached();
		let mut scheduler = CountingScheduler::default();
		compositor.enqueue(segment(5.0, 35.0), &mut scheduler);
		compositor.enqueue(
			DrawSegment {
				is_eraser: true,
				..segment(5.0, 35.0)
			},
			&mut scheduler,
		);
		compositor.render_frame();
		let store = compositor.backing_store().unwrap();
		assert_eq!(store.pixel(20, 10), Some(Rgba::WHITE));
	}

	#[test]
	fn frames_without_store_drop_work() {
		let mut compositor = Compositor::new(Rgba::WHITE, STAMP_STEP);
		let mut scheduler = CountingScheduler::default();
		compositor.enqueue(segment(0.0, 10.0), &mut scheduler);
		assert_eq!(compositor.render_frame(), 0);
		assert_eq!(compositor.pending_segments(), 0);
	}

	#[test]
	fn cancel_only_when_pending() {
		let mut compositor = attached();
		let mut scheduler = CountingScheduler::default();
		compositor.cancel_frame(&mut scheduler);
		assert_eq!(scheduler.cancelled.get(), 0);
		compositor.enqueue(segment(0.0, 10.0), &mut scheduler);
		compositor.cancel_frame(&mut scheduler);
		assert_eq!(scheduler.cancelled.get(), 1);
		assert!(!compositor.frame_pending());
	}

	#[test]
	fn refused_request_is_retried() {
		let mut compositor = attached();
		let mut scheduler = CountingScheduler {
			refuse: true,
			..Default::default()
		};
		compositor.enqueue(segment(0.0, 10.0), &mut scheduler);
		assert!(!compositor.frame_pending());
		scheduler.refuse = false;
		compositor.enqueue(segment(10.0, 20.0), &mut scheduler);
		assert!(compositor.frame_pending());
		assert_eq!(scheduler.scheduled.get(), 2);
		assert_eq!(compositor.render_frame(), 2);
	}

	#[test]
	fn dot_flushes_queue_first() {
		let mut compositor = attached();
		let mut scheduler = CountingScheduler::default();
		compositor.enqueue(segment(5.0, 15.0), &mut scheduler);
		let dot = StrokePoint::new(vec2(10.0, 10.0), 2.0, 0.5, 6.0);
		compositor.stamp_dot(&dot, Rgba::WHITE, false);
		assert_eq!(compositor.pending_segments(), 0);
		// The frame request is still outstanding.
		assert!(compositor.frame_pending());
		// The dot was painted last.
		let store = compositor.backing_store().unwrap();
		assert_eq!(store.pixel(10, 10), Some(Rgba::WHITE));
	}

	#[test]
	fn resize_to_nothing_detaches() {
		let mut compositor = attached();
		compositor.resize(Vec2::ZERO, 2.0, &[]);
		assert!(compositor.backing_store().is_none());
		assert_eq!(compositor.device_pixel_ratio(), 2.0);
	}
}

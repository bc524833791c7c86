use super::{PointerKind, Rgba};
use derive_more::Display;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Samples closer than this (in surface pixels) to the last accepted point are discarded.
pub const MIN_POINT_DISTANCE: f32 = 0.8;

/// A record that reaches this many points is closed and continued in a new record.
pub const MAX_POINTS_PER_STROKE: usize = 1200;

#[derive(
	Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[display("stroke-{_0}")]
#[serde(transparent)]
pub struct StrokeId(u64);

/// A single accepted input sample.
///
/// Coordinates are surface pixels, i.e. the canvas element's own coordinate space before the
/// device-pixel-ratio transform. `t` is the input timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
	pub x: f32,
	pub y: f32,
	pub t: f64,
	pub pressure: f32,
	pub width: f32,
}

impl StrokePoint {
	pub fn new(position: Vec2, t: f64, pressure: f32, width: f32) -> Self {
		debug_assert!(width > 0.0);
		Self {
			x: position.x,
			y: position.y,
			t,
			pressure,
			width,
		}
	}

	pub fn position(&self) -> Vec2 {
		Vec2::new(self.x, self.y)
	}

	pub fn radius(&self) -> f32 {
		0.5 * self.width
	}

	pub fn distance(&self, other: &Self) -> f32 {
		self.position().distance(other.position())
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeRecord {
	id: StrokeId,
	color: Rgba,
	base_size: f32,
	is_pen: bool,
	is_eraser: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	continuation_of: Option<StrokeId>,
	points: Vec<StrokePoint>,
}

impl StrokeRecord {
	pub fn id(&self) -> StrokeId {
		self.id
	}

	pub fn color(&self) -> Rgba {
		self.color
	}

	pub fn base_size(&self) -> f32 {
		self.base_size
	}

	pub fn is_pen(&self) -> bool {
		self.is_pen
	}

	pub fn is_eraser(&self) -> bool {
		self.is_eraser
	}

	/// The record this one was split from, if it was opened by reaching the point cap.
	pub fn continuation_of(&self) -> Option<StrokeId> {
		self.continuation_of
	}

	pub fn points(&self) -> &[StrokePoint] {
		&self.points
	}

	pub fn len(&self) -> usize {
		self.points.len()
	}

	pub fn is_empty(&self) -> bool {
		self.points.is_empty()
	}

	pub fn first_point(&self) -> Option<&StrokePoint> {
		self.points.first()
	}

	pub fn last_point(&self) -> Option<&StrokePoint> {
		self.points.last()
	}

	pub(crate) fn push(&mut self, point: StrokePoint) {
		debug_assert!(self.points.last().map_or(true, |last| last.t <= point.t));
		self.points.push(point);
	}
}

/// Brush state frozen into a record when it is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
	pub color: Rgba,
	pub base_size: f32,
	pub is_pen: bool,
	pub is_eraser: bool,
}

impl StrokeStyle {
	pub fn of(record: &StrokeRecord) -> Self {
		Self {
			color: record.color,
			base_size: record.base_size,
			is_pen: record.is_pen,
			is_eraser: record.is_eraser,
		}
	}
}

/// Binds the one pointer currently drawing to the record it extends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSession {
	pub pointer_id: i32,
	pub kind: PointerKind,
	pub stroke: StrokeId,
	pub last_point: StrokePoint,
	pub captured: bool,
}

/// Committed strokes, undone strokes and the live session.
///
/// Every record lives in exactly one of the two stacks. While a session is open, the record it
/// extends is the last committed one.
#[derive(Debug, Default)]
pub struct StrokeModel {
	strokes: Vec<StrokeRecord>,
	redo_strokes: Vec<StrokeRecord>,
	session: Option<PointerSession>,
	next_id: u64,
}

impl StrokeModel {
	pub fn strokes(&self) -> &[StrokeRecord] {
		&self.strokes
	}

	pub fn redo_strokes(&self) -> &[StrokeRecord] {
		&self.redo_strokes
	}

	pub fn session(&self) -> Option<&PointerSession> {
		self.session.as_ref()
	}

	pub fn committed_count(&self) -> usize {
		self.strokes.len()
	}

	pub fn redo_count(&self) -> usize {
		self.redo_strokes.len()
	}

	pub fn point_count(&self) -> usize {
		self.strokes.iter().map(StrokeRecord::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.strokes.is_empty() && self.redo_strokes.is_empty()
	}

	/// Commits a new record holding `first`. Any redo history is discarded.
	pub(crate) fn begin_stroke(
		&mut self,
		style: StrokeStyle,
		first: StrokePoint,
		continuation_of: Option<StrokeId>,
	) -> StrokeId {
		let id = StrokeId(self.next_id);
		self.next_id += 1;
		self.redo_strokes.clear();
		self.strokes.push(StrokeRecord {
			id,
			color: style.color,
			base_size: style.base_size,
			is_pen: style.is_pen,
			is_eraser: style.is_eraser,
			continuation_of,
			points: vec![first],
		});
		id
	}

	pub(crate) fn active_stroke_mut(&mut self) -> Option<&mut StrokeRecord> {
		let id = self.session?.stroke;
		self.strokes.last_mut().filter(|stroke| stroke.id == id)
	}

	pub(crate) fn open_session(&mut self, session: PointerSession) {
		debug_assert!(self.session.is_none());
		self.session = Some(session);
	}

	pub(crate) fn session_mut(&mut self) -> Option<&mut PointerSession> {
		self.session.as_mut()
	}

	pub(crate) fn take_session(&mut self) -> Option<PointerSession> {
		self.session.take()
	}

	pub(crate) fn undo(&mut self) -> bool {
		debug_assert!(self.session.is_none());
		let Some(stroke) = self.strokes.pop() else {
			return false;
		};
		self.redo_strokes.push(stroke);
		true
	}

	pub(crate) fn redo(&mut self) -> bool {
		debug_assert!(self.session.is_none());
		let Some(stroke) = self.redo_strokes.pop() else {
			return false;
		};
		self.strokes.push(stroke);
		true
	}

	pub(crate) fn clear(&mut self) {
		debug_assert!(self.session.is_none());
		self.strokes.clear();
		self.redo_strokes.clear();
	}

	/// Replaces everything with already validated records.
	pub(crate) fn replace(&mut self, strokes: Vec<StrokeRecord>) {
		debug_assert!(self.session.is_none());
		self.next_id = strokes.iter().map(|s| s.id.0 + 1).max().unwrap_or(0);
		self.strokes = strokes;
		self.redo_strokes.clear();
	}
}

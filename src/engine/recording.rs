//! JSON snapshots of a canvas: its options, its size and its committed strokes.

use super::*;
use glam::Vec2;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum RecordingError {
	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Options(#[from] CanvasError),

	#[error("{stroke}: {reason}")]
	InvalidStroke { stroke: StrokeId, reason: &'static str },

	#[error("{0} appears more than once")]
	DuplicateStroke(StrokeId),

	#[error("cannot load strokes while drawing")]
	SessionOpen,
}

static_assertions::assert_impl_all!(RecordingError: std::error::Error, Send, Sync);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
	#[serde(default)]
	pub options: CanvasOptions,
	/// Container size in surface pixels.
	pub surface: Vec2,
	#[serde(default = "default_device_pixel_ratio")]
	pub device_pixel_ratio: f32,
	pub strokes: Vec<StrokeRecord>,
}

fn default_device_pixel_ratio() -> f32 {
	1.0
}

impl Recording {
	pub fn from_json(json: &str) -> Result<Self, RecordingError> {
		let recording: Self = serde_json::from_str(json)?;
		recording.validate()?;
		Ok(recording)
	}

	pub fn to_json(&self) -> Result<String, RecordingError> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	pub fn validate(&self) -> Result<(), RecordingError> {
		self.options.validate()?;
		validate_strokes(&self.strokes, &self.options)
	}
}

fn validate_stroke(stroke: &StrokeRecord, options: &CanvasOptions) -> Result<(), &'static str> {
	if stroke.is_empty() {
		return Err("no points");
	}
	if stroke.len() > options.max_points_per_stroke {
		return Err("too many points");
	}
	if !(stroke.base_size().is_finite() && stroke.base_size() > 0.0) {
		return Err("base size must be positive");
	}
	for point in stroke.points() {
		if !(point.position().is_finite() && point.t.is_finite()) {
			return Err("non-finite point");
		}
		if !(point.width.is_finite() && point.width > 0.0) {
			return Err("width must be positive");
		}
		if !(0.0..=1.0).contains(&point.pressure) {
			return Err("pressure out of range");
		}
	}
	for (a, b) in stroke.points().iter().tuple_windows() {
		if b.t < a.t {
			return Err("timestamps go backwards");
		}
		if a.distance(b) < options.min_point_distance {
			return Err("points closer than the minimum distance");
		}
	}
	Ok(())
}

/// Checks the invariants that input capture guarantees for live strokes.
pub fn validate_strokes(
	strokes: &[StrokeRecord],
	options: &CanvasOptions,
) -> Result<(), RecordingError> {
	let mut seen = HashSet::new();
	for stroke in strokes {
		validate_stroke(stroke, options).map_err(|reason| RecordingError::InvalidStroke {
			stroke: stroke.id(),
			reason,
		})?;
		if let Some(parent) = stroke.continuation_of() {
			if !seen.contains(&parent) {
				Err(RecordingError::InvalidStroke {
					stroke: stroke.id(),
					reason: "continues a stroke that does not precede it",
				})?;
			}
		}
		if !seen.insert(stroke.id()) {
			Err(RecordingError::DuplicateStroke(stroke.id()))?;
		}
	}
	Ok(())
}

impl InkCanvas {
	/// Builds a sized canvas showing everything in `recording`.
	pub fn from_recording(
		recording: Recording,
		scheduler: impl FrameScheduler + 'static,
		host: impl SessionHost + 'static,
	) -> Result<Self, RecordingError> {
		let mut canvas = Self::new(recording.options, scheduler, host)?;
		canvas.resize(recording.surface, recording.device_pixel_ratio);
		canvas.load_strokes(recording.strokes)?;
		Ok(canvas)
	}

	pub fn recording(&self) -> Recording {
		Recording {
			options: self.options.clone(),
			surface: self.compositor.surface_size(),
			device_pixel_ratio: self.compositor.device_pixel_ratio(),
			strokes: self.model.strokes().to_vec(),
		}
	}

	/// Replaces the committed strokes and clears redo history.
	#[instrument(skip_all, fields(strokes = strokes.len()))]
	pub fn load_strokes(&mut self, strokes: Vec<StrokeRecord>) -> Result<(), RecordingError> {
		if self.is_drawing() {
			Err(RecordingError::SessionOpen)?;
		}
		validate_strokes(&strokes, &self.options)?;
		self.model.replace(strokes);
		self.compositor.cancel_frame(self.scheduler.as_mut());
		self.replay();
		Ok(())
	}
}

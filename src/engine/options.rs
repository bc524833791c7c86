use super::{Rgba, MAX_POINTS_PER_STROKE, MIN_POINT_DISTANCE, STAMP_STEP};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BRUSH_SIZE: f32 = 3.0;
pub const DEFAULT_BRUSH_COLOR: Rgba = Rgba([0x11, 0x18, 0x27, 0xff]);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
	#[error("invalid brush color {0:?}")]
	InvalidColor(String),

	#[error("invalid brush size {0}")]
	InvalidBrushSize(f32),

	#[error("invalid canvas options: {0}")]
	InvalidOptions(&'static str),
}

static_assertions::assert_impl_all!(CanvasError: std::error::Error, Send, Sync);

/// Construction-time settings for an [`InkCanvas`](super::InkCanvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(default)]
pub struct CanvasOptions {
	#[builder(default = MIN_POINT_DISTANCE)]
	pub min_point_distance: f32,
	#[builder(default = MAX_POINTS_PER_STROKE)]
	pub max_points_per_stroke: usize,
	#[builder(default = STAMP_STEP)]
	pub stamp_step: f32,
	#[builder(default = Rgba::WHITE)]
	pub background: Rgba,
	#[builder(default = DEFAULT_BRUSH_COLOR)]
	pub brush_color: Rgba,
	#[builder(default = DEFAULT_BRUSH_SIZE)]
	pub brush_size: f32,
}

impl Default for CanvasOptions {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl CanvasOptions {
	pub fn validate(&self) -> Result<(), CanvasError> {
		use CanvasError::*;
		if !(self.min_point_distance.is_finite() && self.min_point_distance > 0.0) {
			Err(InvalidOptions("min_point_distance must be positive"))?;
		}
		if self.max_points_per_stroke < 2 {
			Err(InvalidOptions("max_points_per_stroke must be at least 2"))?;
		}
		if !(self.stamp_step.is_finite() && self.stamp_step > 0.0) {
			Err(InvalidOptions("stamp_step must be positive"))?;
		}
		validate_brush_size(self.brush_size)?;
		Ok(())
	}
}

pub(crate) fn validate_brush_size(size: f32) -> Result<f32, CanvasError> {
	if size.is_finite() && size > 0.0 {
		Ok(size)
	} else {
		Err(CanvasError::InvalidBrushSize(size))
	}
}

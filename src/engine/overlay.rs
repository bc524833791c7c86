//! Layout for externally supplied highlight markers.
//!
//! Markers are pure input. Nothing here touches the stroke model.

use derive_more::Display;
use glam::{vec2, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest on-screen marker edge, in surface pixels.
pub const MIN_MARKER_SIZE: f32 = 24.0;

pub const TAP_HINT: &str = "Tap the canvas where this mistake is";

#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayShape {
	#[default]
	#[display("circle")]
	Circle,
	#[display("box")]
	Box,
}

/// A highlight marker in container-normalized coordinates. `(x, y)` is the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasOverlay {
	pub id: String,
	pub x: f32,
	pub y: f32,
	#[serde(default)]
	pub w: f32,
	#[serde(default)]
	pub h: f32,
	#[serde(default)]
	pub shape: OverlayShape,
	#[serde(default)]
	pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStyle {
	Normal,
	Selected,
}

impl OverlayStyle {
	fn border(self) -> &'static str {
		match self {
			Self::Normal => "2px solid rgba(220, 38, 38, 0.8)",
			Self::Selected => "3px solid rgb(234, 88, 12)",
		}
	}

	fn fill(self) -> &'static str {
		match self {
			Self::Normal => "rgba(220, 38, 38, 0.08)",
			Self::Selected => "rgba(234, 88, 12, 0.2)",
		}
	}
}

/// A marker resolved to a pixel rectangle in the container.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlacement {
	pub id: String,
	pub min: Vec2,
	pub size: Vec2,
	pub shape: OverlayShape,
	pub style: OverlayStyle,
}

impl OverlayPlacement {
	pub fn center(&self) -> Vec2 {
		self.min + self.size * 0.5
	}

	/// Inline style for an absolutely positioned element.
	pub fn css(&self) -> String {
		let radius = match self.shape {
			OverlayShape::Circle => "50%",
			OverlayShape::Box => "4px",
		};
		format!(
			"position:absolute;left:{:.1}px;top:{:.1}px;width:{:.1}px;height:{:.1}px;\
			border:{};background:{};border-radius:{};box-sizing:border-box;pointer-events:none",
			self.min.x,
			self.min.y,
			self.size.x,
			self.size.y,
			self.style.border(),
			self.style.fill(),
			radius,
		)
	}
}

fn unit(value: f32) -> f32 {
	if value.is_finite() {
		value.clamp(0.0, 1.0)
	} else {
		0.0
	}
}

fn place(overlay: &CanvasOverlay, container: Vec2) -> OverlayPlacement {
	let center = vec2(unit(overlay.x), unit(overlay.y)) * container;
	let size = (vec2(unit(overlay.w), unit(overlay.h)) * container).max(Vec2::splat(MIN_MARKER_SIZE));
	OverlayPlacement {
		id: overlay.id.clone(),
		min: center - size * 0.5,
		size,
		shape: overlay.shape,
		style: if overlay.selected {
			OverlayStyle::Selected
		} else {
			OverlayStyle::Normal
		},
	}
}

/// Positions every marker for a container of `container` surface pixels.
pub fn layout_overlays(overlays: &[CanvasOverlay], container: Vec2) -> Vec<OverlayPlacement> {
	let container = container.max(Vec2::ZERO);
	overlays.iter().map(|overlay| place(overlay, container)).collect()
}

/// Hint shown while the user should tap to place a marker.
pub fn tap_hint(annotation_mode: bool, awaiting: bool) -> Option<&'static str> {
	(annotation_mode && awaiting).then_some(TAP_HINT)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn overlay(x: f32, y: f32, w: f32, h: f32) -> CanvasOverlay {
		CanvasOverlay {
			id: "m".into(),
			x,
			y,
			w,
			h,
			shape: OverlayShape::Box,
			selected: false,
		}
	}

	#[test]
	fn scaled_to_container() {
		let placements = layout_overlays(&[overlay(0.5, 0.25, 0.2, 0.1)], vec2(400.0, 300.0));
		let placement = &placements[0];
		assert_eq!(placement.center(), vec2(200.0, 75.0));
		assert_eq!(placement.size, vec2(80.0, 30.0));
		assert_eq!(placement.style, OverlayStyle::Normal);
	}

	#[test]
	fn point_markers_get_minimum_size() {
		let placement = &layout_overlays(&[overlay(0.1, 0.1, 0.0, 0.0)], vec2(100.0, 100.0))[0];
		assert_eq!(placement.size, Vec2::splat(MIN_MARKER_SIZE));
		assert_eq!(placement.center(), vec2(10.0, 10.0));
	}

	#[test]
	fn out_of_range_is_clamped() {
		let placement = &layout_overlays(&[overlay(1.5, f32::NAN, 0.0, 0.0)], vec2(100.0, 50.0))[0];
		assert_eq!(placement.center(), vec2(100.0, 0.0));
	}

	#[test]
	fn selection_and_shape_show_in_css() {
		let mut marker = overlay(0.5, 0.5, 0.0, 0.0);
		marker.selected = true;
		marker.shape = OverlayShape::Circle;
		let placement = &layout_overlays(&[marker], vec2(100.0, 100.0))[0];
		assert_eq!(placement.style, OverlayStyle::Selected);
		let css = placement.css();
		assert!(css.contains("border-radius:50%"));
		assert!(css.contains("left:38.0px"));
	}

	#[test]
	fn hint_only_when_waiting_in_annotation_mode() {
		assert_eq!(tap_hint(true, true), Some(TAP_HINT));
		assert_eq!(tap_hint(true, false), None);
		assert_eq!(tap_hint(false, true), None);
	}

	#[test]
	fn shape_serde() {
		let marker: CanvasOverlay = serde_json::from_str(r#"{"id":"a","x":0.1,"y":0.2}"#).unwrap();
		assert_eq!(marker.shape, OverlayShape::Circle);
		assert_eq!(marker.w, 0.0);
		assert_eq!(serde_json::to_string(&OverlayShape::Box).unwrap(), r#""box""#);
	}
}

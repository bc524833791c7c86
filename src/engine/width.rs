use super::StrokePoint;
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
	Mouse,
	Pen,
	Touch,
}

impl PointerKind {
	/// Maps the DOM `pointerType` string. Unknown types behave like touch.
	pub fn from_pointer_type(pointer_type: &str) -> Self {
		match pointer_type {
			"mouse" => Self::Mouse,
			"pen" => Self::Pen,
			_ => Self::Touch,
		}
	}

	pub fn is_pen(self) -> bool {
		self == Self::Pen
	}
}

/// Pressure reported by digitizers that do not actually sense it.
const FALLBACK_PEN_PRESSURE: f32 = 0.5;

/// Width of the next point of a stroke drawn with brush size `base`.
///
/// Pens are driven by pressure. Everything else is driven by velocity in surface pixels per
/// millisecond, so faster motion gives a thinner line.
pub fn estimate_width(
	kind: PointerKind,
	base: f32,
	pressure: f32,
	previous: Option<&StrokePoint>,
	next: Vec2,
	t: f64,
) -> f32 {
	if kind.is_pen() {
		let pressure = if pressure > 0.0 {
			pressure.min(1.0)
		} else {
			FALLBACK_PEN_PRESSURE
		};
		return (base * (0.28 + pressure * 1.12)).clamp(base * 0.25, base * 1.5);
	}

	let Some(previous) = previous else {
		return base;
	};
	let elapsed = (t - previous.t).max(1.0) as f32;
	let velocity = previous.position().distance(next) / elapsed;
	base * (1.08 - velocity * 0.5).clamp(0.38, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;
	use glam::vec2;

	#[test]
	fn pen_follows_pressure() {
		let light = estimate_width(PointerKind::Pen, 10.0, 0.1, None, Vec2::ZERO, 0.0);
		let heavy = estimate_width(PointerKind::Pen, 10.0, 1.0, None, Vec2::ZERO, 0.0);
		assert_abs_diff_eq!(light, 10.0 * (0.28 + 0.112), epsilon = 1e-5);
		assert_abs_diff_eq!(heavy, 14.0, epsilon = 1e-5);
	}

	#[test]
	fn pen_without_pressure_uses_midpoint() {
		let width = estimate_width(PointerKind::Pen, 4.0, 0.0, None, Vec2::ZERO, 0.0);
		assert_abs_diff_eq!(width, 4.0 * (0.28 + 0.56), epsilon = 1e-5);
	}

	#[test]
	fn first_sample_uses_base() {
		assert_eq!(
			estimate_width(PointerKind::Mouse, 3.0, 0.5, None, vec2(10.0, 10.0), 5.0),
			3.0
		);
		assert_eq!(
			estimate_width(PointerKind::Touch, 3.0, 0.0, None, vec2(10.0, 10.0), 5.0),
			3.0
		);
	}

	#[test]
	fn velocity_thins_stroke() {
		let previous = StrokePoint::new(Vec2::ZERO, 0.0, 0.5, 3.0);
		// 0.1 px/ms stays at full width.
		let slow = estimate_width(PointerKind::Mouse, 3.0, 0.5, Some(&previous), vec2(1.0, 0.0), 10.0);
		assert_abs_diff_eq!(slow, 3.0, epsilon = 1e-5);
		// 1 px/ms.
		let medium =
			estimate_width(PointerKind::Mouse, 3.0, 0.5, Some(&previous), vec2(10.0, 0.0), 10.0);
		assert_abs_diff_eq!(medium, 3.0 * 0.58, epsilon = 1e-5);
		// Very fast motion bottoms out.
		let fast =
			estimate_width(PointerKind::Mouse, 3.0, 0.5, Some(&previous), vec2(500.0, 0.0), 10.0);
		assert_abs_diff_eq!(fast, 3.0 * 0.38, epsilon = 1e-5);
	}

	#[test]
	fn elapsed_time_has_floor() {
		let previous = StrokePoint::new(Vec2::ZERO, 10.0, 0.5, 3.0);
		// 1 px over no time counts as 1 px/ms.
		let same_instant =
			estimate_width(PointerKind::Touch, 3.0, 0.5, Some(&previous), vec2(1.0, 0.0), 10.0);
		assert_abs_diff_eq!(same_instant, 3.0 * 0.58, epsilon = 1e-5);
		let one_ms =
			estimate_width(PointerKind::Touch, 3.0, 0.5, Some(&previous), vec2(1.0, 0.0), 11.0);
		assert_abs_diff_eq!(same_instant, one_ms, epsilon = 1e-6);
	}

	#[test]
	fn pointer_type_mapping() {
		assert_eq!(PointerKind::from_pointer_type("pen"), PointerKind::Pen);
		assert_eq!(PointerKind::from_pointer_type("mouse"), PointerKind::Mouse);
		assert_eq!(PointerKind::from_pointer_type("touch"), PointerKind::Touch);
		assert_eq!(PointerKind::from_pointer_type(""), PointerKind::Touch);
	}
}

//! CPU backing store for the canvas.
//!
//! All drawing coordinates are surface pixels. The raster's `scale` (the device pixel ratio at
//! the time it was allocated) maps them onto backing-store pixels.

use super::Rgba;
use glam::{vec2, Vec2};
use itertools::iproduct;

fn floor_as_i32(x: f32) -> i32 {
	x.floor() as i32
}

fn ceil_as_i32(x: f32) -> i32 {
	x.ceil() as i32
}

/// Fraction of the pixel centered at `pixel_center` covered by a disc, using a one pixel ramp.
fn disc_coverage(center: Vec2, radius: f32, pixel_center: Vec2) -> f32 {
	(radius + 0.5 - center.distance(pixel_center)).clamp(0.0, 1.0)
}

/// Source-over blend of straight-alpha colors.
fn blend_over(destination: [u8; 4], source: Rgba, coverage: f32) -> [u8; 4] {
	let alpha = source.alpha() * coverage;
	if alpha >= 1.0 {
		return source.0;
	}
	let destination_alpha = destination[3] as f32 / 255.0;
	let out_alpha = alpha + destination_alpha * (1.0 - alpha);
	if out_alpha <= 0.0 {
		return [0, 0, 0, 0];
	}
	let mut out = [0u8; 4];
	for channel in 0..3 {
		let s = source.0[channel] as f32;
		let d = destination[channel] as f32;
		let value = (s * alpha + d * destination_alpha * (1.0 - alpha)) / out_alpha;
		out[channel] = value.round().clamp(0.0, 255.0) as u8;
	}
	out[3] = (out_alpha * 255.0).round() as u8;
	out
}

#[derive(Clone, PartialEq)]
pub struct Raster {
	width: u32,
	height: u32,
	scale: f32,
	pixels: Vec<[u8; 4]>,
}

impl std::fmt::Debug for Raster {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Raster")
			.field("width", &self.width)
			.field("height", &self.height)
			.field("scale", &self.scale)
			.finish_non_exhaustive()
	}
}

impl Raster {
	pub fn new(width: u32, height: u32, scale: f32) -> Self {
		debug_assert!(scale > 0.0);
		Self {
			width,
			height,
			scale,
			pixels: vec![Rgba::TRANSPARENT.0; width as usize * height as usize],
		}
	}

	/// Allocates a store for a container of `size` surface pixels, or `None` for an empty one.
	pub fn for_surface(size: Vec2, device_pixel_ratio: f32) -> Option<Self> {
		let scale = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
			device_pixel_ratio
		} else {
			1.0
		};
		let physical = (size * scale).round();
		if !(physical.x >= 1.0 && physical.y >= 1.0) {
			return None;
		}
		Some(Self::new(physical.x as u32, physical.y as u32, scale))
	}

	pub fn width(&self) -> u32 {
		self.width
	}

	pub fn height(&self) -> u32 {
		self.height
	}

	pub fn scale(&self) -> f32 {
		self.scale
	}

	/// Size in surface pixels.
	pub fn surface_size(&self) -> Vec2 {
		vec2(self.width as f32, self.height as f32) / self.scale
	}

	pub fn fill(&mut self, color: Rgba) {
		self.pixels.fill(color.0);
	}

	pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
		if x >= self.width || y >= self.height {
			return None;
		}
		Some(Rgba(self.pixels[(y * self.width + x) as usize]))
	}

	/// Pixel under a point given in surface coordinates.
	pub fn pixel_at(&self, position: Vec2) -> Option<Rgba> {
		let p = position * self.scale;
		if p.x < 0.0 || p.y < 0.0 {
			return None;
		}
		self.pixel(p.x as u32, p.y as u32)
	}

	/// Tightly packed RGBA8 rows.
	pub fn as_bytes(&self) -> &[u8] {
		bytemuck::cast_slice(&self.pixels)
	}

	/// Paints an anti-aliased filled disc.
	pub fn stamp_disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
		let center = center * self.scale;
		// Anything thinner than a pixel would flicker in and out along a stroke.
		let radius = (radius * self.scale).max(0.5);
		if !center.is_finite() || self.pixels.is_empty() {
			return;
		}

		let x0 = floor_as_i32(center.x - radius - 0.5).max(0);
		let y0 = floor_as_i32(center.y - radius - 0.5).max(0);
		let x1 = ceil_as_i32(center.x + radius + 0.5).min(self.width as i32 - 1);
		let y1 = ceil_as_i32(center.y + radius + 0.5).min(self.height as i32 - 1);
		if x0 > x1 || y0 > y1 {
			return;
		}

		for (y, x) in iproduct!(y0..=y1, x0..=x1) {
			let coverage = disc_coverage(center, radius, vec2(x as f32 + 0.5, y as f32 + 0.5));
			if coverage <= 0.0 {
				continue;
			}
			let index = (y as u32 * self.width + x as u32) as usize;
			self.pixels[index] = blend_over(self.pixels[index], color, coverage);
		}
	}

	/// Number of pixels that differ from `color`.
	pub fn count_not(&self, color: Rgba) -> usize {
		self.pixels.iter().filter(|p| **p != color.0).count()
	}
}

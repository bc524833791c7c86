use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A straight (non-premultiplied) 8-bit RGBA color.
///
/// Serializes as a CSS hex string so recordings stay readable.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
	pub const WHITE: Self = Self([0xff, 0xff, 0xff, 0xff]);
	pub const BLACK: Self = Self([0x00, 0x00, 0x00, 0xff]);
	pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);

	/// Parses anything CSS accepts as a color: names, hex, `rgb()`, `hsl()` and so on.
	pub fn parse(css: &str) -> Result<Self, csscolorparser::ParseColorError> {
		Ok(Self(csscolorparser::parse(css)?.to_rgba8()))
	}

	pub fn alpha(self) -> f32 {
		self.0[3] as f32 / 255.0
	}

	pub fn with_alpha(self, alpha: f32) -> Self {
		let [r, g, b, _] = self.0;
		Self([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
	}
}

impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let [r, g, b, a] = self.0;
		if a == 0xff {
			write!(f, "#{r:02x}{g:02x}{b:02x}")
		} else {
			write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
		}
	}
}

impl fmt::Debug for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Rgba({self})")
	}
}

impl FromStr for Rgba {
	type Err = csscolorparser::ParseColorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<String> for Rgba {
	type Error = csscolorparser::ParseColorError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}

impl From<Rgba> for String {
	fn from(value: Rgba) -> Self {
		value.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_css_forms() {
		assert_eq!(Rgba::parse("white").unwrap(), Rgba::WHITE);
		assert_eq!(Rgba::parse("#000").unwrap(), Rgba::BLACK);
		assert_eq!(
			Rgba::parse("rgba(255, 0, 0, 0.5)").unwrap().0,
			[255, 0, 0, 128]
		);
		assert!(Rgba::parse("not a color").is_err());
	}

	#[test]
	fn display_round_trips() {
		for css in ["#112233", "#11223344"] {
			let color = Rgba::parse(css).unwrap();
			assert_eq!(color.to_string(), css);
		}
	}

	#[test]
	fn serializes_as_hex() {
		let json = serde_json::to_string(&Rgba([1, 2, 3, 255])).unwrap();
		assert_eq!(json, "\"#010203\"");
		let color: Rgba = serde_json::from_str(&json).unwrap();
		assert_eq!(color, Rgba([1, 2, 3, 255]));
	}
}

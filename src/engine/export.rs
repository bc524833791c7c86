use super::raster::Raster;
use super::InkCanvas;
use crate::util::ResultExt;
use std::future::Future;
use thiserror::Error;
use tracing::instrument;
use zune_core::colorspace::ColorSpace;
use zune_image::codecs::ImageFormat;
use zune_image::image::Image;

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("backing store is empty")]
	Empty,

	#[error("png encoding failed: {0}")]
	Encode(String),
}

static_assertions::assert_impl_all!(ExportError: std::error::Error, Send, Sync);

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Encodes the backing store as an RGBA8 PNG, one pixel per backing-store pixel.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, ExportError> {
	if raster.width() == 0 || raster.height() == 0 {
		Err(ExportError::Empty)?;
	}
	let image = Image::from_u8(
		raster.as_bytes(),
		raster.width() as usize,
		raster.height() as usize,
		ColorSpace::RGBA,
	);
	image
		.write_to_vec(ImageFormat::PNG)
		.map_err(|err| ExportError::Encode(format!("{err:?}")))
}

impl InkCanvas {
	/// Snapshots the current pixels and encodes them.
	///
	/// The snapshot is taken before this returns, so drawing while the future is pending does
	/// not change the result. Resolves to `None` when there is no backing store or encoding
	/// fails.
	#[instrument(skip(self))]
	pub fn export_png(&mut self) -> impl Future<Output = Option<Vec<u8>>> + 'static {
		// Anything still queued is part of the visible drawing.
		self.compositor.render_pending();
		let snapshot = self.compositor.backing_store().cloned();
		async move {
			let raster = snapshot?;
			encode_png(&raster).ok_or_log()
		}
	}
}

use super::options::validate_brush_size;
use super::*;
use glam::Vec2;
use tracing::{debug, instrument};

/// Brush state applied to strokes started from now on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
	pub color: Rgba,
	pub size: f32,
	pub eraser: bool,
}

pub type TapCallback = Box<dyn FnMut(NormalizedPoint)>;

/// The annotation canvas: stroke model, compositor and live pointer session in one owned value.
///
/// Every mutation goes through a method on this type. Platform glue supplies a
/// [`FrameScheduler`] for once-per-frame painting and a [`SessionHost`] for pointer capture and
/// listener registration.
pub struct InkCanvas {
	pub(super) options: CanvasOptions,
	pub(super) model: StrokeModel,
	pub(super) compositor: Compositor,
	pub(super) brush: Brush,
	pub(super) annotation_mode: bool,
	pub(super) scheduler: Box<dyn FrameScheduler>,
	pub(super) host: Box<dyn SessionHost>,
	pub(super) on_tap: Option<TapCallback>,
}

impl std::fmt::Debug for InkCanvas {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InkCanvas")
			.field("options", &self.options)
			.field("model", &self.model)
			.field("compositor", &self.compositor)
			.field("brush", &self.brush)
			.field("annotation_mode", &self.annotation_mode)
			.finish_non_exhaustive()
	}
}

impl InkCanvas {
	pub fn new(
		options: CanvasOptions,
		scheduler: impl FrameScheduler + 'static,
		host: impl SessionHost + 'static,
	) -> Result<Self, CanvasError> {
		options.validate()?;
		Ok(Self {
			model: StrokeModel::default(),
			compositor: Compositor::new(options.background, options.stamp_step),
			brush: Brush {
				color: options.brush_color,
				size: options.brush_size,
				eraser: false,
			},
			annotation_mode: false,
			scheduler: Box::new(scheduler),
			host: Box::new(host),
			on_tap: None,
			options,
		})
	}

	/// A canvas with default options whose frames and sessions are driven by the caller.
	pub fn detached() -> Self {
		Self {
			model: StrokeModel::default(),
			compositor: Compositor::new(Rgba::WHITE, STAMP_STEP),
			brush: Brush {
				color: DEFAULT_BRUSH_COLOR,
				size: DEFAULT_BRUSH_SIZE,
				eraser: false,
			},
			annotation_mode: false,
			scheduler: Box::new(ManualFrames),
			host: Box::new(DetachedHost),
			on_tap: None,
			options: CanvasOptions::default(),
		}
	}

	pub fn options(&self) -> &CanvasOptions {
		&self.options
	}

	pub fn model(&self) -> &StrokeModel {
		&self.model
	}

	pub fn compositor(&self) -> &Compositor {
		&self.compositor
	}

	pub fn brush(&self) -> Brush {
		self.brush
	}

	pub fn annotation_mode(&self) -> bool {
		self.annotation_mode
	}

	pub fn set_brush_color(&mut self, css: &str) -> Result<(), CanvasError> {
		self.brush.color = Rgba::parse(css).map_err(|_| CanvasError::InvalidColor(css.to_owned()))?;
		Ok(())
	}

	pub fn set_brush_size(&mut self, size: f32) -> Result<(), CanvasError> {
		self.brush.size = validate_brush_size(size)?;
		Ok(())
	}

	pub fn set_eraser(&mut self, eraser: bool) {
		self.brush.eraser = eraser;
	}

	/// Switching into annotation mode ends any stroke in progress. Returns whether one was ended.
	pub fn set_annotation_mode(&mut self, annotation_mode: bool) -> bool {
		if annotation_mode == self.annotation_mode {
			return false;
		}
		debug!(annotation_mode, "switching input mode");
		self.annotation_mode = annotation_mode;
		annotation_mode && self.end_session().is_some()
	}

	pub fn set_on_tap(&mut self, on_tap: impl FnMut(NormalizedPoint) + 'static) {
		self.on_tap = Some(Box::new(on_tap));
	}

	/// Adapts the backing store to a new container size and redraws everything.
	#[instrument(skip(self))]
	pub fn resize(&mut self, surface_size: Vec2, device_pixel_ratio: f32) {
		self.compositor
			.resize(surface_size, device_pixel_ratio, self.model.strokes());
	}

	/// Paints everything queued since the last frame. Hosts call this from their frame callback.
	pub fn render_frame(&mut self) -> usize {
		self.compositor.render_frame()
	}

	/// Lets go of the host surface: ends the session, withdraws the frame request and drops the
	/// backing store. A later [`resize`](Self::resize) attaches again.
	#[instrument(skip(self))]
	pub fn detach(&mut self) {
		self.end_session();
		self.compositor.cancel_frame(self.scheduler.as_mut());
		self.compositor.detach();
	}

	pub(super) fn replay(&mut self) {
		self.compositor.replay(self.model.strokes());
	}

	pub fn backing_store(&self) -> Option<&raster::Raster> {
		self.compositor.backing_store()
	}
}

impl Drop for InkCanvas {
	fn drop(&mut self) {
		self.end_session();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use glam::vec2;

	#[test]
	fn invalid_options_are_rejected() {
		let options = CanvasOptions::builder().brush_size(0.0).build();
		assert!(matches!(
			InkCanvas::new(options, ManualFrames, DetachedHost),
			Err(CanvasError::InvalidBrushSize(_))
		));
	}

	#[test]
	fn brush_setters_validate() {
		let mut canvas = InkCanvas::detached();
		canvas.set_brush_color("rebeccapurple").unwrap();
		assert_eq!(canvas.brush().color, Rgba([0x66, 0x33, 0x99, 0xff]));

		assert_eq!(
			canvas.set_brush_color("ink"),
			Err(CanvasError::InvalidColor("ink".into()))
		);
		assert_eq!(canvas.brush().color, Rgba([0x66, 0x33, 0x99, 0xff]));

		assert!(canvas.set_brush_size(f32::INFINITY).is_err());
		canvas.set_brush_size(6.0).unwrap();
		assert_eq!(canvas.brush().size, 6.0);
	}

	#[test]
	fn switching_modes_reports_the_ended_stroke() {
		let mut canvas = InkCanvas::detached();
		canvas.pointer_down(PointerSample {
			pointer_id: 1,
			kind: PointerKind::Touch,
			position: vec2(4.0, 4.0),
			pressure: 0.5,
			timestamp: 0.0,
			primary_button: false,
			target_size: vec2(20.0, 20.0),
		});
		assert!(canvas.set_annotation_mode(true));
		assert!(!canvas.set_annotation_mode(true));
		assert!(!canvas.set_annotation_mode(false));
		assert!(!canvas.is_drawing());
	}

	#[test]
	fn resize_fills_background() {
		let mut canvas = InkCanvas::detached();
		assert!(canvas.backing_store().is_none());
		canvas.resize(vec2(30.0, 20.0), 2.0);
		let store = canvas.backing_store().unwrap();
		assert_eq!((store.width(), store.height()), (60, 40));
		assert_eq!(store.count_not(Rgba::WHITE), 0);
	}
}

mod color;
pub use color::*;

mod stroke;
pub use stroke::*;

mod width;
pub use width::*;

pub mod raster;

mod compositor;
pub use compositor::*;

mod options;
pub use options::*;

mod canvas;
pub use canvas::*;

mod input;
pub use input::*;

mod history;

mod overlay;
pub use overlay::*;

mod export;
pub use export::*;

pub mod recording;
pub use recording::Recording;

mod ink_canvas;
pub use ink_canvas::*;

mod overlay_layer;
pub use overlay_layer::*;

mod brush_setting;
pub use brush_setting::*;

mod toolbar;
pub use toolbar::*;

mod shortcuts;
pub use shortcuts::*;

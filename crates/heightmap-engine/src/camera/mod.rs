//! Camera and render state.
//!
//! Everything here is plain data plus transitions: no window, no GPU. The app
//! owns one [`RenderState`], feeds it input and resize notifications, and reads
//! back the MVP matrix and the modes the renderer should honour.

mod controls;
mod modes;
mod orbit;
mod projection;
mod state;

pub use controls::ViewCommand;
pub use modes::FillMode;
pub use orbit::{OrbitControls, ROTATION_PER_PIXEL, TRANSLATION_PER_PIXEL, ZOOM_PER_NOTCH};
pub use projection::Projection;
pub use state::{CameraConfig, RenderState};

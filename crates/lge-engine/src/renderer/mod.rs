pub mod camera;
pub mod canvas;

pub use camera::Camera;
pub use canvas::Canvas;

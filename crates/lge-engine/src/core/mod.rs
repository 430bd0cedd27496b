pub mod rect;
pub mod scene;
pub mod scheduler;
pub mod time;

pub mod app;
pub mod camera3d;
pub mod carousel;
pub mod cli;
pub mod config;
pub mod events;
pub mod gesture;
pub mod input;
pub mod picking;
pub mod replay;
pub mod scene;
pub mod session;
pub mod throttle;
pub mod time;
pub mod transition;

pub use app::{run, run_with_overrides, App};
pub use session::{CarouselSession, FrameSnapshot, InputOutcome};

//! Frame timing.
//!
//! The runtime owns one `FrameClock` and ticks it once per presented frame;
//! the resulting `FrameTime` is handed to the app's frame callback.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};

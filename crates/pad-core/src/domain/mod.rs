//! Input-interpretation logic with no infrastructure dependencies.
//!
//! Everything here is pure state-machine code driven by injected timestamps:
//! it compiles and tests on any platform without a link, a timer, or an
//! async runtime. The client crate owns the timelines (timers, ticks,
//! channels) and calls in.

pub mod apps;
pub mod gesture;
pub mod momentum;

pub use apps::{AppChange, AppDirectory, AppEntry};
pub use gesture::{GestureClassifier, GestureConfig, GestureEvent, PointerSample};
pub use momentum::{ScrollConfig, ScrollMomentumEngine};

/// Flipclock Core Library - 3D flip-clock world, geometry and projection
///
/// This library provides the platform-independent part of the clock: the
/// digit flip animation, spin physics, accelerometer smoothing, camera
/// projection and painter's-order rendering onto an abstract canvas.

pub mod blinker;
pub mod clock;
pub mod error;
pub mod geometry;
pub mod glyph;
pub mod interpolator;
pub mod projection;
pub mod render;
pub mod sampler;
pub mod transform;
pub mod world;

// Re-export commonly used types
pub use blinker::{Blinker, BlinkerHandle, Ink};
pub use clock::{Clock3D, ClockTime, SlotGroup};
pub use error::{SettingError, WorldError};
pub use glyph::DigitSkin;
pub use projection::{Camera, ProjectionMode};
pub use render::{Blend, Canvas, TransparencyMode};
pub use world::{
    Button, Gesture, Press, Services, SettingsStore, TapAxis, TickOutcome, World, WorldConfig,
    WorldMode,
};

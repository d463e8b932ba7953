//! Animated particle constellation background.
//!
//! Renders drifting, pulsing particles on an HTML canvas and joins nearby
//! pairs with translucent lines:
//! - Particle count scales with canvas area and is rebuilt on resize
//! - Particles bounce off the canvas edges and pulse in size
//! - Connection opacity fades with squared distance
//!
//! # Example
//!
//! ```ignore
//! use constellation_bg::{ConstellationCanvas, FieldStyle};
//!
//! view! { <ConstellationCanvas style=FieldStyle::frost() /> }
//! ```

mod animator;
mod component;
mod field;
mod grid;
mod render;
mod style;

pub use animator::{Animator, BrowserScheduler, FrameHandle, FrameScheduler};
pub use component::{Constellation, ConstellationCanvas, Sizing};
pub use field::{Connection, Particle, ParticleField, particle_count};
pub use render::Surface;
pub use style::{Color, FieldStyle, parse_style};

//! Event-driven hard-sphere dynamics inside a spherical container.
//!
//! Perfectly elastic spheres move freely inside a fixed spherical wall. The
//! engine advances state in exact, event-ordered jumps: it predicts the next
//! pairwise contact analytically, drifts every body to that instant, resolves
//! the collision, and repeats until the requested target time is reached.
//! Every intervening collision is processed exactly once, in time order.
//!
//! The crate is a pure kernel: it exposes positions, velocities and radii per
//! body and accumulates the impulse delivered to the container wall. Drawing,
//! CLI and logger installation are the consumer's concern (log output goes
//! through the [`log`] facade).
//!
//! ```no_run
//! use spheresim::{Ball, Container, Simulation};
//!
//! # fn main() -> spheresim::Result<()> {
//! let balls = vec![
//!     Ball::new([-2.0, 0.0, 0.0], [1.0, 0.0, 0.0], 1.0, 1.0)?,
//!     Ball::new([2.0, 0.0, 0.0], [-1.0, 0.0, 0.0], 1.0, 1.0)?,
//! ];
//! let mut sim = Simulation::new(balls, Container::new(10.0)?)?;
//! let frame = sim.advance_to(1.5)?;
//! assert_eq!(frame.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;

pub use crate::core::{
    Ball, Body, BodyId, BodySnapshot, Container, Event, EventQueue, Pair, Simulation,
};
pub use crate::error::{Error, Result};

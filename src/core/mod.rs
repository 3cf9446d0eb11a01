//! Core data structures and the event-driven simulation loop.
//!
//! Leaves first: [`body`] holds the sphere variants and their shared
//! capability trait, [`collision`] the pure prediction/resolution math,
//! [`event`] and [`queue`] the time-ordered pending-collision bookkeeping,
//! and [`sim`] the clock that orchestrates them.

pub mod body;
pub mod collision;
pub mod event;
pub mod queue;
pub mod sim;

pub use body::{Ball, Body, BodyId, Container, DIM};
pub use event::{Event, Pair};
pub use queue::EventQueue;
pub use sim::{BodySnapshot, Simulation};

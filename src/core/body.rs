use crate::error::{Error, Result};

/// Fixed spatial dimension (3D).
pub const DIM: usize = 3;

/// Capability set shared by everything that can take part in a collision.
///
/// The collision-time quadratic is derived for two spheres approaching each
/// other; [`Container`] participates in the same formula by reporting its
/// radius *negated* (see [`Container`]). All implementations must report
/// finite values.
pub trait Body {
    /// Centre position (x, y, z).
    fn position(&self) -> [f64; DIM];
    /// Velocity (vx, vy, vz).
    fn velocity(&self) -> [f64; DIM];
    /// Sign-aware radius: positive for a ball, negative for the container.
    fn radius(&self) -> f64;
    /// Mass; infinite for the container.
    fn mass(&self) -> f64;
}

/// Identity of a body inside a [`crate::Simulation`].
///
/// Events reference bodies by this identity; the derived order (balls by
/// index, container last) is what normalizes an unordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BodyId {
    /// Index into the simulation's ball sequence.
    Ball(u32),
    /// The single containing wall.
    Container,
}

/// A hard sphere moving freely inside the container.
///
/// Position changes only via `drift`, velocity only via collision
/// resolution or the validated setters.
#[derive(Debug, Clone)]
pub struct Ball {
    pub(crate) r: [f64; DIM],
    pub(crate) v: [f64; DIM],
    radius: f64,
    mass: f64,
}

impl Ball {
    /// Create a new ball after validating invariants.
    ///
    /// Errors with [`Error::InvalidParam`] if `radius` is not finite and
    /// positive, `mass` is not finite and non-negative, or any position or
    /// velocity component is NaN/inf. Zero mass is permitted by construction
    /// but produces degenerate collision resolution when two massless balls
    /// meet; that pairing is rejected at resolve time, not here.
    pub fn new(r: [f64; DIM], v: [f64; DIM], radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass < 0.0 {
            return Err(Error::InvalidParam("mass must be finite and >= 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self { r, v, radius, mass })
    }

    /// Sphere radius (always positive).
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Mass.
    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Centre position.
    #[inline]
    pub fn position(&self) -> [f64; DIM] {
        self.r
    }

    /// Velocity.
    #[inline]
    pub fn velocity(&self) -> [f64; DIM] {
        self.v
    }

    /// Kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Momentum vector m·v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        let mut p = [0.0; DIM];
        for (pk, &vk) in p.iter_mut().zip(self.v.iter()) {
            *pk = self.mass * vk;
        }
        p
    }

    /// Set position (validated as finite).
    pub fn set_position(&mut self, r: [f64; DIM]) -> Result<()> {
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        self.r = r;
        Ok(())
    }

    /// Set velocity (validated as finite).
    pub fn set_velocity(&mut self, v: [f64; DIM]) -> Result<()> {
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.v = v;
        Ok(())
    }

    /// Linear free flight for `dt` time units. No collision handling.
    #[inline]
    pub(crate) fn drift(&mut self, dt: f64) {
        for (rk, &vk) in self.r.iter_mut().zip(self.v.iter()) {
            *rk += vk * dt;
        }
    }
}

impl Body for Ball {
    fn position(&self) -> [f64; DIM] {
        self.r
    }

    fn velocity(&self) -> [f64; DIM] {
        self.v
    }

    fn radius(&self) -> f64 {
        self.radius
    }

    fn mass(&self) -> f64 {
        self.mass
    }
}

/// The fixed spherical wall enclosing all balls, centred at the origin.
///
/// Conceptually infinite mass: it never moves, but it accumulates the
/// impulse delivered by wall impacts in a running `momentum` total
/// (diagnostic only) and records each impact's `(time, |impulse|)` so a
/// caller can derive pressure over a time window.
#[derive(Debug, Clone)]
pub struct Container {
    radius: f64,
    momentum: [f64; DIM],
    impulses: Vec<(f64, f64)>,
}

impl Container {
    /// Create a container of the given wall radius (finite, > 0).
    pub fn new(radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        Ok(Self {
            radius,
            momentum: [0.0; DIM],
            impulses: Vec::new(),
        })
    }

    /// Wall radius as the stored positive magnitude.
    #[inline]
    pub fn wall_radius(&self) -> f64 {
        self.radius
    }

    /// Running total of impulse received from wall impacts.
    #[inline]
    pub fn accumulated_momentum(&self) -> [f64; DIM] {
        self.momentum
    }

    /// Recorded wall impacts as `(time, |impulse|)` pairs, in event order.
    #[inline]
    pub fn impulse_events(&self) -> &[(f64, f64)] {
        &self.impulses
    }

    /// Credit an impact's impulse to the wall.
    pub(crate) fn record_impulse(&mut self, time: f64, dp: [f64; DIM]) {
        for (mk, &dk) in self.momentum.iter_mut().zip(dp.iter()) {
            *mk += dk;
        }
        let mag = dp.iter().map(|&c| c * c).sum::<f64>().sqrt();
        self.impulses.push((time, mag));
    }
}

impl Body for Container {
    fn position(&self) -> [f64; DIM] {
        [0.0; DIM]
    }

    fn velocity(&self) -> [f64; DIM] {
        [0.0; DIM]
    }

    /// Reported *negated* so the shared two-sphere quadratic models a ball
    /// approaching the wall from inside: the combined radius becomes the
    /// ball-to-wall contact distance `radius(ball) - wall_radius`. This sign
    /// convention is a coupling between the data representation and the
    /// collision-time formula, not a physical fact; use
    /// [`Container::wall_radius`] for the geometric magnitude.
    fn radius(&self) -> f64 {
        -self.radius
    }

    fn mass(&self) -> f64 {
        f64::INFINITY
    }
}

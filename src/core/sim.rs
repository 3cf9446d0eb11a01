use crate::core::body::{Ball, BodyId, Container, DIM};
use crate::core::collision::{self, close, dot, CLOSE_EPS};
use crate::core::event::{Event, Pair};
use crate::core::queue::EventQueue;
use crate::error::{Error, Result};
use log::{debug, trace};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;

/// Amount shaved off the drift step leading up to a predicted contact, so
/// the pair is resolved a hair short of touching and the next prediction
/// pass cannot re-detect the same contact at t ~ 0.
const CONTACT_SHAVE: f64 = 1e-10;

/// Read-only per-ball state handed to a drawing layer after each advance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    /// Centre position (x, y, z).
    pub position: [f64; DIM],
    /// Sphere radius.
    pub radius: f64,
}

/// Event-driven simulation of hard elastic spheres in a spherical container.
///
/// Owns the bodies, the clock and the event queue, and orchestrates
/// prediction, scheduling, advancement, resolution and rescheduling. The
/// queue holds at most one *outgoing* candidate event per ball at a time
/// (its earliest predicted contact over all partners), bounding queue size
/// at O(n); a ball may additionally appear as the partner in other balls'
/// events. The container never owns an outgoing event: its wall contacts
/// are always scheduled from the ball side.
#[derive(Debug)]
pub struct Simulation {
    clock: f64,
    frame: u64,
    balls: Vec<Ball>,
    container: Container,
    queue: EventQueue,
    next_seq: u64,
}

impl Simulation {
    /// Create a simulation from explicit bodies.
    ///
    /// Validates that at least one ball is supplied, that every ball fits
    /// inside the container, and that no two balls start overlapping; then
    /// seeds the event queue with each ball's earliest predicted collision.
    pub fn new(balls: Vec<Ball>, container: Container) -> Result<Self> {
        if balls.is_empty() {
            return Err(Error::InvalidParam("at least one ball is required".into()));
        }
        u32::try_from(balls.len())
            .map_err(|_| Error::InvalidParam("too many balls for u32 indexing".into()))?;

        let wall = container.wall_radius();
        for (i, ball) in balls.iter().enumerate() {
            let r = ball.position();
            let dist = dot(&r, &r).sqrt();
            if dist + ball.radius() > wall + CLOSE_EPS {
                return Err(Error::InvalidParam(format!(
                    "ball {i} does not fit inside the container: |r| + radius = {} > {wall}",
                    dist + ball.radius()
                )));
            }
        }
        for i in 0..balls.len() {
            for j in (i + 1)..balls.len() {
                let (ri, rj) = (balls[i].position(), balls[j].position());
                let mut d = [0.0; DIM];
                for k in 0..DIM {
                    d[k] = ri[k] - rj[k];
                }
                let dist = dot(&d, &d).sqrt();
                let min_dist = balls[i].radius() + balls[j].radius();
                if dist + CLOSE_EPS < min_dist {
                    return Err(Error::InvalidParam(format!(
                        "balls {i} and {j} overlap at construction: centre distance {dist} < {min_dist}"
                    )));
                }
            }
        }

        let mut sim = Self {
            clock: 0.0,
            frame: 0,
            balls,
            container,
            queue: EventQueue::new(),
            next_seq: 0,
        };
        sim.seed_events()?;
        Ok(sim)
    }

    /// Create a simulation with `num_balls` identical spheres placed by
    /// rejection sampling (no initial overlap, fully inside the wall) and
    /// velocities sampled uniformly in [-1, 1] per component.
    ///
    /// `seed` makes the setup reproducible; `None` draws a fresh seed.
    pub fn with_random_balls(
        num_balls: usize,
        container_radius: f64,
        ball_radius: f64,
        mass: f64,
        seed: Option<u64>,
    ) -> Result<Self> {
        if num_balls == 0 {
            return Err(Error::InvalidParam("num_balls must be > 0".into()));
        }
        if !ball_radius.is_finite() || ball_radius <= 0.0 {
            return Err(Error::InvalidParam("ball_radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        let container = Container::new(container_radius)?;
        let bound = container_radius - ball_radius;
        if bound <= 0.0 {
            return Err(Error::InvalidParam(
                "ball_radius must be smaller than container_radius".into(),
            ));
        }

        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        // Rejection sample non-overlapping positions inside the wall
        let mut balls: Vec<Ball> = Vec::with_capacity(num_balls);
        let max_attempts = 1_000_000usize;
        for i in 0..num_balls {
            let mut attempts = 0usize;
            let r = loop {
                if attempts >= max_attempts {
                    return Err(Error::InvalidParam(format!(
                        "failed to place ball {i} without overlap; try fewer balls or a smaller radius"
                    )));
                }
                attempts += 1;
                let mut r = [0.0_f64; DIM];
                for r_k in r.iter_mut() {
                    *r_k = rng.random_range(-bound..=bound);
                }
                if dot(&r, &r) > bound * bound {
                    continue; // corner of the sampling cube, outside the wall
                }
                if !overlaps_existing(&balls, &r, ball_radius) {
                    break r;
                }
            };

            let mut v = [0.0_f64; DIM];
            v.iter_mut().for_each(|x| *x = rng.random_range(-1.0..=1.0));

            balls.push(Ball::new(r, v, ball_radius, mass)?);
        }

        Self::new(balls, container)
    }

    /// Current simulation time.
    #[inline]
    pub fn time(&self) -> f64 {
        self.clock
    }

    /// Number of balls.
    pub fn num_balls(&self) -> usize {
        self.balls.len()
    }

    /// Read-only view of the balls.
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Read-only view of the container (wall radius, accumulated momentum,
    /// impulse history).
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.balls.iter().map(|b| b.position()).collect()
    }

    /// Velocities as a Vec of fixed-size arrays.
    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.balls.iter().map(|b| b.velocity()).collect()
    }

    /// Total kinetic energy of the balls (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.balls.iter().map(|b| b.kinetic_energy()).sum()
    }

    /// Total momentum of the balls (diagnostic). Together with
    /// [`Container::accumulated_momentum`] this is conserved across wall
    /// impacts.
    pub fn momentum(&self) -> [f64; DIM] {
        let mut total = [0.0; DIM];
        for ball in &self.balls {
            let p = ball.momentum();
            for (tk, &pk) in total.iter_mut().zip(p.iter()) {
                *tk += pk;
            }
        }
        total
    }

    /// Advance to absolute time `target_time`, resolving every intervening
    /// collision exactly once, in time order. Returns one snapshot per ball
    /// for a drawing layer.
    ///
    /// Atomic from the caller's perspective: either all collisions up to the
    /// target are applied and the clock lands exactly on `target_time`, or a
    /// fatal error is returned. An empty event queue mid-advance means a ball
    /// has escaped the container (or an equivalent modeling bug) and aborts
    /// the run.
    pub fn advance_to(&mut self, target_time: f64) -> Result<Vec<BodySnapshot>> {
        if !target_time.is_finite() {
            return Err(Error::InvalidParam("target_time must be finite".into()));
        }
        if target_time < self.clock && !close(target_time, self.clock) {
            return Err(Error::InvalidParam(format!(
                "target_time {target_time} is earlier than the current clock {}",
                self.clock
            )));
        }

        loop {
            let next_time = match self.queue.peek_min() {
                Some(ev) => ev.time(),
                None => {
                    return Err(Error::InvariantViolation(format!(
                        "event queue empty at t={}: every ball should always have a \
                         pending collision while the container bounds it",
                        self.clock
                    )))
                }
            };
            if next_time > target_time {
                break;
            }
            let Some(ev) = self.queue.pop_min() else {
                return Err(Error::InvariantViolation(
                    "event queue drained between peek and pop".into(),
                ));
            };

            // Stop a hair short of contact; clamp in case near-simultaneous
            // events leave the clock already within the shave.
            let step = (ev.time() - self.clock - CONTACT_SHAVE).max(0.0);
            self.tick(step)?;
            self.resolve_event(&ev)?;
            self.reschedule_after(&ev)?;
        }

        // Land exactly on the target; no shave, this is not a contact.
        let remainder = target_time - self.clock;
        if remainder > 0.0 {
            self.tick(remainder)?;
            self.clock = target_time;
        }
        Ok(self.snapshots())
    }

    /// Advance to the next frame on a fixed grid: frame `f` maps to absolute
    /// time `f / framerate`. Convenience driver for a renderer loop; mixing
    /// it with direct `advance_to` calls past the frame grid is an error
    /// (the clock cannot move backwards).
    pub fn next_frame(&mut self, framerate: f64) -> Result<Vec<BodySnapshot>> {
        if !framerate.is_finite() || framerate <= 0.0 {
            return Err(Error::InvalidParam("framerate must be finite and > 0".into()));
        }
        self.frame += 1;
        let target = self.frame as f64 / framerate;
        self.advance_to(target)
    }

    /// Frame counter of the [`Simulation::next_frame`] driver.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Windowed mechanical pressure on the container wall: the sum of
    /// impulse magnitudes received during `[now - window, now]` divided by
    /// the window and the wall's surface area.
    pub fn mechanical_pressure(&self, window: f64) -> Result<f64> {
        if !window.is_finite() || window <= 0.0 {
            return Err(Error::InvalidParam("window must be finite and > 0".into()));
        }
        let t0 = self.clock - window;
        let total: f64 = self
            .container
            .impulse_events()
            .iter()
            .filter(|(t, _)| *t >= t0)
            .map(|(_, j)| j)
            .sum();
        let r = self.container.wall_radius();
        let area = 4.0 * std::f64::consts::PI * r * r;
        Ok(total / (window * area))
    }

    /// Set ball `i`'s position (validated as finite). Call
    /// [`Simulation::rebuild_event_queue`] after externally modifying state,
    /// otherwise queued predictions still refer to the old trajectory.
    pub fn set_ball_position(&mut self, i: usize, r: [f64; DIM]) -> Result<()> {
        let ball = self
            .balls
            .get_mut(i)
            .ok_or_else(|| Error::InvalidParam(format!("no ball with index {i}")))?;
        ball.set_position(r)
    }

    /// Set ball `i`'s velocity (validated as finite). See
    /// [`Simulation::set_ball_position`] for the rebuild requirement.
    pub fn set_ball_velocity(&mut self, i: usize, v: [f64; DIM]) -> Result<()> {
        let ball = self
            .balls
            .get_mut(i)
            .ok_or_else(|| Error::InvalidParam(format!("no ball with index {i}")))?;
        ball.set_velocity(v)
    }

    /// Rebuild the event queue from the current body states. Required after
    /// externally modifying positions or velocities.
    pub fn rebuild_event_queue(&mut self) -> Result<()> {
        self.queue.clear();
        self.seed_events()
    }

    // ============ Internal helpers ============

    /// Drift every ball by `step` and advance the clock. No collision
    /// handling; a negative step is a programming error.
    fn tick(&mut self, step: f64) -> Result<()> {
        if step < 0.0 {
            return Err(Error::InvalidParam(format!(
                "step {step} must be non-negative"
            )));
        }
        if step == 0.0 {
            return Ok(());
        }
        for ball in &mut self.balls {
            ball.drift(step);
        }
        self.clock += step;
        Ok(())
    }

    fn seed_events(&mut self) -> Result<()> {
        for i in 0..self.balls.len() as u32 {
            self.schedule_earliest_for(i)?;
        }
        debug!(
            "seeded {} events for {} balls at t={}",
            self.queue.len(),
            self.balls.len(),
            self.clock
        );
        Ok(())
    }

    /// Push ball `i`'s single earliest predicted collision over all
    /// partners (other balls and the container), if any.
    fn schedule_earliest_for(&mut self, i: u32) -> Result<()> {
        let best = {
            let ball = &self.balls[i as usize];
            let mut best: Option<(f64, BodyId)> = None;
            for (j, other) in self.balls.iter().enumerate() {
                if j == i as usize {
                    continue;
                }
                if let Some(dt) = collision::time_to_collision(ball, other) {
                    if best.is_none_or(|(t, _)| dt < t) {
                        best = Some((dt, BodyId::Ball(j as u32)));
                    }
                }
            }
            if let Some(dt) = collision::time_to_collision(ball, &self.container) {
                if best.is_none_or(|(t, _)| dt < t) {
                    best = Some((dt, BodyId::Container));
                }
            }
            best
        };

        let Some((dt, partner)) = best else {
            // Cannot happen while the container bounds every trajectory;
            // the empty-queue check in advance_to surfaces the violation.
            debug!("no future collision predicted for ball {i}");
            return Ok(());
        };
        let seq = self.alloc_seq();
        let ev = Event::new(
            self.clock + dt,
            Pair::new(BodyId::Ball(i), partner)?,
            seq,
        )?;
        self.queue.push(ev);
        Ok(())
    }

    fn resolve_event(&mut self, ev: &Event) -> Result<()> {
        let pair = ev.pair();
        trace!("resolving {:?} scheduled for t={}", pair, ev.time());
        match (pair.first(), pair.second()) {
            (BodyId::Ball(i), BodyId::Ball(j)) => {
                let (lo, hi) = (i.min(j) as usize, i.max(j) as usize);
                let (head, tail) = self.balls.split_at_mut(hi);
                collision::resolve_balls(&mut head[lo], &mut tail[0])
            }
            (BodyId::Ball(i), BodyId::Container) => {
                collision::resolve_wall(&mut self.balls[i as usize], &mut self.container, self.clock)
            }
            (BodyId::Container, _) => Err(Error::InvariantViolation(
                "container paired with itself in the event queue".into(),
            )),
        }
    }

    /// Discard every queued event naming a participant of `ev` and push one
    /// fresh earliest event for each affected ball: the participants plus
    /// the outside partners whose pending event just got removed.
    fn reschedule_after(&mut self, ev: &Event) -> Result<()> {
        let pair = ev.pair();
        let mut dirty: BTreeSet<BodyId> = BTreeSet::new();
        dirty.insert(pair.first());
        dirty.insert(pair.second());
        for id in [pair.first(), pair.second()] {
            for removed in self.queue.remove_involving(id) {
                let rp = removed.pair();
                dirty.insert(rp.first());
                dirty.insert(rp.second());
            }
        }
        for id in dirty {
            if let BodyId::Ball(i) = id {
                self.schedule_earliest_for(i)?;
            }
        }
        Ok(())
    }

    fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn snapshots(&self) -> Vec<BodySnapshot> {
        self.balls
            .iter()
            .map(|b| BodySnapshot {
                position: b.position(),
                radius: b.radius(),
            })
            .collect()
    }
}

// ============ Utility helpers ============

fn overlaps_existing(existing: &[Ball], r: &[f64; DIM], radius: f64) -> bool {
    for ball in existing {
        let other = ball.position();
        let mut d = [0.0_f64; DIM];
        for (k, dk) in d.iter_mut().enumerate() {
            *dk = r[k] - other[k];
        }
        let min_dist = radius + ball.radius();
        if dot(&d, &d) < min_dist * min_dist {
            return true;
        }
    }
    false
}

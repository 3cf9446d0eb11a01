use crate::core::body::BodyId;
use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// Unordered pair of distinct bodies, stored normalized (smaller id first)
/// so that `{a, b}` and `{b, a}` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair {
    a: BodyId,
    b: BodyId,
}

impl Pair {
    /// Build a normalized pair; a body cannot be paired with itself.
    pub fn new(x: BodyId, y: BodyId) -> Result<Self> {
        if x == y {
            return Err(Error::InvalidParam(format!(
                "a body cannot collide with itself: {x:?}"
            )));
        }
        let (a, b) = if x < y { (x, y) } else { (y, x) };
        Ok(Self { a, b })
    }

    /// Smaller endpoint (a ball; never the container when a ball is present).
    #[inline]
    pub fn first(&self) -> BodyId {
        self.a
    }

    /// Larger endpoint.
    #[inline]
    pub fn second(&self) -> BodyId {
        self.b
    }

    /// Whether `id` is one of the endpoints.
    #[inline]
    pub fn contains(&self, id: BodyId) -> bool {
        self.a == id || self.b == id
    }
}

/// A scheduled future collision between a specific pair of bodies.
///
/// `time` is absolute simulation time, not a relative delay. `seq` is a
/// creation sequence number: it gives every event a distinct identity so
/// the queue is a true multiset, and provides the final tie-breaker for
/// exactly simultaneous events (deterministic but otherwise arbitrary,
/// matching the pairwise-sequential resolution semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    time: NotNan<f64>,
    pair: Pair,
    seq: u64,
}

impl Event {
    /// Create a new event, validating that the time is finite and non-NaN.
    ///
    /// A non-finite predicted time means the physical model has been
    /// violated, hence [`Error::InvariantViolation`].
    pub fn new(time: f64, pair: Pair, seq: u64) -> Result<Self> {
        if !time.is_finite() {
            return Err(Error::InvariantViolation(format!(
                "predicted collision time {time} for {pair:?} is not finite"
            )));
        }
        let time = NotNan::new(time).map_err(|_| {
            Error::InvariantViolation(format!("predicted collision time for {pair:?} is NaN"))
        })?;
        Ok(Self { time, pair, seq })
    }

    /// Absolute event time.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time.into_inner()
    }

    /// The two bodies expected to collide.
    #[inline]
    pub fn pair(&self) -> Pair {
        self.pair
    }

    /// Creation sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.time, self.pair, self.seq).cmp(&(other.time, other.pair, other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_is_normalized() -> Result<()> {
        let p = Pair::new(BodyId::Container, BodyId::Ball(3))?;
        assert_eq!(p.first(), BodyId::Ball(3));
        assert_eq!(p.second(), BodyId::Container);
        assert_eq!(p, Pair::new(BodyId::Ball(3), BodyId::Container)?);
        Ok(())
    }

    #[test]
    fn self_pair_rejected() {
        assert!(Pair::new(BodyId::Ball(1), BodyId::Ball(1)).is_err());
        assert!(Pair::new(BodyId::Container, BodyId::Container).is_err());
    }

    #[test]
    fn pair_contains_endpoints() -> Result<()> {
        let p = Pair::new(BodyId::Ball(0), BodyId::Ball(2))?;
        assert!(p.contains(BodyId::Ball(0)));
        assert!(p.contains(BodyId::Ball(2)));
        assert!(!p.contains(BodyId::Ball(1)));
        assert!(!p.contains(BodyId::Container));
        Ok(())
    }

    #[test]
    fn new_event_rejects_nan_and_infinite_time() -> Result<()> {
        let pair = Pair::new(BodyId::Ball(0), BodyId::Ball(1))?;
        assert!(matches!(
            Event::new(f64::NAN, pair, 0),
            Err(Error::InvariantViolation(_))
        ));
        assert!(matches!(
            Event::new(f64::INFINITY, pair, 0),
            Err(Error::InvariantViolation(_))
        ));
        Ok(())
    }

    #[test]
    fn ordering_by_time_then_pair_then_seq() -> Result<()> {
        let pp = Pair::new(BodyId::Ball(0), BodyId::Ball(1))?;
        let pw = Pair::new(BodyId::Ball(0), BodyId::Container)?;
        let e1 = Event::new(1.0, pw, 5)?;
        let e2 = Event::new(2.0, pp, 0)?;
        assert!(e1 < e2);

        // Equal time: ball-ball pair precedes ball-container pair
        let a = Event::new(5.0, pp, 7)?;
        let b = Event::new(5.0, pw, 2)?;
        assert!(a < b);

        // Exact tie resolved by sequence number
        let c = Event::new(5.0, pp, 8)?;
        assert!(a < c);
        Ok(())
    }
}

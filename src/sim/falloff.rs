//! Distance-to-damage falloff curves
//!
//! The curve's domain upper bound doubles as the blast radius: the overlap
//! query volume always uses `max(domain)`, so the trigger radius and the
//! curve can never drift apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One (distance, damage) key on a falloff curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub distance: f32,
    pub damage: f32,
}

/// Reasons a falloff curve is rejected at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveError {
    /// A curve needs at least one key
    Empty,
    /// Distances and damages must be finite
    NonFinite,
    /// Distances and damages must be >= 0
    Negative,
    /// Key distances must be strictly increasing
    UnorderedDistances,
    /// Damage must be non-increasing with distance
    IncreasingDamage,
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveError::Empty => write!(f, "falloff curve has no keys"),
            CurveError::NonFinite => write!(f, "falloff curve key is not finite"),
            CurveError::Negative => write!(f, "falloff curve key is negative"),
            CurveError::UnorderedDistances => {
                write!(f, "falloff curve distances are not strictly increasing")
            }
            CurveError::IncreasingDamage => {
                write!(f, "falloff curve damage increases with distance")
            }
        }
    }
}

impl std::error::Error for CurveError {}

/// Monotonic non-increasing distance -> damage mapping, piecewise linear
/// between keys. Validated at construction (and through serde), so a held
/// curve is always non-empty and monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct FalloffCurve {
    keys: Vec<CurveKey>,
}

impl FalloffCurve {
    pub fn new(keys: Vec<CurveKey>) -> Result<Self, CurveError> {
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for key in &keys {
            if !key.distance.is_finite() || !key.damage.is_finite() {
                return Err(CurveError::NonFinite);
            }
            if key.distance < 0.0 || key.damage < 0.0 {
                return Err(CurveError::Negative);
            }
        }
        for pair in keys.windows(2) {
            if pair[1].distance <= pair[0].distance {
                return Err(CurveError::UnorderedDistances);
            }
            if pair[1].damage > pair[0].damage {
                return Err(CurveError::IncreasingDamage);
            }
        }
        Ok(Self { keys })
    }

    /// Linear ramp from `max_damage` at the origin to zero at `radius`
    pub fn linear(max_damage: f32, radius: f32) -> Result<Self, CurveError> {
        Self::new(vec![
            CurveKey { distance: 0.0, damage: max_damage },
            CurveKey { distance: radius, damage: 0.0 },
        ])
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Upper bound of the curve domain; the blast volume radius by invariant
    #[inline]
    pub fn blast_radius(&self) -> f32 {
        self.keys[self.keys.len() - 1].distance
    }

    /// Damage at `distance`, clamped into the key domain. Distances beyond
    /// the blast radius should not occur (the query volume bounds them) but
    /// clamp anyway.
    pub fn sample(&self, distance: f32) -> f32 {
        let first = self.keys[0];
        if distance <= first.distance {
            return first.damage;
        }
        let last = self.keys[self.keys.len() - 1];
        if distance >= last.distance {
            return last.damage;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if distance <= b.distance {
                let t = (distance - a.distance) / (b.distance - a.distance);
                return a.damage + (b.damage - a.damage) * t;
            }
        }
        last.damage
    }
}

impl TryFrom<Vec<CurveKey>> for FalloffCurve {
    type Error = CurveError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<FalloffCurve> for Vec<CurveKey> {
    fn from(curve: FalloffCurve) -> Self {
        curve.keys
    }
}

//! Weighted selection over the wheel's slices.
//!
//! Angles are in degrees. Angle 0 is the 3 o'clock direction where the
//! pointer sits and slices advance clockwise on screen in list order.
//! Turning the wheel by `θ` rotates it counter-clockwise, which brings the
//! slice containing `θ` under the pointer, so `compute_winner(entries, θ)`
//! is exactly what the pointer shows.

use crate::model::Entry;
use rand::Rng;

pub const FULL_TURN: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub start: f64,
    pub sweep: f64,
}

impl Slice {
    pub fn end(&self) -> f64 {
        self.start + self.sweep
    }

    pub fn mid(&self) -> f64 {
        self.start + self.sweep / 2.0
    }

    pub fn contains(&self, angle: f64) -> bool {
        self.start <= angle && angle < self.end()
    }
}

pub fn total_weight(entries: &[Entry]) -> f64 {
    entries.iter().map(Entry::effective_weight).sum()
}

pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(FULL_TURN);
    // rem_euclid can round up to the modulus for tiny negative inputs
    if a >= FULL_TURN { 0.0 } else { a }
}

/// Contiguous slices in list order, starting at 0. Empty when there is
/// nothing to divide.
pub fn slices(entries: &[Entry]) -> Vec<Slice> {
    let total = total_weight(entries);
    if total <= 0.0 {
        return Vec::new();
    }

    let mut cumulative = 0.0;
    entries
        .iter()
        .map(|entry| {
            let sweep = entry.effective_weight() / total * FULL_TURN;
            let slice = Slice {
                start: cumulative,
                sweep,
            };
            cumulative += sweep;
            slice
        })
        .collect()
}

/// Index of the entry whose slice contains `angle`.
///
/// Rounding can leave a sliver just below 360 uncovered; that sliver belongs
/// to the last entry with a visible slice.
pub fn winner_index(entries: &[Entry], angle: f64) -> Option<usize> {
    let slices = slices(entries);
    let angle = normalize_angle(angle);
    slices
        .iter()
        .position(|s| s.sweep > 0.0 && s.contains(angle))
        .or_else(|| slices.iter().rposition(|s| s.sweep > 0.0))
}

pub fn compute_winner(entries: &[Entry], angle: f64) -> Option<&Entry> {
    winner_index(entries, angle).map(|i| &entries[i])
}

pub fn random_angle<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..FULL_TURN)
}

use rand::rngs::{OsRng, StdRng};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use crate::error::PickError;

/// Picks `count` distinct slots from `1..=population`, in draw order.
/// `count` is capped at `population`.
pub fn pick_slots<R: Rng + ?Sized>(rng: &mut R, count: usize, population: usize) -> Vec<u8> {
    let count = count.min(population);
    index::sample(rng, population, count)
        .into_iter()
        .map(|i| (i + 1) as u8)
        .collect()
}

/// Draws from the triangular distribution over [0, 1] with its mode at 0,
/// so small values are far more likely than large ones
pub fn triangular_low<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u: f64 = rng.gen();
    1.0 - (1.0 - u).sqrt()
}

/// Seeds a generator from the operating system
pub fn entropy_rng() -> Result<StdRng, PickError> {
    Ok(StdRng::from_rng(OsRng)?)
}

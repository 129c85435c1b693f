use rand::Rng;

/// Lower bound of the simulated wear multiplier.
pub const WEAR_MIN: f64 = 0.8;
/// Upper bound of the simulated wear multiplier.
pub const WEAR_MAX: f64 = 1.2;

/// Supplies the wear factor for each prediction call.
///
/// Every prediction draws exactly once; nothing is cached between calls.
pub trait WearSource {
    fn wear_factor(&mut self) -> f64;
}

impl<W: WearSource + ?Sized> WearSource for &mut W {
    fn wear_factor(&mut self) -> f64 {
        (**self).wear_factor()
    }
}

/// Uniform draw from `[WEAR_MIN, WEAR_MAX]` using any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngWear<R> {
    rng: R,
}

impl<R: Rng> RngWear<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngWear<rand::rngs::ThreadRng> {
    /// Unseeded source backed by the thread-local generator.
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl<R: Rng> WearSource for RngWear<R> {
    fn wear_factor(&mut self) -> f64 {
        self.rng.gen_range(WEAR_MIN..=WEAR_MAX)
    }
}

/// Always returns the same factor. Used to reproduce a prediction exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWear(pub f64);

impl WearSource for FixedWear {
    fn wear_factor(&mut self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn rng_wear_stays_in_closed_interval() {
        let mut wear = RngWear::new(StdRng::seed_from_u64(7));
        for _ in 0..10_000 {
            let w = wear.wear_factor();
            assert!((WEAR_MIN..=WEAR_MAX).contains(&w), "wear {w} out of range");
        }
    }

    #[test]
    fn fixed_wear_is_constant() {
        let mut wear = FixedWear(1.1);
        assert_eq!(wear.wear_factor(), 1.1);
        assert_eq!(wear.wear_factor(), 1.1);
    }

    #[test]
    fn mutable_reference_forwards() {
        fn draw(mut wear: impl WearSource) -> f64 {
            wear.wear_factor()
        }
        let mut inner = FixedWear(0.9);
        assert_eq!(draw(&mut inner), 0.9);
    }
}

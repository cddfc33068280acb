use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::info;

use crate::config::Window;

/// Uniform draw from `[min, max)`; a degenerate window returns `min`.
pub fn draw<R: Rng + ?Sized>(rng: &mut R, window: Window) -> u64 {
    if window.max <= window.min {
        return window.min;
    }
    rng.gen_range(window.min..window.max)
}

/// Sleeps a random number of whole seconds drawn from `window`. Returns the
/// number of seconds slept.
pub async fn delay<R: Rng + ?Sized>(rng: &mut R, window: Window, label: &str) -> u64 {
    let seconds = draw(rng, window);
    info!("[{}] Waiting for {} seconds", label, seconds);
    sleep(Duration::from_secs(seconds)).await;
    seconds
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::time::Instant;

    use super::*;

    #[test]
    fn draws_stay_in_half_open_window() {
        let mut rng = StdRng::seed_from_u64(7);
        let window = Window { min: 5, max: 10 };
        for _ in 0..10_000 {
            let value = draw(&mut rng, window);
            assert!((5..10).contains(&value), "{value} outside [5, 10)");
        }
    }

    #[test]
    fn draws_are_roughly_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let window = Window { min: 5, max: 10 };
        let draws = 10_000;
        let mut buckets = [0u64; 5];
        for _ in 0..draws {
            buckets[(draw(&mut rng, window) - 5) as usize] += 1;
        }

        let expected = draws as f64 / buckets.len() as f64;
        let chi_square: f64 = buckets
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();
        // 4 degrees of freedom, p = 0.001
        assert!(chi_square < 18.467, "chi-square {chi_square} for {buckets:?}");
    }

    #[test]
    fn degenerate_window_is_pinned() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(draw(&mut rng, Window { min: 15, max: 15 }), 15);
        assert_eq!(draw(&mut rng, Window { min: 0, max: 0 }), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_for_the_drawn_duration() {
        let mut rng = StdRng::seed_from_u64(3);
        let started = Instant::now();
        let slept = delay(&mut rng, Window { min: 12, max: 36 }, "Block").await;

        assert!((12..36).contains(&slept));
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(slept) && waited < Duration::from_secs(slept + 1));
    }
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::color::BASE_PALETTE;
use crate::models::{ColorMode, Rgb};
use crate::ports::ColorGenerator;

/// Parameters for filling in category colors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSettings {
    /// Seed handed to the distinct color generator
    pub seed: u64,

    /// Pastel shift in 0-1 for generated colors
    pub pastel_factor: f64,

    /// Default fill strategy
    pub mode: ColorMode,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self { seed: 999, pastel_factor: 0.2, mode: ColorMode::Cycle }
    }
}

/// Palette color for a category code, wrapping around the base palette
pub fn cycle_color(code: u32) -> Rgb {
    let hex = BASE_PALETTE[code as usize % BASE_PALETTE.len()];
    Rgb::from_hex(hex).unwrap_or(Rgb::BLACK)
}

/// Greedy max-min color picker over seeded random candidates
///
/// For every requested color, `attempts` random candidates are drawn and the one
/// farthest from all colors taken so far wins. Black and white are always
/// treated as taken.
#[derive(Debug, Clone, Copy)]
pub struct DistinctColorGenerator {
    pub attempts: usize,
}

impl Default for DistinctColorGenerator {
    fn default() -> Self {
        Self { attempts: 1000 }
    }
}

impl DistinctColorGenerator {
    pub fn new(attempts: usize) -> Self {
        Self { attempts: attempts.max(1) }
    }
}

impl ColorGenerator for DistinctColorGenerator {
    fn generate(&self, count: usize, exclude: &[Rgb], seed: u64, pastel_factor: f64) -> Vec<Rgb> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut taken: Vec<Rgb> = vec![Rgb::BLACK, Rgb::WHITE];
        taken.extend_from_slice(exclude);

        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            let mut best = random_color(&mut rng, pastel_factor);
            let mut best_score = min_distance(&best, &taken);

            for _ in 1..self.attempts.max(1) {
                let candidate = random_color(&mut rng, pastel_factor);
                let score = min_distance(&candidate, &taken);
                if score > best_score {
                    best = candidate;
                    best_score = score;
                }
            }

            taken.push(best);
            colors.push(best);
        }

        colors
    }
}

fn random_color(rng: &mut StdRng, pastel_factor: f64) -> Rgb {
    let shift = pastel_factor.clamp(0.0, 1.0);
    Rgb([rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>()]
        .map(|c| (c + shift) / (1.0 + shift)))
}

fn min_distance(color: &Rgb, taken: &[Rgb]) -> f64 {
    taken.iter().map(|other| color.distance(other)).fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle_color(0), cycle_color(10));
        assert_ne!(cycle_color(0), cycle_color(1));
        assert_eq!(cycle_color(3).to_hex(), "#d62728");
    }

    #[test]
    fn test_distinct_is_deterministic() {
        let generator = DistinctColorGenerator::default();
        let a = generator.generate(4, &[], 999, 0.2);
        let b = generator.generate(4, &[], 999, 0.2);
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_distinct_avoids_excluded() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let colors = DistinctColorGenerator::default().generate(2, &[red], 7, 0.0);

        assert_eq!(colors.len(), 2);
        for color in &colors {
            assert_ne!(*color, red);
            assert!(color.distance(&red) > 50.0);
        }
        assert!(colors[0].distance(&colors[1]) > 50.0);
    }

    #[test]
    fn test_pastel_factor_lightens() {
        let colors = DistinctColorGenerator::new(10).generate(5, &[], 1, 1.0);
        for color in colors {
            assert!(color.0.iter().all(|c| *c >= 0.5));
        }
    }

    #[test]
    fn test_zero_colors() {
        assert!(DistinctColorGenerator::default().generate(0, &[], 1, 0.2).is_empty());
    }
}

use crate::models::Rgb;

/// Capability to produce colors that are far apart from each other
pub trait ColorGenerator {
    /// Generate `count` colors, each as distinct as possible from `exclude`
    /// and from one another.
    ///
    /// Must be deterministic for a given `seed`. `pastel_factor` in 0-1 shifts
    /// the candidates toward lighter tones.
    fn generate(&self, count: usize, exclude: &[Rgb], seed: u64, pastel_factor: f64) -> Vec<Rgb>;
}

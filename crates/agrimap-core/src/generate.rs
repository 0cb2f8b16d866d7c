//! Injectable ID, colour and time sources.
//!
//! Every value that would otherwise come from the wall clock or a random
//! number goes through one of these traits so tests can pin it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

pub trait ColorGenerator {
    /// A `#rrggbb` colour.
    fn next_color(&mut self) -> String;
}

pub trait Clock {
    /// Current time as an RFC 3339 string.
    fn now(&self) -> String;
}

/// Produces `{prefix}-1`, `{prefix}-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: 1,
        }
    }

    /// Continue after the highest `{prefix}-N` among `existing`.
    pub fn after<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> Self {
        let dash = format!("{}-", prefix);
        let max = existing
            .into_iter()
            .filter_map(|id| id.strip_prefix(dash.as_str()).and_then(|n| n.parse::<u64>().ok()))
            .max()
            .unwrap_or(0);
        Self {
            prefix: prefix.to_string(),
            next: max + 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Crop colours used by the built-in recommendations, followed by a few
/// more that stay distinguishable on satellite imagery.
pub const PALETTE: &[&str] = &[
    "#F59E0B", "#10B981", "#8B5CF6", "#EF4444", "#3B82F6", "#EC4899", "#14B8A6", "#F97316",
];

/// Cycles through [`PALETTE`].
#[derive(Debug, Clone, Default)]
pub struct PaletteColors {
    index: usize,
}

impl PaletteColors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the cycle at `index` instead of the first colour.
    pub fn starting_at(index: usize) -> Self {
        Self { index }
    }
}

impl ColorGenerator for PaletteColors {
    fn next_color(&mut self) -> String {
        let color = PALETTE[self.index % PALETTE.len()];
        self.index += 1;
        color.to_string()
    }
}

/// Random colours from a seeded RNG; the same seed gives the same sequence.
#[derive(Debug, Clone)]
pub struct SeededColors {
    rng: ChaCha8Rng,
}

impl SeededColors {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ColorGenerator for SeededColors {
    fn next_color(&mut self) -> String {
        let rgb: u32 = self.rng.gen_range(0..=0xFF_FFFF);
        format!("#{:06x}", rgb)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}

/// Lowercase a display name and replace whitespace with `-`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_continue_after_existing() {
        let mut ids = SequentialIds::after("farm", ["farm-2", "farm-10", "other-99", "farm-x"]);
        assert_eq!(ids.next_id(), "farm-11");
        assert_eq!(ids.next_id(), "farm-12");

        let mut fresh = SequentialIds::after("farm", std::iter::empty());
        assert_eq!(fresh.next_id(), "farm-1");
    }

    #[test]
    fn palette_cycles() {
        let mut colors = PaletteColors::new();
        let first: Vec<String> = (0..PALETTE.len()).map(|_| colors.next_color()).collect();
        assert_eq!(first[0], "#F59E0B");
        assert_eq!(colors.next_color(), "#F59E0B");
        assert_eq!(PaletteColors::starting_at(3).next_color(), "#EF4444");
    }

    #[test]
    fn seeded_colors_are_reproducible() {
        let mut a = SeededColors::new(7);
        let mut b = SeededColors::new(7);
        for _ in 0..5 {
            let c = a.next_color();
            assert_eq!(c, b.next_color());
            assert_eq!(c.len(), 7);
            assert!(c.starts_with('#'));
            assert!(c[1..].chars().all(|ch| ch.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn slugify_replaces_whitespace() {
        assert_eq!(slugify("Sorghum (Jowar)"), "sorghum-(jowar)");
        assert_eq!(slugify("Rapeseed & Mustard"), "rapeseed-&-mustard");
    }
}

//! Ship upgrade tables.
//!
//! Balance data consumed by the dispatcher and the tick. Ships currently
//! always operate at tier 0; higher tiers exist for the purchase path.

/// Scanner countdown duration, in ticks, per upgrade tier.
pub const SCANNER_DURATION: [u32; 3] = [3, 2, 1];

/// Radius within which a completed scan reports planets.
pub const SCANNER_RADIUS: f64 = 50.0;

/// The upgrade tier every ship currently operates at.
pub const BASE_TIER: usize = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_higher_tiers_scan_faster() {
        assert!(SCANNER_DURATION.windows(2).all(|w| w[0] >= w[1]));
        assert!(SCANNER_DURATION[BASE_TIER] > 0);
    }
}

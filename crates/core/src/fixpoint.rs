//! Fixed-point conversion of raw on-chain integers to token amounts.
//!
//! Collateral is stored as xtoken shares that must be scaled by an
//! 18-decimal exchange ratio; loans store raw token units. The
//! `shares * ratio` product is carried at full 256-bit width before any
//! division so large positions do not lose precision to stepwise
//! integer division.

use alloy::primitives::U256;

/// Fixed-point scale of the xtoken exchange ratio (1e18).
pub const RATIO_SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000u64, 0, 0, 0]);

/// Pre-computed powers of 10 for fast decimal conversion
const POW10: [u128; 39] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
    10_000_000_000_000_000_000,
    100_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000_000,
    1_000_000_000_000_000_000_000_000_000_000_000_000,
    10_000_000_000_000_000_000_000_000_000_000_000_000,
    100_000_000_000_000_000_000_000_000_000_000_000_000,
];

/// Fast power of 10 lookup (up to 10^38)
#[inline(always)]
pub fn pow10(exp: u8) -> U256 {
    if exp < 39 {
        U256::from(POW10[exp as usize])
    } else {
        U256::from(10u64).pow(U256::from(exp))
    }
}

/// Convert a U256 to f64 by summing limbs.
/// Use only for display-precision amounts, not for further integer math.
#[inline(always)]
pub fn u256_to_f64(value: U256) -> f64 {
    if value <= U256::from(u128::MAX) {
        let v: u128 = value.to();
        return v as f64;
    }
    let limbs = value.as_limbs();
    let base = u64::MAX as f64 + 1.0;
    let mut acc = 0.0f64;
    for &limb in limbs.iter().rev() {
        acc = acc * base + limb as f64;
    }
    acc
}

/// Convert collateral shares to a token amount.
///
/// Formula: `shares * exchange_ratio / 10^18 / 10^decimals`
///
/// The ratio is always 18-decimal fixed point regardless of the token's
/// own decimal count. The full-width product is computed first, then a
/// single division by `10^(18 + decimals)`.
#[inline(always)]
pub fn shares_to_amount(shares: U256, exchange_ratio: U256, decimals: u8) -> f64 {
    if shares.is_zero() || exchange_ratio.is_zero() {
        return 0.0;
    }
    let product = shares * exchange_ratio;
    u256_to_f64(product) / pow10_f64(18 + decimals as u32)
}

/// Convert a raw loan amount to a token amount.
///
/// Formula: `raw / 10^decimals`
#[inline(always)]
pub fn raw_to_amount(raw: U256, decimals: u8) -> f64 {
    if raw.is_zero() {
        return 0.0;
    }
    u256_to_f64(raw) / pow10_f64(decimals as u32)
}

#[inline(always)]
fn pow10_f64(exp: u32) -> f64 {
    10f64.powi(exp as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow10_lookup() {
        assert_eq!(pow10(0), U256::from(1u64));
        assert_eq!(pow10(9), U256::from(1_000_000_000u64));
        assert_eq!(pow10(18), RATIO_SCALE);
    }

    #[test]
    fn test_shares_round_trip() {
        // 500 SUI: shares=500_000_000_000, ratio=1e18, 9 decimals
        let shares = U256::from(500_000_000_000u64);
        let amount = shares_to_amount(shares, RATIO_SCALE, 9);
        assert!((amount - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_shares_with_non_unit_ratio() {
        // ratio 1.05e18 means each share is worth 1.05 underlying tokens
        let shares = U256::from(1_000_000_000u64); // 1.0 at 9 decimals
        let ratio = U256::from(1_050_000_000_000_000_000u64);
        let amount = shares_to_amount(shares, ratio, 9);
        assert!((amount - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_shares_zero() {
        assert_eq!(shares_to_amount(U256::ZERO, RATIO_SCALE, 9), 0.0);
    }

    #[test]
    fn test_shares_monotonic() {
        let ratio = U256::from(1_234_567_890_123_456_789u64);
        let mut prev = 0.0;
        for raw in [1u64, 10, 1_000, 1_000_000, 1_000_000_000_000] {
            let amount = shares_to_amount(U256::from(raw), ratio, 9);
            assert!(amount > prev, "amount must grow with shares");
            assert!(amount >= 0.0);
            prev = amount;
        }
    }

    #[test]
    fn test_shares_product_exceeds_u128() {
        // 1e21 raw shares (1000 tokens at 18 decimals) times 1e18 ratio
        // overflows u128; the U256 product must survive it.
        let shares = pow10(21);
        let amount = shares_to_amount(shares, RATIO_SCALE, 18);
        assert!((amount - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_raw_amount() {
        // 5000 USDC at 6 decimals
        let raw = U256::from(5_000_000_000u64);
        let amount = raw_to_amount(raw, 6);
        assert!((amount - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn test_raw_amount_zero() {
        assert_eq!(raw_to_amount(U256::ZERO, 9), 0.0);
    }

    #[test]
    fn test_u256_to_f64_large() {
        let value = pow10(30); // above u64, below u128
        assert!((u256_to_f64(value) - 1e30).abs() / 1e30 < 1e-12);

        let huge = pow10(45); // above u128
        assert!((u256_to_f64(huge) - 1e45).abs() / 1e45 < 1e-9);
    }
}

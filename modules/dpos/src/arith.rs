//!
//! Integer arithmetic over token amounts. Everything here truncates;
//! monetary dust stays in the engine's escrow rather than being minted.
//!

use crate::types::BASIS_POINTS;
use mp_core::account::Balance;

/// `n * 10^decimals`, the canonical way to lift whole tokens into base
/// units.
pub fn scientific_notation(n: u64, decimals: usize) -> Balance {
    Balance::from(n) * Balance::exp10(decimals)
}

/// `x * numerator_bp / 10000` with truncating division.
pub fn calculate_fraction(numerator_bp: u64, x: Balance) -> Balance {
    x * Balance::from(numerator_bp) / Balance::from(BASIS_POINTS)
}

/// `a - b`, clamped at zero.
pub fn saturating_sub(a: Balance, b: Balance) -> Balance {
    if a > b {
        a - b
    } else {
        Balance::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_notation_scales_whole_tokens() {
        assert_eq!(
            scientific_notation(3, 18),
            Balance::from(3u64) * Balance::from(10u64).pow(18.into())
        );
        assert_eq!(scientific_notation(0, 18), Balance::zero());
    }

    #[test]
    fn fraction_truncates() {
        assert_eq!(
            calculate_fraction(500, Balance::from(10_000u64)),
            Balance::from(500u64)
        );
        // 5% of 19 truncates to 0
        assert_eq!(calculate_fraction(500, Balance::from(19u64)), Balance::zero());
        // a 4x bonus
        assert_eq!(
            calculate_fraction(40_000, Balance::from(25u64)),
            Balance::from(100u64)
        );
    }

    #[test]
    fn saturating_sub_never_underflows() {
        assert_eq!(
            saturating_sub(Balance::from(5u64), Balance::from(3u64)),
            Balance::from(2u64)
        );
        assert_eq!(
            saturating_sub(Balance::from(3u64), Balance::from(5u64)),
            Balance::zero()
        );
    }
}

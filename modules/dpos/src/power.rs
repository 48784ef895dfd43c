//!
//! Post-selection adjustment keeping any single validator below a fixed
//! share of the total voting power.
//!

use crate::types::{Validator, BASIS_POINTS, POWER_CAP_BASIS_POINTS};

/// Effective cap share given the configured crash-fault tolerance:
/// never above `1 - f`, never above the built-in ceiling.
pub fn power_cap_basis_points(crash_fault_tolerance_bp: u64) -> u64 {
    POWER_CAP_BASIS_POINTS.min(BASIS_POINTS.saturating_sub(crash_fault_tolerance_bp))
}

/// Clamp every validator to `cap_bp` of the total power and hand the
/// pooled overflow out equally to the rest, each topped up to the cap at
/// most. A single pass suffices; the remainder of the integer division
/// is left undistributed.
///
/// With three validators or fewer any cap below 1/3 is unsatisfiable,
/// so small sets pass through untouched.
pub fn apply_power_cap(mut validators: Vec<Validator>, cap_bp: u64) -> Vec<Validator> {
    if validators.len() <= 3 {
        return validators;
    }

    let total: u128 = validators.iter().map(|v| v.power as u128).sum();
    if total == 0 {
        return validators;
    }

    let max_power = (total * cap_bp as u128 / BASIS_POINTS as u128) as u64;

    let mut overflow: u64 = 0;
    let mut under_cap: u64 = 0;
    for v in validators.iter_mut() {
        if v.power > max_power {
            overflow += v.power - max_power;
            v.power = max_power;
        } else if v.power < max_power {
            under_cap += 1;
        }
    }

    if overflow > 0 && under_cap > 0 {
        let distribution = overflow / under_cap;
        for v in validators.iter_mut() {
            if v.power < max_power {
                v.power = (v.power + distribution).min(max_power);
            }
        }
    }

    validators
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_CRASH_FAULT_TOLERANCE_BASIS_POINTS;

    fn v(power: u64) -> Validator {
        Validator {
            power,
            ..Default::default()
        }
    }

    fn powers(validators: &[Validator]) -> Vec<u64> {
        validators.iter().map(|v| v.power).collect()
    }

    #[test]
    fn default_tolerance_keeps_builtin_ceiling() {
        assert_eq!(
            power_cap_basis_points(DEFAULT_CRASH_FAULT_TOLERANCE_BASIS_POINTS),
            POWER_CAP_BASIS_POINTS
        );
        // a stricter tolerance tightens the cap
        assert_eq!(power_cap_basis_points(8_000), 2_000);
    }

    #[test]
    fn power_cap_redistribution() {
        let cases: Vec<(Vec<u64>, Vec<u64>)> = vec![
            (vec![10], vec![10]),
            (vec![10, 1], vec![10, 1]),
            (vec![30, 30, 30, 30], vec![30, 30, 30, 30]),
            (vec![33, 30, 22, 22], vec![29, 29, 24, 24]),
            (vec![100, 20, 5, 5, 5], vec![37, 35, 20, 20, 20]),
            (
                vec![150, 100, 77, 15, 15, 10],
                vec![102, 102, 86, 24, 24, 19],
            ),
        ];
        for (input, expected) in cases.into_iter() {
            let out = apply_power_cap(
                input.into_iter().map(v).collect(),
                POWER_CAP_BASIS_POINTS,
            );
            assert_eq!(powers(&out), expected);
        }
    }

    #[test]
    fn capped_set_respects_fault_tolerance_bound() {
        let out = apply_power_cap(
            vec![v(1000), v(1), v(1), v(1), v(1)],
            POWER_CAP_BASIS_POINTS,
        );
        let total: u128 = out.iter().map(|v| v.power as u128).sum();
        let max = out.iter().map(|v| v.power).max().unwrap() as u128;
        // no single validator may reach 1 - f of the adjusted total
        let bound = total
            * (BASIS_POINTS - DEFAULT_CRASH_FAULT_TOLERANCE_BASIS_POINTS) as u128
            / BASIS_POINTS as u128;
        assert!(max <= bound);
    }
}

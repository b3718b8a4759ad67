use alloy::primitives::{U256, U512};

/// Computes `x * q / d` rounding down.
///
/// Returns `None` if `d` is `0` or if the result overflows a 256-bit integer.
pub fn mul_ratio(x: U256, q: U256, d: U256) -> Option<U256> {
    if d.is_zero() {
        return None;
    }

    // fast path when math in U256 doesn't overflow
    if let Some(res) = x.checked_mul(q) {
        return Some(res / d);
    }

    let div = (U512::from(x) * U512::from(q)) / U512::from(d);

    let limbs = div.into_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }

    Some(U256::from_limbs_slice(&limbs[..4]))
}

/// Amount of the `target` side corresponding to `numerator` out of
/// `denominator`, rounded down.
///
/// Callers guarantee `numerator <= denominator`, so the result never exceeds
/// `target` and the 512-bit intermediate never overflows the output. A zero
/// denominator yields zero.
pub fn partial_amount_floor(numerator: U256, denominator: U256, target: U256) -> U256 {
    mul_ratio(numerator, target, denominator).unwrap_or_default()
}

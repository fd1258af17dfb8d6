use std::cmp::Ordering;

use serde_json::Number;

/// Relative tolerance for `multipleOf` over non-integral operands.
pub const MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Bounds are kept as the original `Number`s so they emit back unchanged.
#[derive(Debug, Clone, Default)]
pub struct NumberConstraints {
    /// Declared as `type: integer`.
    pub integer: bool,
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<Number>,
    pub exclusive_maximum: Option<Number>,
    pub multiple_of: Option<Number>,
}

pub fn to_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn as_i128(n: &Number) -> Option<i128> {
    n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from))
}

/// Exact when both sides are integers, `f64` otherwise. `None` only for NaN.
pub fn compare(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_i128(a), as_i128(b)) {
        (Some(a), Some(b)) => Some(a.cmp(&b)),
        _ => to_f64(a).partial_cmp(&to_f64(b)),
    }
}

pub fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Exact for integer operands, tolerance-based otherwise.
pub fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    if let (Some(a), Some(b)) = (value.as_i64(), divisor.as_i64()) {
        return b != 0 && a % b == 0;
    }
    if let (Some(a), Some(b)) = (value.as_u64(), divisor.as_u64()) {
        return b != 0 && a % b == 0;
    }
    let q = to_f64(value) / to_f64(divisor);
    if !q.is_finite() {
        return false;
    }
    (q - q.round()).abs() <= MULTIPLE_OF_EPSILON * q.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn n(v: serde_json::Value) -> Number {
        match v {
            serde_json::Value::Number(n) => n,
            other => panic!("not a number: {other}"),
        }
    }

    #[test]
    fn integer_multiples_are_exact() {
        assert!(is_multiple_of(&n(json!(10)), &n(json!(5))));
        assert!(!is_multiple_of(&n(json!(10)), &n(json!(3))));
        assert!(is_multiple_of(&n(json!(-9)), &n(json!(3))));
        assert!(is_multiple_of(&n(json!(u64::MAX)), &n(json!(5))));
    }

    #[test]
    fn float_multiples_tolerate_rounding() {
        assert!(is_multiple_of(&n(json!(0.3)), &n(json!(0.1))));
        assert!(is_multiple_of(&n(json!(4.5)), &n(json!(1.5))));
        assert!(is_multiple_of(&n(json!(10)), &n(json!(2.5))));
        assert!(!is_multiple_of(&n(json!(0.35)), &n(json!(0.1))));
    }

    #[test]
    fn large_integers_compare_exactly() {
        let below = n(json!(9007199254740992u64));
        let above = n(json!(9007199254740993u64));
        assert_eq!(to_f64(&below), to_f64(&above));
        assert_eq!(compare(&below, &above), Some(Ordering::Less));
        assert_eq!(compare(&n(json!(-1)), &n(json!(u64::MAX))), Some(Ordering::Less));
        assert_eq!(compare(&n(json!(2.5)), &n(json!(2))), Some(Ordering::Greater));
        assert_eq!(compare(&n(json!(3.0)), &n(json!(3))), Some(Ordering::Equal));
    }

    #[test]
    fn integrality() {
        assert!(is_integral(&n(json!(3))));
        assert!(is_integral(&n(json!(3.0))));
        assert!(!is_integral(&n(json!(3.5))));
    }
}

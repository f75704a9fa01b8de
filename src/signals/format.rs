//! Number formatting for card context strings.

/// Every finite `f64` has a terminating decimal expansion with at most this
/// many fractional digits.
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Format `value` with `digits` decimals, rounding half away from zero.
///
/// Rounding works on the exact decimal value of `value`, so `8.35` (stored as
/// `8.3499…`) gives `8.3`. Only true midpoints such as `6.25` round away from
/// zero; `format!("{:.1}", 6.25)` alone would give `6.2`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let magnitude = value.abs();
    let rounded = if is_midpoint(magnitude, digits) {
        format!("{:.*}", digits, magnitude + 0.25 * 10f64.powi(-(digits as i32)))
    } else {
        format!("{:.*}", digits, magnitude)
    };
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, rounded)
}

/// Whether the exact expansion of `magnitude` is `5` followed only by zeros
/// after the first `digits` decimals.
fn is_midpoint(magnitude: f64, digits: usize) -> bool {
    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, magnitude);
    let Some((_, fraction)) = exact.split_once('.') else {
        return false;
    };
    match fraction.get(digits..) {
        Some(tail) => tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0'),
        None => false,
    }
}

/// Sign-prefixed percentage with one decimal: `+6.3%`, `-1.0%`, `+0.0%`.
pub fn format_delta(change: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{}{}%", sign, to_fixed(change, 1))
}

/// Compact dollar amount: `$1.4B` at or above a billion, whole millions below.
pub fn format_tvl(usd: f64) -> String {
    if usd >= 1e9 {
        format!("${}B", to_fixed(usd / 1e9, 1))
    } else {
        format!("${}M", to_fixed(usd / 1e6, 0))
    }
}

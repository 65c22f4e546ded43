//! Unit conversion between integer subunits and decimal display amounts.
//!
//! The ledger only knows integer subunits; `decimals` gives the scale
//! (8 decimals: 150_000_000 subunits = 1.5 display units). Subunits stay in
//! `u64` end to end — floating point appears only on the display side.

use crate::error::{AssetError, Result};

/// Largest supported `decimals`: 10^19 still fits in a u64.
const MAX_DECIMALS: u8 = 19;

fn pow10(decimals: u8) -> Result<u64> {
    if decimals > MAX_DECIMALS {
        return Err(AssetError::InvalidAmount(format!(
            "Unsupported decimals {decimals}: must be <= {MAX_DECIMALS}"
        )));
    }
    Ok(10u64.pow(decimals as u32))
}

/// Convert integer subunits to a display amount.
#[must_use]
pub fn to_display(subunits: u64, decimals: u8) -> f64 {
    subunits as f64 / 10f64.powi(decimals as i32)
}

/// Convert a display amount to integer subunits, rounding to the nearest
/// subunit. Rejects non-finite and non-positive amounts — zero or negative
/// transfers never reach the chain.
pub fn to_subunits(display: f64, decimals: u8) -> Result<u64> {
    if !display.is_finite() {
        return Err(AssetError::InvalidAmount(format!(
            "Amount must be a finite number, got {display}"
        )));
    }
    if display <= 0.0 {
        return Err(AssetError::InvalidAmount(format!(
            "Amount must be positive, got {display}"
        )));
    }
    let scaled = (display * 10f64.powi(decimals as i32)).round();
    if scaled > u64::MAX as f64 {
        return Err(AssetError::InvalidAmount("Amount too large".into()));
    }
    Ok(scaled as u64)
}

/// Split a user-entered amount into its whole part and fractional digits,
/// rejecting anything outside the plain `digits[.digits]` grammar (no sign,
/// no exponent) and the all-zero amount.
fn split_amount(input: &str) -> Result<(u64, &str)> {
    let input = input.trim();

    if input.is_empty() {
        return Err(AssetError::InvalidAmount("Amount cannot be empty".into()));
    }
    if input.starts_with('-') || input.starts_with('+') {
        return Err(AssetError::InvalidAmount(
            "Amount must be a plain positive number".into(),
        ));
    }

    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() > 2 {
        return Err(AssetError::InvalidAmount(format!(
            "Invalid amount '{input}'. Use a decimal like '1.5'."
        )));
    }

    let whole: u64 = parts[0]
        .parse()
        .map_err(|_| AssetError::InvalidAmount(format!("Invalid whole part: '{}'", parts[0])))?;

    let frac = if parts.len() == 2 { parts[1] } else { "" };
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(AssetError::InvalidAmount(format!(
            "Invalid fractional part: '{frac}'"
        )));
    }

    if whole == 0 && frac.chars().all(|c| c == '0') {
        return Err(AssetError::InvalidAmount("Amount must be positive".into()));
    }
    Ok((whole, frac))
}

/// Check the amount grammar without scaling to any particular precision.
/// The precision check against an asset's decimals happens in
/// [`parse_amount`]; this is for rejecting malformed input at entry time,
/// before the target asset is known.
pub fn validate_amount(input: &str) -> Result<()> {
    split_amount(input).map(|_| ())
}

/// Parse a user-entered decimal amount string into subunits with exact
/// integer arithmetic (no float on this path).
/// Accepts: "1.5" (8 decimals) -> 150_000_000, "1" -> 100_000_000, "1." -> 100_000_000
pub fn parse_amount(input: &str, decimals: u8) -> Result<u64> {
    let factor = pow10(decimals)?;
    let (whole, frac_str) = split_amount(input)?;

    let frac_subunits = if frac_str.is_empty() {
        0
    } else {
        if frac_str.len() > decimals as usize {
            return Err(AssetError::InvalidAmount(format!(
                "Too many decimal places. This asset supports up to {decimals}."
            )));
        }
        // Pad to `decimals` digits so "5" with 8 decimals reads as 0.5
        let padded = format!("{:0<width$}", frac_str, width = decimals as usize);
        padded
            .parse::<u64>()
            .map_err(|_| AssetError::InvalidAmount(format!("Invalid fractional part: '{frac_str}'")))?
    };

    whole
        .checked_mul(factor)
        .and_then(|w| w.checked_add(frac_subunits))
        .ok_or_else(|| AssetError::InvalidAmount("Amount too large".into()))
}

/// Format subunits as an exact decimal string, zero-padded to the asset's
/// precision. Examples with 8 decimals: 150_000_000 -> "1.50000000".
#[must_use]
pub fn format_subunits(subunits: u64, decimals: u8) -> String {
    if decimals == 0 || decimals > MAX_DECIMALS {
        return subunits.to_string();
    }
    let factor = 10u64.pow(decimals as u32);
    let whole = subunits / factor;
    let frac = subunits % factor;
    format!("{whole}.{frac:0width$}", width = decimals as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trip_within_one_subunit() {
        for decimals in [0u8, 2, 6, 8, 9] {
            for subunits in [0u64, 1, 7, 1_000, 150_000_000, 987_654_321] {
                if subunits == 0 {
                    continue; // to_subunits rejects 0 by contract
                }
                let display = to_display(subunits, decimals);
                let back = to_subunits(display, decimals).unwrap();
                assert!(
                    back.abs_diff(subunits) <= 1,
                    "round trip {subunits} @ {decimals} decimals gave {back}"
                );
            }
        }
    }

    #[test]
    fn known_vectors_eight_decimals() {
        assert_eq!(to_display(150_000_000, 8), 1.5);
        assert_eq!(to_subunits(1.5, 8).unwrap(), 150_000_000);
    }

    #[test]
    fn zero_decimals_is_identity() {
        assert_eq!(to_display(42, 0), 42.0);
        assert_eq!(to_subunits(42.0, 0).unwrap(), 42);
    }

    #[test]
    fn rejects_non_positive_display() {
        for decimals in [0u8, 1, 8] {
            for bad in [0.0, -1.5, f64::NAN, f64::INFINITY] {
                let err = to_subunits(bad, decimals);
                assert!(
                    matches!(err, Err(AssetError::InvalidAmount(_))),
                    "{bad} @ {decimals} should be InvalidAmount"
                );
            }
        }
    }

    #[test]
    fn parse_exact_amounts() {
        assert_eq!(parse_amount("1.5", 8).unwrap(), 150_000_000);
        assert_eq!(parse_amount("1", 8).unwrap(), 100_000_000);
        assert_eq!(parse_amount("1.", 8).unwrap(), 100_000_000);
        assert_eq!(parse_amount("0.00000001", 8).unwrap(), 1);
        assert_eq!(parse_amount("3", 0).unwrap(), 3);
        assert_eq!(parse_amount(" 2.25 ", 2).unwrap(), 225);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in ["", "-1", "+1", "1.2.3", "abc", "1.5x"] {
            assert!(
                matches!(parse_amount(bad, 8), Err(AssetError::InvalidAmount(_))),
                "'{bad}' should be rejected"
            );
        }
        // more fractional digits than the asset supports
        assert!(parse_amount("0.123", 2).is_err());
        // zero is not a valid action amount
        assert!(parse_amount("0", 8).is_err());
        assert!(parse_amount("0.0", 8).is_err());
        // fractional input on a zero-decimal asset
        assert!(parse_amount("1.5", 0).is_err());
    }

    #[test]
    fn validate_matches_parse_grammar() {
        for good in ["1", "1.5", "1.", "0.00000001", " 2.25 ", "0.123456789"] {
            assert!(validate_amount(good).is_ok(), "'{good}' should pass");
        }
        for bad in ["", "-1", "+1", "1.2.3", "abc", "1.5x", "1e5", "0", "0.0", "0.000"] {
            assert!(
                matches!(validate_amount(bad), Err(AssetError::InvalidAmount(_))),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn format_pads_fractional_digits() {
        assert_eq!(format_subunits(150_000_000, 8), "1.50000000");
        assert_eq!(format_subunits(0, 8), "0.00000000");
        assert_eq!(format_subunits(1, 8), "0.00000001");
        assert_eq!(format_subunits(42, 0), "42");
    }
}

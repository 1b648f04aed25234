//! Native currency units.
//!
//! Balances and gas prices are integer wei; 1 ether is 10^18 wei.

use crate::error::ParseError;

/// Amount in wei.
pub type Wei = u128;

pub const GWEI: Wei = 1_000_000_000;
pub const ETHER: Wei = 1_000_000_000_000_000_000;

const ETHER_DECIMALS: usize = 18;

/// Parse a decimal ether amount (`"0.01"`, `"1000"`) into wei.
pub fn parse_ether(s: &str) -> Result<Wei, ParseError> {
    let s = s.trim();
    let invalid = || ParseError::InvalidAmount(s.to_string());

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > ETHER_DECIMALS
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole_wei = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<Wei>()
            .map_err(|_| invalid())?
            .checked_mul(ETHER)
            .ok_or_else(invalid)?
    };
    let frac_wei = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = ETHER_DECIMALS);
        padded.parse::<Wei>().map_err(|_| invalid())?
    };

    whole_wei.checked_add(frac_wei).ok_or_else(invalid)
}

/// Render wei as a decimal ether string, keeping at least one fractional
/// digit (`1000.0`, `0.01`).
pub fn format_ether(wei: Wei) -> String {
    let whole = wei / ETHER;
    let frac = wei % ETHER;
    let frac_str = format!("{frac:0>width$}", width = ETHER_DECIMALS);
    let trimmed = frac_str.trim_end_matches('0');
    if trimmed.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{trimmed}")
    }
}

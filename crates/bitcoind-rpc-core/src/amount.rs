//! Fixed-scale decimal amounts.
//!
//! Daemons report coin values as JSON numbers. Routing those through `f64`
//! loses exactness, so every amount in this crate is an integer count of
//! `10^-scale` units, parsed from and printed to decimal text.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// Default number of fractional digits (satoshi precision).
pub const DEFAULT_SCALE: u32 = 8;

/// Largest supported scale. `10^18` leaves ample integer headroom in `i128`.
pub const MAX_SCALE: u32 = 18;

/// Scale at which fee rates are expressed (satoshis).
pub const SATOSHI_SCALE: u32 = 8;

// Exponents beyond this are rejected rather than expanded.
const MAX_EXPONENT: i64 = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("invalid amount `{0}`")]
    InvalidFormat(String),

    #[error("scale {0} exceeds maximum of {MAX_SCALE}")]
    ScaleTooLarge(u32),

    #[error("amount `{0}` is out of range")]
    Overflow(String),
}

/// A signed decimal amount with a fixed number of fractional digits.
///
/// Comparison and equality are by value, so `1.5` at scale 2 equals `1.50000000`
/// at scale 8.
#[derive(Debug, Clone, Copy)]
pub struct Amount {
    units: i128,
    scale: u32,
}

impl Amount {
    pub fn zero(scale: u32) -> Self {
        Self { units: 0, scale }
    }

    /// Build from a raw unit count, e.g. satoshis at scale 8.
    pub fn from_units(units: i128, scale: u32) -> Self {
        Self { units, scale }
    }

    /// Satoshis converted to an amount at `scale`.
    pub fn from_sats(sats: u64, scale: u32) -> Option<Self> {
        Self::from_units(i128::from(sats), SATOSHI_SCALE).rescale(scale)
    }

    /// Parse decimal text, accepting an optional sign and an `e`/`E` exponent.
    ///
    /// Digits beyond `scale` are truncated toward zero.
    pub fn parse(input: &str, scale: u32) -> Result<Self, AmountError> {
        if scale > MAX_SCALE {
            return Err(AmountError::ScaleTooLarge(scale));
        }

        let text = input.trim();
        if text.is_empty() {
            return Err(AmountError::Empty);
        }
        let invalid = || AmountError::InvalidFormat(input.to_owned());

        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exponent: i64 = body[pos + 1..].parse().map_err(|_| invalid())?;
                if exponent.abs() > MAX_EXPONENT {
                    return Err(invalid());
                }
                (&body[..pos], exponent)
            }
            None => (body, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) if !frac_part.is_empty() => (int_part, frac_part),
            Some(_) => return Err(invalid()),
            None => (mantissa, ""),
        };
        if int_part.is_empty()
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        // value = digits * 10^(exponent - frac_len); in units that is
        // digits * 10^(scale + exponent - frac_len).
        let digits = format!("{int_part}{frac_part}");
        let mut shift = i64::from(scale) + exponent - frac_part.len() as i64;
        let mut digits = digits.trim_start_matches('0');
        if shift < 0 {
            let drop = usize::try_from(-shift).unwrap_or(usize::MAX).min(digits.len());
            digits = &digits[..digits.len() - drop];
            shift += drop as i64;
        }

        let overflow = || AmountError::Overflow(input.to_owned());
        let mut units: i128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| overflow())?
        };
        if shift < 0 {
            // every significant digit was below the scale
            units = 0;
        } else if units != 0 {
            let exp = u32::try_from(shift).map_err(|_| overflow())?;
            let factor = pow10(exp).ok_or_else(overflow)?;
            units = units.checked_mul(factor).ok_or_else(overflow)?;
        }

        Ok(Self {
            units: if negative { -units } else { units },
            scale,
        })
    }

    /// Parse a daemon JSON value (number or string) as a non-negative amount.
    ///
    /// Numbers are read from their exact textual form, never through `f64`.
    pub fn from_json(value: &serde_json::Value, scale: u32) -> Option<Self> {
        let text = match value {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.clone(),
            _ => return None,
        };
        Self::parse(&text, scale)
            .ok()
            .filter(|amount| !amount.is_negative())
    }

    pub fn units(&self) -> i128 {
        self.units
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0
    }

    pub fn is_positive(&self) -> bool {
        self.units > 0
    }

    pub fn is_negative(&self) -> bool {
        self.units < 0
    }

    /// Convert to another scale. Narrowing truncates toward zero; widening
    /// returns `None` on overflow.
    pub fn rescale(self, scale: u32) -> Option<Self> {
        match scale.cmp(&self.scale) {
            Ordering::Equal => Some(self),
            Ordering::Greater => {
                let factor = pow10(scale - self.scale)?;
                Some(Self {
                    units: self.units.checked_mul(factor)?,
                    scale,
                })
            }
            Ordering::Less => {
                let factor = pow10(self.scale - scale)?;
                Some(Self {
                    units: self.units / factor,
                    scale,
                })
            }
        }
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        let (a, b) = align(self, other)?;
        Some(Self {
            units: a.units.checked_add(b.units)?,
            scale: a.scale,
        })
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let (a, b) = align(self, other)?;
        Some(Self {
            units: a.units.checked_sub(b.units)?,
            scale: a.scale,
        })
    }
}

/// Normalize a daemon amount to a fixed-scale decimal string.
///
/// Returns `None` when the value is not a valid non-negative amount.
pub fn amount_as_string(value: &serde_json::Value, scale: u32) -> Option<String> {
    Amount::from_json(value, scale).map(|amount| amount.to_string())
}

fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

fn align(a: Amount, b: Amount) -> Option<(Amount, Amount)> {
    let scale = a.scale.max(b.scale);
    Some((a.rescale(scale)?, b.rescale(scale)?))
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        match align(*self, *other) {
            Some((a, b)) => a.units.cmp(&b.units),
            // only reachable for magnitudes near i128::MAX
            None => self.units.signum().cmp(&other.units.signum()),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let abs = self.units.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{sign}{abs}");
        }
        let Some(factor) = 10u128.checked_pow(self.scale) else {
            return write!(f, "{sign}{abs}e-{}", self.scale);
        };
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / factor,
            abs % factor,
            width = self.scale as usize
        )
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

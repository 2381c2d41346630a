//! Parsing of configuration-style value notations.

#[derive(Debug, thiserror::Error)]
#[error("invalid byte shorthand: {0:?}")]
pub struct ByteShorthandError(pub String);

/// Parse a byte-size shorthand like `"8M"`, `"12KB"` or `"123"` into a
/// byte count. Multipliers are binary (K = 1024); a trailing `B` after
/// the multiplier is accepted; fractional prefixes (`"1.5M"`) are
/// floored.
pub fn parse_byte_shorthand(notation: &str) -> Result<u64, ByteShorthandError> {
    let err = || ByteShorthandError(notation.to_owned());
    let s = notation.trim();
    if s.is_empty() {
        return Err(err());
    }

    // plain numeric passthrough
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }

    let mut body = s;
    if let Some(stripped) = body.strip_suffix(['b', 'B']) {
        body = stripped;
    }
    let (prefix, multiplier) = match body.chars().last() {
        Some('k') | Some('K') => (&body[..body.len() - 1], 1u64 << 10),
        Some('m') | Some('M') => (&body[..body.len() - 1], 1u64 << 20),
        Some('g') | Some('G') => (&body[..body.len() - 1], 1u64 << 30),
        _ => return Err(err()),
    };

    let value: f64 = prefix.trim().parse().map_err(|_| err())?;
    if !value.is_finite() || value < 0.0 {
        return Err(err());
    }
    Ok((value * multiplier as f64) as u64)
}

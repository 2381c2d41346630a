//! Masking of account identifiers for display.

/// Mask an IBAN with the usual display defaults: 14 masked characters
/// starting after the first 4, grouped into blocks of 4.
pub fn mask_iban_default(iban: &str) -> String {
    mask_iban(iban, true, 4, 14, 4)
}

/// Mask an IBAN.
///
/// The input is uppercased and stripped of spaces, then `mask_length`
/// characters starting at `mask_offset` are overwritten with `*`
/// (clamped to the string). With `grouping` the result is split into
/// space-separated blocks of `block_size` characters.
pub fn mask_iban(
    iban: &str,
    grouping: bool,
    block_size: usize,
    mask_length: usize,
    mask_offset: usize,
) -> String {
    let mut chars: Vec<char> = iban
        .chars()
        .filter(|c| *c != ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if mask_length > 0 && mask_offset < chars.len() {
        let end = (mask_offset + mask_length).min(chars.len());
        for c in &mut chars[mask_offset..end] {
            *c = '*';
        }
    }

    if grouping && block_size > 0 {
        let mut grouped = String::with_capacity(chars.len() + chars.len() / block_size);
        for (i, c) in chars.iter().enumerate() {
            if i > 0 && i % block_size == 0 {
                grouped.push(' ');
            }
            grouped.push(*c);
        }
        grouped
    } else {
        chars.into_iter().collect()
    }
}

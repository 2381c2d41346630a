//! Secure random strings and passwords.
//!
//! Everything here draws from an injected CSPRNG (`RngCore + CryptoRng`)
//! and maps its raw output onto alphabets via rejection sampling, so the
//! symbol distribution stays uniform regardless of the alphabet size.
//! A failing random source is surfaced as an error; there is no fallback
//! to anything weaker.

use rand::{CryptoRng, RngCore};

/// The 62-symbol alphabet used by [`random_token`].
pub const TOKEN_ALPHABET: &[u8] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Passwords shorter than this are padded up to it.
pub const PASSWORD_MIN_LENGTH: usize = 4;

// Password alphabets leave out visually ambiguous glyphs (0/1, I/O, i/l/o).
const PASSWORD_DIGITS: &[u8] = b"23456789";
const PASSWORD_UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const PASSWORD_LOWER: &[u8] = b"abcdefghjkmnpqrstuvwxyz";

/// Give up if this many batches in a row yield no accepted symbol. With a
/// valid alphabet the acceptance probability per byte is above 1/2, so
/// hitting the cap means the source is not producing usable randomness.
const STALL_BATCH_LIMIT: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum RandomError {
    #[error("alphabet size {size} is outside the supported range [2, 256]")]
    InvalidAlphabet { size: usize },
    #[error("the secure random source is unavailable: {0}")]
    SourceUnavailable(#[source] rand::Error),
    #[error("the secure random source produced no accepted draws in {batches} batches")]
    SourceStalled { batches: usize },
}

/// Draw `count` symbols uniformly from `alphabet`, without modulo bias.
///
/// Raw bytes at or above the largest multiple of the alphabet size are
/// rejected and redrawn, so every symbol has probability exactly
/// `1 / alphabet.len()`. The alphabet must hold between 2 and 256 symbols.
pub fn sample_symbols<R>(rng: &mut R, alphabet: &[u8], count: usize) -> Result<Vec<u8>, RandomError>
where
    R: RngCore + CryptoRng,
{
    let n = alphabet.len();
    if !(2..=256).contains(&n) {
        return Err(RandomError::InvalidAlphabet { size: n });
    }

    let mut out = Vec::with_capacity(count);
    if count == 0 {
        return Ok(out);
    }

    // Largest multiple of n that fits the byte range. u16 because n = 256
    // makes this 256 (every byte accepted).
    let threshold = (256 / n as u16) * n as u16;

    let mut batch = vec![0u8; count.max(16)];
    let mut stalled = 0;
    while out.len() < count {
        rng.try_fill_bytes(&mut batch)
            .map_err(RandomError::SourceUnavailable)?;
        let accepted_before = out.len();
        for &b in &batch {
            if u16::from(b) >= threshold {
                continue;
            }
            out.push(alphabet[b as usize % n]);
            if out.len() == count {
                break;
            }
        }
        if out.len() == accepted_before {
            stalled += 1;
            if stalled >= STALL_BATCH_LIMIT {
                return Err(RandomError::SourceStalled { batches: stalled });
            }
        } else {
            stalled = 0;
        }
    }
    Ok(out)
}

/// Draw a uniform integer from the inclusive range `[low, high]`.
///
/// Rejection sampling over a 32-bit draw; values outside the largest
/// multiple of the span are redrawn so no residue class is favored.
///
/// # Panics
///
/// Panics if `low > high`, like `Rng::gen_range` on an empty range.
pub fn uniform_int<R>(rng: &mut R, low: u32, high: u32) -> Result<u32, RandomError>
where
    R: RngCore + CryptoRng,
{
    assert!(low <= high, "uniform_int requires low <= high ({low} > {high})");
    let span = u64::from(high - low) + 1;
    if span == 1 {
        return Ok(low);
    }
    let zone = (1u64 << 32) - ((1u64 << 32) % span);

    let mut buf = [0u8; 4];
    for _ in 0..STALL_BATCH_LIMIT {
        rng.try_fill_bytes(&mut buf)
            .map_err(RandomError::SourceUnavailable)?;
        let v = u64::from(u32::from_le_bytes(buf));
        if v < zone {
            return Ok(low + (v % span) as u32);
        }
    }
    Err(RandomError::SourceStalled {
        batches: STALL_BATCH_LIMIT,
    })
}

/// Fisher-Yates shuffle driven by [`uniform_int`].
///
/// Walks from the last element down to the second, swapping each with a
/// uniformly chosen earlier-or-equal position, which yields a uniformly
/// random permutation.
pub fn secure_shuffle<R>(rng: &mut R, items: &mut [u8]) -> Result<(), RandomError>
where
    R: RngCore + CryptoRng,
{
    for i in (1..items.len()).rev() {
        let j = uniform_int(rng, 0, i as u32)? as usize;
        items.swap(i, j);
    }
    Ok(())
}

/// Generate an alphanumeric token of exactly `length` characters.
///
/// Each character is independently uniform over [`TOKEN_ALPHABET`].
/// A zero length yields an empty string.
pub fn random_token<R>(rng: &mut R, length: usize) -> Result<String, RandomError>
where
    R: RngCore + CryptoRng,
{
    let symbols = sample_symbols(rng, TOKEN_ALPHABET, length)?;
    Ok(symbols.into_iter().map(char::from).collect())
}

/// Generate a password with guaranteed character-class coverage.
///
/// `length` is clamped to [`PASSWORD_MIN_LENGTH`]. The password always
/// contains 1-2 digits and 1-2 uppercase letters, with the remainder
/// lowercase, and the final arrangement is a secure uniform shuffle of
/// those runs. The class counts are deliberately constrained (a
/// readability trade-off), so entropy is slightly below a free draw over
/// the combined alphabet.
pub fn random_password<R>(rng: &mut R, length: usize) -> Result<String, RandomError>
where
    R: RngCore + CryptoRng,
{
    let length = length.max(PASSWORD_MIN_LENGTH);

    let digit_count = uniform_int(rng, 1, 2)? as usize;
    let upper_count = uniform_int(rng, 1, 2)? as usize;
    let lower_count = length - digit_count - upper_count;

    let mut out = Vec::with_capacity(length);
    out.extend(sample_symbols(rng, PASSWORD_DIGITS, digit_count)?);
    out.extend(sample_symbols(rng, PASSWORD_UPPER, upper_count)?);
    out.extend(sample_symbols(rng, PASSWORD_LOWER, lower_count)?);

    secure_shuffle(rng, &mut out)?;
    Ok(out.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed byte script, then fails. `CryptoRng` is asserted
    /// for test purposes only.
    struct ScriptedRng {
        script: Vec<u8>,
        pos: usize,
    }

    impl ScriptedRng {
        fn new(script: Vec<u8>) -> Self {
            ScriptedRng { script, pos: 0 }
        }

        /// Script one little-endian u32 per uniform_int draw. Small values
        /// are always inside the acceptance zone.
        fn from_u32_draws(draws: &[u32]) -> Self {
            let mut script = Vec::with_capacity(draws.len() * 4);
            for d in draws {
                script.extend_from_slice(&d.to_le_bytes());
            }
            ScriptedRng::new(script)
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.try_fill_bytes(dest).unwrap()
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            if self.pos + dest.len() > self.script.len() {
                return Err(rand::Error::new("script exhausted"));
            }
            dest.copy_from_slice(&self.script[self.pos..self.pos + dest.len()]);
            self.pos += dest.len();
            Ok(())
        }
    }

    impl CryptoRng for ScriptedRng {}

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            panic!("infallible path should not be used")
        }

        fn next_u64(&mut self) -> u64 {
            panic!("infallible path should not be used")
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {
            panic!("infallible path should not be used")
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source down"))
        }
    }

    impl CryptoRng for FailingRng {}

    /// A source that only ever produces 0xff, which every alphabet with
    /// a rejection threshold discards.
    struct SaturatedRng;

    impl RngCore for SaturatedRng {
        fn next_u32(&mut self) -> u32 {
            u32::MAX
        }

        fn next_u64(&mut self) -> u64 {
            u64::MAX
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0xff);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0xff);
            Ok(())
        }
    }

    impl CryptoRng for SaturatedRng {}

    #[test]
    fn sample_symbols_exact_count_and_membership() {
        let mut rng = rand::thread_rng();
        for &alphabet in &[TOKEN_ALPHABET, PASSWORD_DIGITS, PASSWORD_UPPER, PASSWORD_LOWER] {
            for &count in &[0usize, 1, 7, 16, 64, 1000] {
                let symbols = sample_symbols(&mut rng, alphabet, count).unwrap();
                assert_eq!(symbols.len(), count);
                assert!(symbols.iter().all(|s| alphabet.contains(s)));
            }
        }
    }

    #[test]
    fn sample_symbols_rejects_bad_alphabet_sizes() {
        let mut rng = rand::thread_rng();
        assert!(matches!(
            sample_symbols(&mut rng, b"", 4),
            Err(RandomError::InvalidAlphabet { size: 0 })
        ));
        assert!(matches!(
            sample_symbols(&mut rng, b"x", 4),
            Err(RandomError::InvalidAlphabet { size: 1 })
        ));
        let oversized = vec![b'a'; 257];
        assert!(matches!(
            sample_symbols(&mut rng, &oversized, 4),
            Err(RandomError::InvalidAlphabet { size: 257 })
        ));
    }

    #[test]
    fn bytes_at_or_above_threshold_are_rejected() {
        // 62 symbols -> threshold 248. The first 8 script bytes must all be
        // rejected, the following ones accepted in order.
        let mut script: Vec<u8> = (248..=255).collect();
        script.extend_from_slice(&[0, 1, 61, 62, 247, 3, 4, 5]);
        let mut rng = ScriptedRng::new(script);

        let symbols = sample_symbols(&mut rng, TOKEN_ALPHABET, 6).unwrap();
        // 62 % 62 == 0, 247 % 62 == 61
        assert_eq!(
            symbols,
            vec![
                TOKEN_ALPHABET[0],
                TOKEN_ALPHABET[1],
                TOKEN_ALPHABET[61],
                TOKEN_ALPHABET[0],
                TOKEN_ALPHABET[61],
                TOKEN_ALPHABET[3],
            ]
        );
    }

    #[test]
    fn full_byte_alphabet_never_rejects() {
        let alphabet: Vec<u8> = (0..=255).collect();
        let script: Vec<u8> = (0..16).map(|i| i * 16).collect();
        let mut rng = ScriptedRng::new(script.clone());
        let symbols = sample_symbols(&mut rng, &alphabet, 16).unwrap();
        assert_eq!(symbols, script);
    }

    #[test]
    fn source_failure_propagates() {
        assert!(matches!(
            sample_symbols(&mut FailingRng, TOKEN_ALPHABET, 8),
            Err(RandomError::SourceUnavailable(_))
        ));
        assert!(matches!(
            uniform_int(&mut FailingRng, 0, 9),
            Err(RandomError::SourceUnavailable(_))
        ));
        assert!(matches!(
            random_password(&mut FailingRng, 12),
            Err(RandomError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn sampler_stall_cap_trips_on_all_rejected_bytes() {
        // 0xff is above the threshold for n = 62 (248), so every batch
        // is fruitless and the cap must trip instead of looping forever.
        assert!(matches!(
            sample_symbols(&mut SaturatedRng, TOKEN_ALPHABET, 8),
            Err(RandomError::SourceStalled { batches: 32 })
        ));
    }

    #[test]
    fn uniform_int_stall_cap_trips_on_all_rejected_draws() {
        // span 3: zone = 2^32 - 1, and a saturated source always draws
        // exactly 2^32 - 1, which sits outside the acceptance zone.
        assert!(matches!(
            uniform_int(&mut SaturatedRng, 0, 2),
            Err(RandomError::SourceStalled { batches: 32 })
        ));
    }

    #[test]
    fn uniform_int_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let v = uniform_int(&mut rng, 3, 7).unwrap();
            assert!((3..=7).contains(&v));
        }
        assert_eq!(uniform_int(&mut rng, 5, 5).unwrap(), 5);
    }

    #[test]
    #[should_panic(expected = "uniform_int requires low <= high")]
    fn uniform_int_panics_on_reversed_bounds() {
        let _ = uniform_int(&mut rand::thread_rng(), 2, 1);
    }

    #[test]
    fn uniform_int_uses_scripted_draws() {
        // Small u32 values fall inside the acceptance zone and map to
        // low + v % span directly.
        let mut rng = ScriptedRng::from_u32_draws(&[0, 1, 5, 6]);
        assert_eq!(uniform_int(&mut rng, 1, 2).unwrap(), 1);
        assert_eq!(uniform_int(&mut rng, 1, 2).unwrap(), 2);
        assert_eq!(uniform_int(&mut rng, 0, 4).unwrap(), 0);
        assert_eq!(uniform_int(&mut rng, 0, 4).unwrap(), 1);
    }

    #[test]
    fn shuffle_matches_fixed_draw_sequence() {
        // len 5: draws are j for i = 4, 3, 2, 1.
        let mut rng = ScriptedRng::from_u32_draws(&[0, 3, 1, 1]);
        let mut items = *b"abcde";
        secure_shuffle(&mut rng, &mut items).unwrap();
        // i=4, j=0: eabcd... traced by hand:
        // [a b c d e] swap(4,0) -> [e b c d a]
        // swap(3,3) -> unchanged
        // swap(2,1) -> [e c b d a]
        // swap(1,1) -> unchanged
        assert_eq!(&items, b"ecbda");
    }

    #[test]
    fn shuffle_handles_degenerate_lengths() {
        let mut rng = ScriptedRng::new(Vec::new());
        let mut empty: [u8; 0] = [];
        secure_shuffle(&mut rng, &mut empty).unwrap();
        let mut single = *b"x";
        secure_shuffle(&mut rng, &mut single).unwrap();
        assert_eq!(&single, b"x");
    }

    #[test]
    fn token_zero_length_is_empty() {
        assert_eq!(random_token(&mut rand::thread_rng(), 0).unwrap(), "");
    }

    #[test]
    fn token_length_and_charset() {
        let mut rng = rand::thread_rng();
        for &len in &[1usize, 6, 32, 100] {
            let token = random_token(&mut rng, len).unwrap();
            assert_eq!(token.len(), len);
            assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn password_length_is_clamped() {
        let mut rng = rand::thread_rng();
        for &len in &[0usize, 1, 3, 4] {
            assert_eq!(random_password(&mut rng, len).unwrap().len(), 4);
        }
        assert_eq!(random_password(&mut rng, 24).unwrap().len(), 24);
    }

    #[test]
    fn password_contains_required_classes() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let pw = random_password(&mut rng, 12).unwrap();
            let bytes = pw.as_bytes();
            let digits = bytes.iter().filter(|b| PASSWORD_DIGITS.contains(b)).count();
            let uppers = bytes.iter().filter(|b| PASSWORD_UPPER.contains(b)).count();
            let lowers = bytes.iter().filter(|b| PASSWORD_LOWER.contains(b)).count();
            assert!((1..=2).contains(&digits), "digits out of range in {pw}");
            assert!((1..=2).contains(&uppers), "uppercase out of range in {pw}");
            assert_eq!(digits + uppers + lowers, 12, "foreign character in {pw}");
        }
    }

    #[test]
    fn consecutive_secrets_differ() {
        let mut rng = rand::thread_rng();
        let tokens: Vec<String> = (0..10)
            .map(|_| random_token(&mut rng, 6).unwrap())
            .collect();
        let passwords: Vec<String> = (0..10)
            .map(|_| random_password(&mut rng, 12).unwrap())
            .collect();
        for i in 0..10 {
            for j in (i + 1)..10 {
                assert_ne!(tokens[i], tokens[j]);
                assert_ne!(passwords[i], passwords[j]);
            }
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_sample_count_and_membership(count in 0usize..512, seed in 0u64..u64::MAX) {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let symbols = sample_symbols(&mut rng, TOKEN_ALPHABET, count).unwrap();
            proptest::prop_assert_eq!(symbols.len(), count);
            proptest::prop_assert!(symbols.iter().all(|s| TOKEN_ALPHABET.contains(s)));
        }

        #[test]
        fn prop_password_guarantees(len in 0usize..64, seed in 0u64..u64::MAX) {
            use rand::SeedableRng;
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let pw = random_password(&mut rng, len).unwrap();
            proptest::prop_assert_eq!(pw.len(), len.max(PASSWORD_MIN_LENGTH));
            proptest::prop_assert!(pw.bytes().any(|b| PASSWORD_DIGITS.contains(&b)));
            proptest::prop_assert!(pw.bytes().any(|b| PASSWORD_UPPER.contains(&b)));
        }
    }
}

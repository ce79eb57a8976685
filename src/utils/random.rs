use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::StdRng, RngCore, SeedableRng};

/// Source of randomness for the uglifier.
///
/// Any `rand` generator qualifies, so callers pass `rand::rng()` in
/// production and a seeded `StdRng` (or a mock) in tests. Choice, shuffling
/// and sampling come from `rand::seq` on top of it.
pub trait RandomSource: RngCore {}

impl<R: RngCore + ?Sized> RandomSource for R {}

/// Deterministic generator for reproducible output.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn token_bytes(rng: &mut dyn RandomSource, n_bytes: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; n_bytes];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// `n_bytes` random bytes as lowercase hex (two characters per byte).
pub fn token_hex(rng: &mut dyn RandomSource, n_bytes: usize) -> String {
    hex::encode(token_bytes(rng, n_bytes))
}

/// `n_bytes` random bytes as unpadded URL-safe base64.
pub fn token_urlsafe(rng: &mut dyn RandomSource, n_bytes: usize) -> String {
    URL_SAFE_NO_PAD.encode(token_bytes(rng, n_bytes))
}


#[cfg(test)]
mod tests {
    use super::mock::MockRng;
    use super::*;
    use rand::Rng;

    #[test]
    fn test_token_lengths() {
        let mut rng = seeded(7);
        assert_eq!(token_hex(&mut rng, 16).len(), 32);
        assert_eq!(token_hex(&mut rng, 2).len(), 4);
        // 12 bytes -> 16 base64 characters, no padding
        assert_eq!(token_urlsafe(&mut rng, 12).len(), 16);
        // 16 bytes -> 22 characters once padding is dropped
        assert_eq!(token_urlsafe(&mut rng, 16).len(), 22);
    }

    #[test]
    fn test_token_hex_with_mock() {
        let mut mock = MockRng::new();
        mock.expect_fill_bytes().returning(|buf: &mut [u8]| buf.fill(0xab));
        assert_eq!(token_hex(&mut mock, 3), "ababab");
    }

    #[test]
    fn test_token_urlsafe_alphabet() {
        let mut rng = seeded(99);
        for _ in 0..50 {
            let token = token_urlsafe(&mut rng, 20);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        assert_eq!(token_hex(&mut a, 8), token_hex(&mut b, 8));
        assert_eq!(a.random_range(1..=1000), b.random_range(1..=1000));
    }

    #[test]
    fn test_trait_object_drives_rand() {
        let mut rng = seeded(3);
        let source: &mut dyn RandomSource = &mut rng;
        for _ in 0..200 {
            let n: u64 = source.random_range(1000..=9999);
            assert!((1000..=9999).contains(&n));
        }
    }

    #[test]
    fn test_constant_mocks() {
        let mut low = mock::lowest();
        assert_eq!(low.random_range(1000..=9999u64), 1000);
        assert!(low.random_bool(0.3));
        assert_eq!(token_hex(&mut low, 2), "0000");

        let mut high = mock::highest();
        assert!(!high.random_bool(0.3));
    }
}

use rand::Rng;
use std::collections::HashSet;

/// Symbols used for invitation codes. `0/O` and `1/l/I` are left out so a code
/// read off a printed card or a chat message cannot be mistyped.
pub const ID_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub const ID_LENGTH: usize = 6;

/// Allocates a fresh guest id that is not present in `existing`.
pub fn allocate_id(existing: &HashSet<&str>) -> String {
    let mut rng = rand::rng();
    allocate_id_with(&mut rng, existing)
}

/// Rejection-samples candidates from `rng` until one is unused.
pub fn allocate_id_with<R: Rng>(rng: &mut R, existing: &HashSet<&str>) -> String {
    loop {
        let candidate = random_code(rng);
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
    }
}

fn random_code<R: Rng>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ID_ALPHABET.len());
            char::from(ID_ALPHABET[idx])
        })
        .collect()
}

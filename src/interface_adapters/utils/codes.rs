use rand::Rng;

use crate::domain::ports::CodeGenerator;

pub const CODE_LENGTH: usize = 6;
pub const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Draws link codes from the thread-local CSPRNG.
///
/// Six base-36 characters give ~2.2 billion codes; uniqueness among outstanding
/// codes is enforced by the store, not here.
#[derive(Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}

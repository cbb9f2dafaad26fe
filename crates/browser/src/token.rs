use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const TOKEN_LEN: usize = 8;

/// Source of session ids and single-use action tokens.
pub trait TokenSource: Send {
    fn next_token(&mut self) -> String;
}

/// Lowercase tokens of `TOKEN_LEN` letters, each drawn uniformly from `a..=z`.
pub struct RandomTokens {
    rng: StdRng,
}

impl RandomTokens {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for RandomTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for RandomTokens {
    fn next_token(&mut self) -> String {
        (0..TOKEN_LEN)
            .map(|_| char::from(self.rng.gen_range(b'a'..=b'z')))
            .collect()
    }
}

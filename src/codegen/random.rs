//! Candidate code generation.

use thiserror::Error;

/// Characters a generated code is drawn from: lowercase, uppercase, digits.
pub const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest byte value accepted when sampling; 248 is four full cycles of the
/// 62-character alphabet, so `byte % 62` stays unbiased.
const SAMPLE_LIMIT: u8 = (CODE_ALPHABET.len() * 4) as u8;

/// Errors produced while drawing a candidate.
#[derive(Debug, Error)]
pub enum CodeGenError {
    /// The operating system entropy source could not be read.
    #[error("randomness source unavailable: {0}")]
    RandomnessUnavailable(#[from] getrandom::Error),
}

/// Produces fixed-length candidate codes from the system CSPRNG.
///
/// Codes must not be predictable: an attacker who can guess the next code
/// could enumerate links that were never shared with them. `getrandom` is
/// used directly rather than a seeded statistical PRNG.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    /// Creates a generator for codes of `length` characters.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Draws one candidate string.
    ///
    /// Each character is selected independently and uniformly; random bytes
    /// at or above [`SAMPLE_LIMIT`] are discarded to avoid modulo bias.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGenError::RandomnessUnavailable`] when the entropy
    /// source fails. Callers treat this as transient and retry.
    pub fn generate(&self) -> Result<String, CodeGenError> {
        let mut code = String::with_capacity(self.length);
        let mut buf = [0u8; 64];

        while code.len() < self.length {
            getrandom::fill(&mut buf)?;

            for &byte in buf.iter() {
                if byte < SAMPLE_LIMIT {
                    code.push(CODE_ALPHABET[(byte % CODE_ALPHABET.len() as u8) as usize] as char);
                    if code.len() == self.length {
                        break;
                    }
                }
            }
        }

        Ok(code)
    }
}

/// Characters a generated shortcode is drawn from.
pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated shortcodes
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Source of candidate shortcodes. Candidates may collide; the registry
/// retries.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniform draws from [`ALPHABET`] using the thread-local RNG.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        std::iter::repeat_with(|| ALPHABET[rand::random_range(0..ALPHABET.len())] as char)
            .take(self.length)
            .collect()
    }
}

/// Whether `code` is 3-20 ASCII alphanumerics.
pub fn is_valid_shortcode(code: &str) -> bool {
    (3..=20).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

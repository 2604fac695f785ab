//! Short code generation

/// URL-safe alphabet, 64 symbols
pub const CODE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Produces candidate short codes. Uniqueness is enforced by the store, not here.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws each symbol from the thread-local CSPRNG
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
        Self::new(8)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        std::iter::repeat_with(|| CODE_ALPHABET[rand::random_range(0..CODE_ALPHABET.len())] as char)
            .take(self.length)
            .collect()
    }
}

/// 短码是否只包含合法字符
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_length_and_alphabet() {
        let generator = RandomCodeGenerator::default();
        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.len(), 8);
            assert!(is_valid_short_code(&code), "bad code: {}", code);
        }
    }

    #[test]
    fn test_custom_length() {
        let generator = RandomCodeGenerator::new(12);
        assert_eq!(generator.generate().len(), 12);
    }

    #[test]
    fn test_codes_are_spread() {
        let generator = RandomCodeGenerator::default();
        let codes: HashSet<String> = (0..1000).map(|_| generator.generate()).collect();
        // 64^8 的空间，1000 个样本不应出现碰撞
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_is_valid_short_code() {
        assert!(is_valid_short_code("aZ09_-xy"));
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("api/shorten"));
        assert!(!is_valid_short_code("abc.def"));
    }
}

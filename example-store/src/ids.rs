use std::fmt;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use ulid::{Generator, Ulid};

/// Width of the token following the prefix: a ULID in Crockford base32.
pub const TOKEN_LENGTH: usize = ulid::ULID_LEN;

// Shared so ids minted within the same millisecond still sort in creation order.
static GENERATOR: Lazy<Mutex<Generator>> = Lazy::new(|| Mutex::new(Generator::new()));

/// Type prefixes for identifiers. The prefix alone tells you what kind of record an id
/// points at, and the token after it sorts by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPrefix {
    Example,
}

impl DataPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            DataPrefix::Example => "exmp_",
        }
    }

    /// Mint a new identifier: prefix followed by a fixed-width, time-ordered token.
    pub fn generate(self) -> String {
        format!("{}{}", self.as_str(), next_ulid())
    }

    /// Format check only: right prefix and right total length. The token body is opaque.
    pub fn is_valid(self, candidate: &str) -> bool {
        candidate.starts_with(self.as_str())
            && candidate.len() == self.as_str().len() + TOKEN_LENGTH
    }
}

fn next_ulid() -> Ulid {
    let mut generator = match GENERATOR.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    // the random part only overflows after 2^80 ids in one millisecond
    generator.generate().unwrap_or_else(|_| Ulid::new())
}

impl fmt::Display for DataPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_have_prefix_and_fixed_length() {
        let id = DataPrefix::Example.generate();

        assert!(id.starts_with("exmp_"));
        assert_eq!(id.len(), 5 + TOKEN_LENGTH);
        assert!(DataPrefix::Example.is_valid(&id));
    }

    #[test]
    fn test_generated_ids_are_unique_and_sort_by_creation() {
        let ids: Vec<String> = (0..64).map(|_| DataPrefix::Example.generate()).collect();

        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, ids);
    }

    #[test]
    fn test_is_valid_rejects_wrong_prefix_or_length() {
        let id = DataPrefix::Example.generate();
        let token = &id["exmp_".len()..];

        assert!(!DataPrefix::Example.is_valid(""));
        assert!(!DataPrefix::Example.is_valid("exmp_"));
        assert!(!DataPrefix::Example.is_valid(&format!("chan_{token}")));
        assert!(!DataPrefix::Example.is_valid(&format!("{id}0")));
        assert!(!DataPrefix::Example.is_valid(&id[..id.len() - 1]));
    }

    #[test]
    fn test_is_valid_does_not_inspect_the_token_body() {
        let candidate = format!("exmp_{}", "Z".repeat(TOKEN_LENGTH));
        assert!(DataPrefix::Example.is_valid(&candidate));
    }

    #[test]
    fn test_accepts_ids_minted_by_earlier_deployments() {
        let id = "exmp_01HZY3K6Q8V7M2N4P5R6S7T8W9";

        assert_eq!(id.len(), 31);
        assert!(DataPrefix::Example.is_valid(id));
    }

    #[test]
    fn test_generated_token_is_a_ulid() {
        let id = DataPrefix::Example.generate();

        assert!(Ulid::from_string(&id["exmp_".len()..]).is_ok());
    }

    #[test]
    fn test_display_is_the_prefix() {
        assert_eq!(DataPrefix::Example.to_string(), "exmp_");
    }
}

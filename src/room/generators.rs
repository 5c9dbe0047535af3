use chrono::Utc;
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Source of wall-clock time in milliseconds since the Unix epoch
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Trait for generating operation identifiers
pub trait OperationIdGenerator: Send + Sync {
    fn generate(&self, timestamp: i64) -> String;
}

/// Generates `op_<timestamp>_<suffix>` where the suffix is nine random
/// lowercase base-36 characters. Not collision-proof.
pub struct RandomSuffixIdGenerator;

impl RandomSuffixIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomSuffixIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationIdGenerator for RandomSuffixIdGenerator {
    fn generate(&self, timestamp: i64) -> String {
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        format!("op_{}_{}", timestamp, suffix)
    }
}

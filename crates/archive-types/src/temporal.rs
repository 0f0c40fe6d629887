use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// High-resolution timestamp: nanoseconds since the UNIX epoch.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FineTime(i64);

impl FineTime {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self(i64::try_from(nanos).unwrap_or(i64::MAX))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FineTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FineTime({}ns)", self.0)
    }
}

impl fmt::Display for FineTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        // 2020-01-01 in nanoseconds
        assert!(FineTime::now().as_nanos() > 1_577_836_800_000_000_000);
    }

    #[test]
    fn zero_is_smallest_positive() {
        assert!(FineTime::zero().is_zero());
        assert!(FineTime::zero() < FineTime::from_nanos(1));
    }
}

const BYTES_PER_GB: f64 = (1024u64 * 1024 * 1024) as f64;

/// Declared payload size, as decoded from the payload's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeDescriptor {
    Single { length: u64 },
    Multi { lengths: Vec<u64> },
}

impl SizeDescriptor {
    /// `None` when the declared lengths do not fit in a `u64`.
    pub fn total_bytes(&self) -> Option<u64> {
        match self {
            SizeDescriptor::Single { length } => Some(*length),
            SizeDescriptor::Multi { lengths } => lengths
                .iter()
                .try_fold(0u64, |total, length| total.checked_add(*length)),
        }
    }

    pub fn gigabytes(&self) -> Option<f64> {
        self.total_bytes().map(bytes_to_gb)
    }
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

use std::sync::Arc;

use engine_logging::targets::SIZE;
use engine_logging::{engine_debug, engine_warn};
use freeleech_core::{SizeBounds, SizeVerdict};

use crate::{decode_size, Fetcher};

/// Looks up the payload size from its metadata before a download is committed.
pub struct SizeFilter {
    fetcher: Arc<dyn Fetcher>,
    bounds: SizeBounds,
}

impl SizeFilter {
    pub fn new(fetcher: Arc<dyn Fetcher>, bounds: SizeBounds) -> Self {
        Self { fetcher, bounds }
    }

    pub fn bounds(&self) -> SizeBounds {
        self.bounds
    }

    /// Declared size in GB, or `None` when it cannot be determined.
    pub async fn estimate_size_gb(&self, url: &str) -> Option<f64> {
        let output = match self.fetcher.fetch(url).await {
            Ok(output) => output,
            Err(err) => {
                engine_warn!(target: SIZE, "Could not check size: {}", err);
                return None;
            }
        };
        match decode_size(&output.bytes) {
            Ok(descriptor) => descriptor.gigabytes(),
            Err(err) => {
                engine_warn!(target: SIZE, "Could not check size: {}", err);
                None
            }
        }
    }

    /// Skips the lookup entirely when no bound is configured.
    pub async fn check(&self, url: &str) -> SizeVerdict {
        if !self.bounds.is_active() {
            return SizeVerdict::Unknown;
        }
        let size_gb = self.estimate_size_gb(url).await;
        let verdict = self.bounds.judge(size_gb);
        engine_debug!(target: SIZE, "Size verdict for {}: {:?}", url, verdict);
        verdict
    }
}

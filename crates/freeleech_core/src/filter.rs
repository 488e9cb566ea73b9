/// Category allow-list. An empty list lets everything through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryFilter {
    terms: Vec<String>,
}

impl CategoryFilter {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        Self { terms }
    }

    pub fn is_active(&self) -> bool {
        !self.terms.is_empty()
    }

    /// True when no filter is configured, or when at least one term is a
    /// case-insensitive substring of `category`.
    pub fn matches(&self, category: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let category = category.to_lowercase();
        self.terms.iter().any(|term| category.contains(term.as_str()))
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

/// Optional size window in gigabytes (1024^3 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeBounds {
    pub min_gb: Option<f64>,
    pub max_gb: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeVerdict {
    Accept { size_gb: f64 },
    /// Size could not be determined; never a reason to reject.
    Unknown,
    TooSmall { size_gb: f64, min_gb: f64 },
    TooLarge { size_gb: f64, max_gb: f64 },
}

impl SizeVerdict {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SizeVerdict::TooSmall { .. } | SizeVerdict::TooLarge { .. })
    }
}

impl SizeBounds {
    pub fn is_active(&self) -> bool {
        self.min_gb.is_some() || self.max_gb.is_some()
    }

    pub fn judge(&self, size_gb: Option<f64>) -> SizeVerdict {
        let Some(size_gb) = size_gb else {
            return SizeVerdict::Unknown;
        };
        if let Some(min_gb) = self.min_gb {
            if size_gb < min_gb {
                return SizeVerdict::TooSmall { size_gb, min_gb };
            }
        }
        if let Some(max_gb) = self.max_gb {
            if size_gb > max_gb {
                return SizeVerdict::TooLarge { size_gb, max_gb };
            }
        }
        SizeVerdict::Accept { size_gb }
    }
}

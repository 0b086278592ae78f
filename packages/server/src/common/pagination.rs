//! Offset pagination for the review queue and audit ledger listings.

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Limit/offset after clamping to sane bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Clamp raw GraphQL arguments: limit to `1..=MAX_PAGE_SIZE`, offset to `>= 0`.
    pub fn new(limit: Option<i32>, offset: Option<i32>) -> Self {
        let limit = limit
            .map(i64::from)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = offset.map(i64::from).unwrap_or(0).max(0);
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            Page::default(),
            Page {
                limit: DEFAULT_PAGE_SIZE,
                offset: 0
            }
        );
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(Page::new(Some(0), None).limit, 1);
        assert_eq!(Page::new(Some(10_000), None).limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_negative_offset_becomes_zero() {
        assert_eq!(Page::new(None, Some(-5)).offset, 0);
    }
}

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 1000;

/// A 1-based page request for table browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    /// Lenient parse of raw query parameters. Anything unparsable or out of
    /// range falls back to page 1 / the default limit rather than erroring.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<usize>().ok())
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        assert_eq!(Pagination::from_params(None, None), Pagination::default());
    }

    #[test]
    fn out_of_range_snaps_to_defaults() {
        let p = Pagination::from_params(Some("0"), Some("5000"));
        assert_eq!(p, Pagination { page: 1, limit: 50 });
        let p = Pagination::from_params(Some("-3"), Some("0"));
        assert_eq!(p, Pagination { page: 1, limit: 50 });
        let p = Pagination::from_params(Some("abc"), Some("x"));
        assert_eq!(p, Pagination { page: 1, limit: 50 });
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Pagination::from_params(None, Some("1")).limit, 1);
        assert_eq!(Pagination::from_params(None, Some("1000")).limit, 1000);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let p = Pagination::from_params(Some("3"), Some("20"));
        assert_eq!(p.offset(), 40);
        assert_eq!(Pagination::default().offset(), 0);
    }
}

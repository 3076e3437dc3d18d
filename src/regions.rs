//! Expansion of region identifiers into postal code lists

/// Trait for turning a region identifier into the codes a session should process
pub trait RegionResolver: Send + Sync {
    /// Codes for `region`, or `None` if the region is unknown
    fn resolve(&self, region: &str) -> Option<Vec<String>>;

    /// Every region identifier this resolver knows
    fn regions(&self) -> Vec<&'static str>;
}

/// Approximate postal code ranges for the contiguous US states and DC
const STATE_RANGES: [(&str, u32, u32); 49] = [
    ("AL", 35000, 36999),
    ("AZ", 85000, 86999),
    ("AR", 71600, 72999),
    ("CA", 90000, 96699),
    ("CO", 80000, 81999),
    ("CT", 6000, 6999),
    ("DE", 19700, 19999),
    ("FL", 32000, 34999),
    ("GA", 30000, 31999),
    ("ID", 83200, 83999),
    ("IL", 60000, 62999),
    ("IN", 46000, 47999),
    ("IA", 50000, 52999),
    ("KS", 66000, 67999),
    ("KY", 40000, 42999),
    ("LA", 70000, 71599),
    ("ME", 3900, 4999),
    ("MD", 20600, 21999),
    ("MA", 1000, 2799),
    ("MI", 48000, 49999),
    ("MN", 55000, 56999),
    ("MS", 38600, 39999),
    ("MO", 63000, 65999),
    ("MT", 59000, 59999),
    ("NE", 68000, 69999),
    ("NV", 89000, 89999),
    ("NH", 3000, 3899),
    ("NJ", 7000, 8999),
    ("NM", 87000, 88999),
    ("NY", 10000, 14999),
    ("NC", 27000, 28999),
    ("ND", 58000, 58999),
    ("OH", 43000, 45999),
    ("OK", 73000, 74999),
    ("OR", 97000, 97999),
    ("PA", 15000, 19699),
    ("RI", 2800, 2999),
    ("SC", 29000, 29999),
    ("SD", 57000, 57999),
    ("TN", 37000, 38599),
    ("TX", 75000, 79999),
    ("UT", 84000, 84999),
    ("VT", 5000, 5999),
    ("VA", 22000, 24699),
    ("WA", 98000, 99499),
    ("WV", 24700, 26999),
    ("WI", 53000, 54999),
    ("WY", 82000, 83199),
    ("DC", 20000, 20599),
];

/// [`RegionResolver`] that samples evenly spaced codes from each state's range
///
/// Region identifiers are two-letter state abbreviations, matched case-insensitively.
#[derive(Debug, Clone)]
pub struct RangeRegionResolver {
    per_region: usize,
}

impl RangeRegionResolver {
    /// Create a resolver producing up to `per_region` codes per region
    pub fn new(per_region: usize) -> Self {
        Self {
            per_region: per_region.max(1),
        }
    }
}

impl Default for RangeRegionResolver {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RegionResolver for RangeRegionResolver {
    fn resolve(&self, region: &str) -> Option<Vec<String>> {
        let (_, start, end) = STATE_RANGES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(region.trim()))?;

        let (start, end) = (*start as usize, *end as usize);
        let step = ((end - start) / self.per_region).max(1);
        Some(
            (0..self.per_region)
                .map(|i| start + i * step)
                .take_while(|code| *code <= end)
                .map(|code| format!("{code:05}"))
                .collect(),
        )
    }

    fn regions(&self) -> Vec<&'static str> {
        STATE_RANGES.iter().map(|(name, _, _)| *name).collect()
    }
}

use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_LIMIT: i64 = 500;

/// Resolved page/limit pair. Always `page >= 1` and `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Clamp caller input: a page below 1 becomes 1, a limit outside
    /// `[1, MAX_LIMIT]` becomes `default_limit`.
    pub fn resolve(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(default_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination block of a list response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub total: i64,
    pub current_page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, pagination: Pagination) -> Self {
        Self {
            total,
            current_page: pagination.page,
            limit: pagination.limit,
            total_pages: (total + pagination.limit - 1) / pagination.limit,
        }
    }
}

/// Raw `page` / `limit` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn resolve(&self, default_limit: i64) -> Pagination {
        Pagination::resolve(self.page, self.limit, default_limit)
    }
}

/// Unparseable numbers fall back to the default instead of rejecting the request.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

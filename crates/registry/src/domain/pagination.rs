use garde::Validate;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Offset pagination shared by the list operations
#[derive(Debug, Clone, Default, Validate)]
pub struct PageRequest {
    #[garde(range(min = 0))]
    pub offset: i64,
    /// Defaults to [`DEFAULT_PAGE_LIMIT`]
    #[garde(range(min = 1, max = MAX_PAGE_LIMIT))]
    pub limit: Option<i64>,
}

impl PageRequest {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}

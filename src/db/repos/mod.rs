mod assignments;
mod attendance;
mod courses;
mod enrollments;
mod quizzes;
mod results;
mod submissions;
mod users;

pub use assignments::*;
pub use attendance::*;
pub use courses::*;
pub use enrollments::*;
pub use quizzes::*;
pub use results::*;
pub use submissions::*;
pub use users::*;
use serde::Deserialize;
use uuid::Uuid;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Offset pagination parameters, 1-based.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

impl PageParams {
    /// Clamp out-of-range values instead of rejecting them.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// One page of results plus the total number of matching records.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub params: PageParams,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        let limit = i64::from(self.params.limit.max(1));
        (self.total + limit - 1) / limit
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            params: self.params,
        }
    }
}

/// Filter shared by assignment and quiz listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CourseworkFilter {
    pub course_id: Option<Uuid>,
    /// Only return records with `is_active = true`.
    pub active_only: bool,
}

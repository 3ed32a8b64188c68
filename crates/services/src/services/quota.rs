//! Per-category cap on simultaneously incomplete tasks.

/// Maximum number of incomplete tasks a single category may hold.
pub const CATEGORY_TASK_LIMIT: i64 = 5;

/// Whether a category currently holding `current_incomplete_count`
/// incomplete tasks may accept one more.
pub fn may_create(current_incomplete_count: i64) -> bool {
    current_incomplete_count < CATEGORY_TASK_LIMIT
}

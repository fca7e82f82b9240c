//! Identifiers for location records and revisits.
//!
//! Both are UUIDv7, so ids sort by creation time and stay unique across
//! writers without coordination.

use uuid::Uuid;

/// Fresh time-ordered id.
///
/// ```
/// let a = mindtrail_core::new_id();
/// assert_eq!(a.get_version_num(), 7);
/// ```
#[inline]
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

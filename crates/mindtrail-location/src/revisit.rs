//! Append-only revisit log attached to location records.

use chrono::Utc;
use mindtrail_core::{new_id, Error, LocationRecord, Result, Revisit, RevisitOptions};
use uuid::Uuid;

/// Build a revisit dated now with a fresh id.
pub fn new_revisit(reflection: impl Into<String>, options: RevisitOptions) -> Revisit {
    Revisit {
        id: new_id(),
        visit_date: Utc::now(),
        reflection: reflection.into(),
        mood: options.mood,
        photos: options.photos,
        rating: options.rating,
    }
}

/// Append `revisit` to the record with `location_id`.
///
/// Fails with [`Error::LocationNotFound`] if no such record exists; nothing
/// is modified in that case.
pub fn append_revisit(
    records: &mut [LocationRecord],
    location_id: Uuid,
    revisit: Revisit,
) -> Result<&Revisit> {
    let record = records
        .iter_mut()
        .find(|r| r.id == location_id)
        .ok_or(Error::LocationNotFound(location_id))?;

    record.revisits.push(revisit);
    let last = record.revisits.len() - 1;
    Ok(&record.revisits[last])
}

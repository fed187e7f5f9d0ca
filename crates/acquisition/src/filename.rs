//! Deterministic cache file naming.
//!
//! The file name is the cache key: every caller derives it the same way
//! from (model name, normalized time, bounds), and the normalized time can
//! be recovered from an existing file's name.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;
use wx_common::SnweBounds;

const TIME_FORMAT: &str = "%Y_%m_%d_T%H_%M_%S";
/// Length of a formatted TIME_FORMAT segment.
const TIME_SEGMENT_LEN: usize = 20;

/// Cache file name for (model, normalized time, bounds).
pub fn cache_filename(model_name: &str, time: DateTime<Utc>, bounds: &SnweBounds) -> String {
    format!(
        "{}_{}_{}.nc",
        model_name,
        time.format(TIME_FORMAT),
        bounds.key_fragment()
    )
}

/// Recover the normalized timestamp embedded in a cache file name.
pub fn time_from_filename(path: &Path) -> Option<DateTime<Utc>> {
    let stem = path.file_stem()?.to_str()?;
    // The time segment follows the model-name prefix.
    let rest = stem.splitn(2, '_').nth(1)?;
    if rest.len() < TIME_SEGMENT_LEN {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&rest[..TIME_SEGMENT_LEN], TIME_FORMAT).ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}

//! Record file naming: `<bucket>/<id>.<ext>`.
//!
//! Records are grouped into numbered bucket directories so no single
//! directory grows unbounded. A bucket is named after the first multiple of
//! 1000 strictly greater than the ids it holds:
//!
//! ```text
//! data/posts/
//! ├── 1000/          # ids 0..=999
//! │   ├── 1.md
//! │   └── 999.md
//! └── 2000/          # ids 1000..=1999
//!     └── 1000.md
//! ```
//!
//! The parser does not depend on this layout (it walks the whole tree and
//! joins on the `id` field); the intake command uses it to place new files.

/// Bucket directory number for a record id: `(id / 1000 + 1) * 1000`.
pub fn bucket_for(id: u64) -> u64 {
    (id / 1000 + 1) * 1000
}

/// Whether a directory name looks like a bucket (`1000`, `2000`, ...).
pub fn is_bucket_name(name: &str) -> bool {
    !name.is_empty() && name.ends_with("000") && name.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a numeric record id from a file name like `42.md`.
///
/// Returns `None` unless the stem is all digits and the extension matches.
pub fn parse_record_id(file_name: &str, extension: &str) -> Option<u64> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// File name for a record id: `42` → `42.md`.
pub fn record_file_name(id: u64, extension: &str) -> String {
    format!("{id}.{extension}")
}

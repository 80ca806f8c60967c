//! Report body rendering.

use crate::error::Result;
use crate::matcher::Record;

/// Separator between rendered records in a report body.
pub const RECORD_SEPARATOR: &str = "\n";

/// Join the rendered text of `records`, in the given order.
///
/// No filtering or truncation happens here. The first record that fails to
/// render aborts the whole body.
pub fn render<R: Record + ?Sized>(records: &[&R]) -> Result<String> {
    let mut lines = Vec::with_capacity(records.len());
    for record in records {
        lines.push(record.render()?);
    }
    Ok(lines.join(RECORD_SEPARATOR))
}

//! CSV export of an image's annotation set.
//!
//! One row per annotation, RFC 4180 quoting, `\n` line endings.

use std::fmt::Write as _;

use crate::format::record::PersistedAnnotation;

/// Column header, in output order.
pub const CSV_HEADER: &[&str] = &[
    "image_id",
    "x",
    "y",
    "width",
    "height",
    "category",
    "location",
    "body_map_id",
    "severity",
    "doctor_notes",
    "created_by",
    "created_at",
    "last_modified_by",
    "last_modified_at",
];

/// Quote a field if it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Render the annotations of `image_id` as CSV, header included.
pub fn export_csv(image_id: &str, boxes: &[PersistedAnnotation]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER);

    for b in boxes {
        let mut geometry = [String::new(), String::new(), String::new(), String::new()];
        for (slot, value) in geometry.iter_mut().zip([b.x, b.y, b.width, b.height]) {
            let _ = write!(slot, "{value}");
        }
        push_row(
            &mut out,
            &[
                image_id,
                &geometry[0],
                &geometry[1],
                &geometry[2],
                &geometry[3],
                &b.category,
                &b.location,
                &b.body_map_id,
                &b.severity,
                &b.doctor_notes,
                &b.created_by,
                &b.created_at,
                &b.last_modified_by,
                &b.last_modified_at,
            ],
        );
    }

    log::debug!("Exported {} annotations of '{}' as CSV", boxes.len(), image_id);
    out
}

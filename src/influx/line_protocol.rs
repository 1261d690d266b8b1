//! Encoding of points into InfluxDB line protocol with second precision.

use crate::types::point::Point;
use std::fmt::Write;

fn escape_measurement(value: &str) -> String {
    escape(value, &[',', ' '])
}

fn escape_field_key(value: &str) -> String {
    escape(value, &[',', '=', ' '])
}

fn escape(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            // lossy: stored as a literal `\n`
            '\n' => out.push_str("\\n"),
            c if special.contains(&c) || c == '\\' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// One line: `<measurement> <field>=<float> <epoch seconds>`.
///
/// Line breaks in names cannot be represented. They are written as a literal
/// backslash followed by `n`, which keeps the batch intact but does not read
/// back as the original name. The reconciler never builds such points.
pub fn encode_point(point: &Point) -> String {
    let mut value = format!("{}", point.value());
    // whole numbers get an explicit fraction
    if !value.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
        value.push_str(".0");
    }
    format!(
        "{} {}={} {}",
        escape_measurement(point.series()),
        escape_field_key(point.field()),
        value,
        point.time().timestamp()
    )
}

/// The request body for a batch, one line per point.
pub fn encode_batch(points: &[Point]) -> String {
    let mut body = String::new();
    for point in points {
        // writing to a String cannot fail
        let _ = writeln!(body, "{}", encode_point(point));
    }
    body
}

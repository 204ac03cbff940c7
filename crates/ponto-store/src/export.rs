//! Flat CSV export of the punch audit trail.

use crate::records::VerificationEvent;

pub const CSV_HEADER: [&str; 7] = ["id", "employee_id", "ts", "lat", "lon", "similarity", "photo_path"];

/// Quote a field when it contains a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render `events` as CSV in the order given, absent values as empty fields.
pub fn events_to_csv(events: &[VerificationEvent]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push_str("\r\n");

    for e in events {
        let fields = [
            e.id.to_string(),
            e.identity_id.to_string(),
            e.timestamp.to_rfc3339(),
            opt(e.lat),
            opt(e.lon),
            opt(e.score),
            opt(e.photo_path.as_deref()),
        ];
        let line: Vec<String> = fields.iter().map(|f| escape(f)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: i64, score: Option<f32>, photo: Option<&str>) -> VerificationEvent {
        VerificationEvent {
            id,
            identity_id: 7,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            lat: Some(-23.55),
            lon: None,
            score,
            photo_path: photo.map(str::to_string),
        }
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(events_to_csv(&[]), "id,employee_id,ts,lat,lon,similarity,photo_path\r\n");
    }

    #[test]
    fn test_rows_render_optional_fields_empty() {
        let csv = events_to_csv(&[event(1, Some(0.5), Some("data/photos/a.jpg")), event(2, None, None)]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[1], "1,7,2024-03-01T08:00:00+00:00,-23.55,,0.5,data/photos/a.jpg");
        assert_eq!(lines[2], "2,7,2024-03-01T08:00:00+00:00,-23.55,,,");
    }

    #[test]
    fn test_fields_with_delimiters_are_quoted() {
        let csv = events_to_csv(&[event(3, Some(1.0), Some("odd,\"name\".jpg"))]);
        assert!(csv.contains(",\"odd,\"\"name\"\".jpg\"\r\n"), "{csv}");
    }
}

//! Reusable cell renderers for donation columns

use crate::core::row::Row;
use crate::core::schema::{RenderFn, RenderedCell, Tone};
use crate::core::value::CellValue;
use chrono::{DateTime, Local, NaiveDate};
use std::sync::Arc;

/// Prefix numeric amounts with a currency symbol, e.g. "₹1500"
pub fn currency(symbol: &'static str) -> RenderFn {
    Arc::new(move |value: &CellValue, _row: &Row| {
        if value.is_empty() {
            return RenderedCell::default();
        }
        RenderedCell::plain(format!("{symbol}{value}"))
    })
}

/// Render timestamps and ISO dates as month/day/year in local time
///
/// Values that do not parse are shown unchanged.
pub fn date() -> RenderFn {
    Arc::new(|value: &CellValue, _row: &Row| RenderedCell::plain(format_date(value)))
}

pub fn format_date(value: &CellValue) -> String {
    let raw = value.to_display_string();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return parsed.with_timezone(&Local).format("%-m/%-d/%Y").to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return parsed.format("%-m/%-d/%Y").to_string();
    }
    raw
}

/// Booleans as a green "Yes" or red "No"
pub fn yes_no() -> RenderFn {
    Arc::new(|value: &CellValue, _row: &Row| {
        if value.is_truthy() {
            RenderedCell::toned("Yes", Tone::Success)
        } else {
            RenderedCell::toned("No", Tone::Danger)
        }
    })
}

/// Show `placeholder` in place of empty or blank values
pub fn or_placeholder(placeholder: &'static str) -> RenderFn {
    Arc::new(move |value: &CellValue, _row: &Row| {
        if value.is_truthy() {
            RenderedCell::plain(value.to_display_string())
        } else {
            RenderedCell::toned(placeholder, Tone::Muted)
        }
    })
}

/// Status text coloured by outcome
///
/// Completed is green, failed is red, anything else is treated as pending.
pub fn status_badge() -> RenderFn {
    Arc::new(|value: &CellValue, _row: &Row| {
        let text = value.to_display_string();
        let tone = match text.to_lowercase().as_str() {
            "completed" => Tone::Success,
            "failed" => Tone::Danger,
            "" => Tone::Muted,
            _ => Tone::Warning,
        };
        RenderedCell::toned(text, tone)
    })
}

/// Show the value only when `flag_path` is truthy on the row
///
/// Only the display is blanked: the resolved value still takes part in
/// filtering and sorting.
pub fn when_flag(flag_path: &'static str) -> RenderFn {
    Arc::new(move |value: &CellValue, row: &Row| {
        if row.resolve(flag_path).is_truthy() {
            RenderedCell::plain(value.to_display_string())
        } else {
            RenderedCell::default()
        }
    })
}

/// Turn an upload path into an absolute link under `origin`
///
/// Paths stored as "public/uploads/x.png" are served from "/uploads/x.png".
pub fn asset_link(origin: String) -> RenderFn {
    Arc::new(move |value: &CellValue, _row: &Row| {
        let path = value.to_display_string();
        if path.is_empty() {
            return RenderedCell::toned("No file", Tone::Muted);
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return RenderedCell::toned(path, Tone::Accent);
        }
        let served = path.replacen("public/", "/", 1);
        let joined = format!(
            "{}/{}",
            origin.trim_end_matches('/'),
            served.trim_start_matches('/')
        );
        RenderedCell::toned(joined, Tone::Accent)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        Row::from_value(value).unwrap()
    }

    #[test]
    fn test_currency() {
        let render = currency("₹");
        let r = row(json!({}));
        assert_eq!(render(&CellValue::from(1500i64), &r).text, "₹1500");
        assert_eq!(render(&CellValue::Absent, &r).text, "");
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(format_date(&CellValue::from("2024-03-15")), "3/15/2024");
        // Midday UTC stays on the same calendar day in every common offset
        assert_eq!(
            format_date(&CellValue::from("2024-03-15T12:00:00Z")),
            "3/15/2024"
        );
        assert_eq!(format_date(&CellValue::from("soon")), "soon");
    }

    #[test]
    fn test_status_badge_tones() {
        let render = status_badge();
        let r = row(json!({}));
        assert_eq!(render(&CellValue::from("completed"), &r).tone, Tone::Success);
        assert_eq!(render(&CellValue::from("Failed"), &r).tone, Tone::Danger);
        assert_eq!(render(&CellValue::from("processing"), &r).tone, Tone::Warning);
    }

    #[test]
    fn test_when_flag() {
        let render = when_flag("wants80GCertificate");
        let value = CellValue::from("ABCDE1234F");
        assert_eq!(
            render(&value, &row(json!({"wants80GCertificate": true}))).text,
            "ABCDE1234F"
        );
        assert_eq!(
            render(&value, &row(json!({"wants80GCertificate": false}))).text,
            ""
        );
    }

    #[test]
    fn test_asset_link() {
        let render = asset_link("https://example.org".to_string());
        let r = row(json!({}));
        assert_eq!(
            render(&CellValue::from("public/uploads/a.png"), &r).text,
            "https://example.org/uploads/a.png"
        );
        assert_eq!(render(&CellValue::Null, &r).text, "No file");
    }

    #[test]
    fn test_yes_no() {
        let render = yes_no();
        let r = row(json!({}));
        assert_eq!(render(&CellValue::from(true), &r).text, "Yes");
        assert_eq!(render(&CellValue::Absent, &r).tone, Tone::Danger);
    }

    #[test]
    fn test_or_placeholder() {
        let render = or_placeholder("Not Specified");
        let r = row(json!({}));
        assert_eq!(render(&CellValue::from("Pune"), &r).text, "Pune");
        assert_eq!(render(&CellValue::from(""), &r).text, "Not Specified");
    }
}

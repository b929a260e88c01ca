use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;

/// A value resolved from a row for one column
///
/// `Absent` means the row has no value at the accessor path at all, while
/// `Null` means the record carried an explicit JSON `null`. Both count as
/// empty for sorting and filtering.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Absent,
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Arrays and nested objects, kept as-is
    Json(Value),
}

impl CellValue {
    /// Convert a JSON value borrowed from a record
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => CellValue::Number(n.clone()),
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Json(other.clone()),
        }
    }

    /// Absent or explicit null
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Absent | CellValue::Null)
    }

    /// Numeric view of the value
    ///
    /// Text that parses as a finite number counts as numeric, so amounts
    /// delivered as strings still sort by magnitude.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => n.as_f64(),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Truthiness used by conditional renderers
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Absent | CellValue::Null => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Json(_) => true,
        }
    }

    /// Plain string form; empty values become ""
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Absent | CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Json(v) => v.to_string(),
        }
    }

    /// Lowercased string form used for substring matching
    pub fn to_filter_text(&self) -> String {
        self.to_display_string().to_lowercase()
    }

    /// Substring match against an already lowercased needle
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.to_filter_text().contains(needle_lower)
    }

    /// Compare two non-empty values
    ///
    /// A total order: numeric values (numbers and numeric text) come before
    /// everything else and compare by magnitude; the rest compare
    /// lexicographically on their display strings. Placement of empty values
    /// is the caller's concern.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.to_display_string().cmp(&other.to_display_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(Number::from(n))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Null)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_json_variants() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from_json(&json!("x")), CellValue::from("x"));
        assert_eq!(CellValue::from_json(&json!(5)), CellValue::from(5i64));
        assert!(matches!(
            CellValue::from_json(&json!({"a": 1})),
            CellValue::Json(_)
        ));
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(CellValue::Absent.to_display_string(), "");
        assert_eq!(CellValue::Null.to_display_string(), "");
        assert_eq!(CellValue::from(10000i64).to_display_string(), "10000");
        assert_eq!(CellValue::from(2500.5).to_display_string(), "2500.5");
        assert_eq!(CellValue::from(false).to_display_string(), "false");
    }

    #[test]
    fn test_numeric_text_compares_numerically() {
        let a = CellValue::from("900");
        let b = CellValue::from(1200i64);
        assert_eq!(a.compare(&b), Ordering::Less);

        let c = CellValue::from("apple");
        let d = CellValue::from("banana");
        assert_eq!(c.compare(&d), Ordering::Less);
    }

    #[test]
    fn test_numbers_sort_before_text() {
        let n = CellValue::from(10i64);
        let t = CellValue::from("abc");
        assert_eq!(n.compare(&t), Ordering::Less);
        assert_eq!(t.compare(&n), Ordering::Greater);
    }

    #[test]
    fn test_mixed_comparison_is_transitive() {
        // 2 < 10 numerically; "1a" is text so it follows both
        let two = CellValue::from(2i64);
        let ten = CellValue::from("10");
        let text = CellValue::from("1a");
        assert_eq!(two.compare(&ten), Ordering::Less);
        assert_eq!(ten.compare(&text), Ordering::Less);
        assert_eq!(two.compare(&text), Ordering::Less);
        assert_eq!(text.compare(&two), Ordering::Greater);
        assert_eq!(text.compare(&CellValue::from("1b")), Ordering::Less);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let v = CellValue::from("Alice Smith");
        assert!(v.matches("smith"));
        assert!(!v.matches("bob"));
        assert!(CellValue::Null.matches(""));
    }

    #[test]
    fn test_truthiness() {
        assert!(CellValue::from(true).is_truthy());
        assert!(!CellValue::from(false).is_truthy());
        assert!(!CellValue::Absent.is_truthy());
        assert!(!CellValue::from("").is_truthy());
        assert!(CellValue::from(1i64).is_truthy());
    }
}

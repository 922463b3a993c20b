//! Value coercions used by predicates, joins, grouping and sorting
//!
//! Query semantics are defined in terms of loosely-typed scalar rules:
//! numeric coercion of text, abstract (`==`) versus strict (`===`)
//! equality, and stringified group keys. They are kept here in one place
//! so every operator agrees on them.

use std::cmp::Ordering;

use super::Value;

/// Numeric coercion of a possibly-absent value
///
/// Absent -> NaN, `Null` -> 0, booleans -> 0/1, text is parsed after
/// trimming (empty text -> 0, unparsable text -> NaN).
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Integer(i)) => *i as f64,
        Some(Value::Float(f)) => *f,
        Some(Value::Text(s)) => parse_number(s),
    }
}

fn parse_number(text: &str) -> f64 {
    let s = text.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // str::parse also accepts "inf", "nan" and friends; only exponents may be letters here
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

enum Primitive<'a> {
    Number(f64),
    Text(&'a str),
}

fn primitive(value: &Value) -> Option<Primitive<'_>> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(Primitive::Number(if *b { 1.0 } else { 0.0 })),
        Value::Integer(i) => Some(Primitive::Number(*i as f64)),
        Value::Float(f) => Some(Primitive::Number(*f)),
        Value::Text(s) => Some(Primitive::Text(s)),
    }
}

/// Abstract equality: `'5' = 5` holds, absent equals `Null`
pub fn loose_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    let left = left.and_then(primitive);
    let right = right.and_then(primitive);

    match (left, right) {
        (None, None) => true,
        (None, _) | (_, None) => false,
        (Some(Primitive::Text(a)), Some(Primitive::Text(b))) => a == b,
        (Some(Primitive::Number(a)), Some(Primitive::Number(b))) => a == b,
        (Some(Primitive::Number(n)), Some(Primitive::Text(s)))
        | (Some(Primitive::Text(s)), Some(Primitive::Number(n))) => n == parse_number(s),
    }
}

/// Strict equality: same kind and same value, numbers compared by value
///
/// Two absent values are equal; absent never equals `Null`.
pub fn strict_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Value::Null), Some(Value::Null)) => true,
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a == b,
        (Some(Value::Text(a)), Some(Value::Text(b))) => a == b,
        (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => a.as_f64() == b.as_f64(),
        _ => false,
    }
}

/// Stringified form used as a grouping key
pub fn key_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Integer(i)) => i.to_string(),
        Some(Value::Float(f)) => number_string(*f),
        Some(Value::Text(s)) => s.clone(),
    }
}

fn number_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

enum SortKey<'a> {
    Number(f64),
    Text(&'a str),
}

fn sort_key(value: &Value) -> SortKey<'_> {
    match value {
        Value::Text(s) => SortKey::Text(s),
        other => SortKey::Number(to_number(Some(other))),
    }
}

/// Ordering for ORDER BY
///
/// Texts compare lexicographically, everything else numerically; numbers sort
/// before texts. Absent values always sort last, whatever the direction.
pub fn compare_for_sort(left: Option<&Value>, right: Option<&Value>, descending: bool) -> Ordering {
    let (left, right) = match (left, right) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(l), Some(r)) => (l, r),
    };

    let ordering = match (sort_key(left), sort_key(right)) {
        (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(&b),
        (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
    };

    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(Some(&text(" 42 "))), 42.0);
        assert_eq!(to_number(Some(&text(""))), 0.0);
        assert_eq!(to_number(Some(&text("0x10"))), 16.0);
        assert_eq!(to_number(Some(&Value::Null)), 0.0);
        assert_eq!(to_number(Some(&Value::Bool(true))), 1.0);
        assert!(to_number(Some(&text("abc"))).is_nan());
        assert!(to_number(Some(&text("inf"))).is_nan());
        assert!(to_number(None).is_nan());
    }

    #[test]
    fn test_loose_eq_coerces_text_and_numbers() {
        assert!(loose_eq(Some(&Value::Integer(5)), Some(&text("5"))));
        assert!(loose_eq(Some(&text("5")), Some(&Value::Float(5.0))));
        assert!(loose_eq(Some(&Value::Bool(true)), Some(&Value::Integer(1))));
        assert!(!loose_eq(Some(&Value::Bool(true)), Some(&text("true"))));
        assert!(!loose_eq(Some(&text("Sales")), Some(&text("sales"))));
    }

    #[test]
    fn test_loose_eq_nullish() {
        assert!(loose_eq(None, Some(&Value::Null)));
        assert!(!loose_eq(None, Some(&Value::Integer(0))));
        assert!(!loose_eq(Some(&Value::Null), Some(&text(""))));
    }

    #[test]
    fn test_strict_eq() {
        assert!(strict_eq(Some(&Value::Integer(1)), Some(&Value::Float(1.0))));
        assert!(!strict_eq(Some(&Value::Integer(1)), Some(&text("1"))));
        assert!(strict_eq(None, None));
        assert!(!strict_eq(None, Some(&Value::Null)));
    }

    #[test]
    fn test_key_string() {
        assert_eq!(key_string(Some(&Value::Integer(3))), "3");
        assert_eq!(key_string(Some(&Value::Float(2.5))), "2.5");
        assert_eq!(key_string(Some(&Value::Null)), "null");
        assert_eq!(key_string(None), "undefined");
    }

    #[test]
    fn test_compare_for_sort_absent_last_both_directions() {
        let one = Value::Integer(1);
        assert_eq!(compare_for_sort(None, Some(&one), false), Ordering::Greater);
        assert_eq!(compare_for_sort(None, Some(&one), true), Ordering::Greater);
        assert_eq!(
            compare_for_sort(Some(&Value::Integer(2)), Some(&one), true),
            Ordering::Less
        );
        assert_eq!(
            compare_for_sort(Some(&text("10")), Some(&text("9")), false),
            Ordering::Less
        );
    }
}

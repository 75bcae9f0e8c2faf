//! Per-message gathering: build an outgoing record from an incoming one.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::config::{Conversion, FieldRule, FieldSource, MessageMapping};
use crate::types::{Record, Value};

/// Reshape `message` according to `mapping`.
///
/// Without a mapping (or with an empty one) the message is returned unchanged. Otherwise the
/// output has exactly the mapping's keys, in mapping order. For each key, in precedence order:
///
/// 1. a `geojson_point` rule whose longitude and latitude fields both exist yields
///    `{"type": "Point", "coordinates": [lon, lat]}`
/// 2. a rule whose `source_attribute` is present and non-null yields that value after case
///    conversion, datetime conversion and prefixing
/// 3. a literal field name that is present and non-null is copied
/// 4. anything else is `null`
///
/// Values that cannot be converted (non-numeric coordinates, unparseable datetimes, case
/// conversion of non-strings) degrade to `null`; this function never fails.
pub fn gather_message(message: Record, mapping: Option<&MessageMapping>) -> Record {
    let Some(mapping) = mapping.filter(|m| !m.is_empty()) else {
        return message;
    };

    mapping
        .iter()
        .map(|(out_key, source)| (out_key.clone(), gather_field(&message, source)))
        .collect()
}

fn gather_field(message: &Record, source: &FieldSource) -> Value {
    match source {
        FieldSource::Rule(rule) => {
            if let Some(point) = geojson_point(message, rule) {
                return point;
            }
            match rule
                .source_attribute
                .as_ref()
                .and_then(|attr| present(message, attr))
            {
                Some(value) => apply_rule(value.clone(), rule).unwrap_or(Value::Null),
                None => Value::Null,
            }
        }
        FieldSource::Attribute(attr) => present(message, attr).cloned().unwrap_or(Value::Null),
    }
}

fn present<'a>(message: &'a Record, key: &str) -> Option<&'a Value> {
    message.get(key).filter(|v| !v.is_null())
}

/// `None` when the rule is not a geo-point rule or its fields are absent; a `null` value when
/// the fields exist but are not numeric.
fn geojson_point(message: &Record, rule: &FieldRule) -> Option<Value> {
    if rule.conversion != Some(Conversion::GeojsonPoint) {
        return None;
    }
    let lon = message.get(rule.longitude_attribute.as_deref()?)?;
    let lat = message.get(rule.latitude_attribute.as_deref()?)?;

    let point = match (lon.to_f64(), lat.to_f64()) {
        (Some(lon), Some(lat)) => {
            let mut point = Record::new();
            point.insert("type".to_string(), Value::from("Point"));
            point.insert(
                "coordinates".to_string(),
                Value::List(vec![Value::Float64(lon), Value::Float64(lat)]),
            );
            Value::Object(point)
        }
        _ => Value::Null,
    };
    Some(point)
}

/// Case conversion, then datetime conversion, then prefixing.
fn apply_rule(value: Value, rule: &FieldRule) -> Option<Value> {
    let value = match rule.conversion {
        Some(Conversion::Lowercase) => Value::Utf8(value.as_str()?.to_lowercase()),
        Some(Conversion::Uppercase) => Value::Utf8(value.as_str()?.to_uppercase()),
        Some(Conversion::Capitalize) => Value::Utf8(capitalize(value.as_str()?)),
        Some(Conversion::Datetime) => Value::Utf8(convert_datetime(&value, rule.format_from(), rule.format_to())?),
        Some(Conversion::GeojsonPoint) | None => value,
    };

    Some(match &rule.prefix_value {
        Some(prefix) => Value::Utf8(format!("{prefix}{}", value.to_text())),
        None => value,
    })
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Reformat a datetime. Integers are epoch milliseconds in UTC (sub-second part dropped);
/// strings are parsed with `format_from`.
fn convert_datetime(value: &Value, format_from: &str, format_to: &str) -> Option<String> {
    let parsed: NaiveDateTime = match value {
        Value::Int64(millis) => DateTime::from_timestamp(millis / 1000, 0)?.naive_utc(),
        Value::Utf8(s) => parse_naive(s, format_from)?,
        _ => return None,
    };

    let mut out = String::new();
    write!(out, "{}", parsed.format(format_to)).ok()?;
    Some(out)
}

fn parse_naive(s: &str, format: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: &str, conversion: Option<Conversion>) -> FieldRule {
        FieldRule {
            source_attribute: Some(source.to_string()),
            conversion,
            ..Default::default()
        }
    }

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("hELLO wORLD"), "Hello world");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn case_conversions_apply_to_strings_only() {
        let r = rule("s", Some(Conversion::Uppercase));
        assert_eq!(apply_rule(Value::from("abc"), &r), Some(Value::from("ABC")));
        assert_eq!(apply_rule(Value::Int64(1), &r), None);
    }

    #[test]
    fn datetime_reformats_strings() {
        assert_eq!(
            convert_datetime(&Value::from("16-11-2023 09:30"), "%d-%m-%Y %H:%M", "%Y-%m-%dT%H:%M:%SZ"),
            Some("2023-11-16T09:30:00Z".to_string())
        );
        assert_eq!(
            convert_datetime(&Value::from("2023-11-16"), "%Y-%m-%d", "%d/%m/%Y %H:%M"),
            Some("16/11/2023 00:00".to_string())
        );
    }

    #[test]
    fn datetime_truncates_epoch_millis() {
        assert_eq!(
            convert_datetime(&Value::Int64(1_700_000_000_999), "%Y", "%Y-%m-%dT%H:%M:%SZ"),
            Some("2023-11-14T22:13:20Z".to_string())
        );
    }

    #[test]
    fn datetime_degrades_on_bad_input() {
        assert_eq!(convert_datetime(&Value::from("yesterday"), "%Y-%m-%d", "%Y"), None);
        assert_eq!(convert_datetime(&Value::Float64(1.5), "%Y", "%Y"), None);
    }

    #[test]
    fn prefix_uses_text_form_of_numbers() {
        let r = FieldRule {
            prefix_value: Some("NR-".to_string()),
            ..rule("n", None)
        };
        assert_eq!(apply_rule(Value::Int64(42), &r), Some(Value::from("NR-42")));
    }
}

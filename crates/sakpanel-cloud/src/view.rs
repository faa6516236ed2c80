//! View-model normalization helpers
//!
//! Upstream APIs disagree on how they encode identifiers, numbers, flags and
//! timestamps. These helpers fold them into one convention at the adapter
//! boundary:
//!
//! - identifiers become strings, `""` when absent
//! - numbers accept JSON numbers or numeric strings, `0` when absent
//! - flags accept booleans or `"True"`/`"False"`, `false` when absent
//! - `null` collections become empty vectors
//! - timestamps are RFC 3339 in UTC with second precision, `""` when absent

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Format a timestamp in the single view-model format.
pub fn format_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Normalize an upstream RFC 3339 string to UTC. Unparseable input yields `""`.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return String::new();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => format_datetime(&dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Unparseable timestamp {:?}: {}", raw, e);
            String::new()
        }
    }
}

/// Format a Unix epoch (seconds) in UTC. Zero or negative yields `""`.
pub fn format_unix(secs: i64) -> String {
    if secs <= 0 {
        return String::new();
    }
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| format_datetime(&dt))
        .unwrap_or_default()
}

/// Billing month (`YYYY-MM`) from an RFC 3339 timestamp.
pub fn format_month(raw: Option<&str>) -> String {
    raw.and_then(|r| DateTime::parse_from_rfc3339(r.trim()).ok())
        .map(|dt| dt.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Serde deserializers for lenient upstream fields
pub mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Bool(bool),
        Int(i64),
        UInt(u64),
        Float(f64),
        Str(String),
    }

    /// Identifier encoded as a string or a number
    pub fn string_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Str(s)) => s,
            Some(Scalar::Int(n)) => n.to_string(),
            Some(Scalar::UInt(n)) => n.to_string(),
            Some(Scalar::Float(n)) => format!("{}", n as i64),
            Some(Scalar::Bool(_)) | None => String::new(),
        })
    }

    /// Integer encoded as a number or a numeric string
    pub fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Int(n)) => n,
            Some(Scalar::UInt(n)) => i64::try_from(n).unwrap_or(i64::MAX),
            Some(Scalar::Float(n)) => n as i64,
            Some(Scalar::Str(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                    .unwrap_or_default()
            }
            Some(Scalar::Bool(_)) | None => 0,
        })
    }

    /// Float encoded as a number or a numeric string
    pub fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Int(n)) => n as f64,
            Some(Scalar::UInt(n)) => n as f64,
            Some(Scalar::Float(n)) => n,
            Some(Scalar::Str(s)) => s.trim().parse().unwrap_or_default(),
            Some(Scalar::Bool(_)) | None => 0.0,
        })
    }

    /// Flag encoded as a boolean or `"True"`/`"False"`
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Bool(b)) => b,
            Some(Scalar::Str(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
            Some(Scalar::Int(n)) => n != 0,
            Some(Scalar::UInt(n)) => n != 0,
            Some(Scalar::Float(_)) | None => false,
        })
    }

    /// `null` becomes the type's default (empty vector, empty string, ...)
    pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wire {
        #[serde(default, deserialize_with = "de::string_id")]
        id: String,
        #[serde(default, deserialize_with = "de::lenient_i64")]
        weight: i64,
        #[serde(default, deserialize_with = "de::flag")]
        enabled: bool,
        #[serde(default, deserialize_with = "de::null_default")]
        tags: Vec<String>,
    }

    #[test]
    fn test_lenient_fields() {
        let wire: Wire =
            serde_json::from_str(r#"{"id":113600012345,"weight":"10","enabled":"True","tags":null}"#)
                .unwrap();
        assert_eq!(wire.id, "113600012345");
        assert_eq!(wire.weight, 10);
        assert!(wire.enabled);
        assert!(wire.tags.is_empty());

        let wire: Wire = serde_json::from_str(r#"{"id":"abc","enabled":false}"#).unwrap();
        assert_eq!(wire.id, "abc");
        assert_eq!(wire.weight, 0);
        assert!(!wire.enabled);

        let wire: Wire = serde_json::from_str(r#"{"id":null,"weight":null,"enabled":null}"#).unwrap();
        assert_eq!(wire.id, "");
        assert_eq!(wire.weight, 0);
    }

    #[test]
    fn test_timestamp_format_is_uniform() {
        assert_eq!(
            format_timestamp(Some("2024-05-01T09:30:00+09:00")),
            "2024-05-01T00:30:00Z"
        );
        assert_eq!(
            format_timestamp(Some("2024-05-01T00:30:00.123456Z")),
            "2024-05-01T00:30:00Z"
        );
        assert_eq!(format_timestamp(Some("yesterday")), "");
        assert_eq!(format_timestamp(None), "");
        assert_eq!(format_unix(1_700_000_000), "2023-11-14T22:13:20Z");
        assert_eq!(format_unix(0), "");

        // one instant, one rendering
        assert_eq!(
            format_timestamp(Some("2023-11-15T07:13:20+09:00")),
            format_unix(1_700_000_000)
        );
    }

    #[test]
    fn test_format_month() {
        assert_eq!(format_month(Some("2024-03-01T00:00:00+09:00")), "2024-03");
        assert_eq!(format_month(None), "");
    }
}

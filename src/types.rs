use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Primary key of a developer as issued by the roster endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeveloperId(pub u64);

impl fmt::Display for DeveloperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A roster entry returned by `GET developers/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Developer {
    pub id: DeveloperId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A model score, or `"N/A"` when the metric could not be fetched.
///
/// On the wire this is either a JSON number or the literal string `"N/A"`.
/// Numeric strings are accepted on read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Value(f64),
    NotAvailable,
}

impl Score {
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Value(v) => Some(*v),
            Score::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Score::Value(_))
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::Value(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Value(v) if v.fract() == 0.0 => write!(f, "{:.0}", v),
            Score::Value(v) => write!(f, "{}", v),
            Score::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

const NOT_AVAILABLE: &str = "N/A";

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Value(v) => serializer.serialize_f64(*v),
            Score::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawScore {
            Number(f64),
            Text(String),
        }

        match RawScore::deserialize(deserializer)? {
            RawScore::Number(v) => Ok(Score::Value(v)),
            RawScore::Text(text) if text.trim() == NOT_AVAILABLE => Ok(Score::NotAvailable),
            RawScore::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Score::Value)
                .map_err(|_| serde::de::Error::custom(format!("invalid score: {:?}", text))),
        }
    }
}

/// Category label attached to a metric record.
///
/// `Error` is synthesized client-side for fetches that failed; anything the
/// service sends outside the known labels is kept verbatim in `Other`.
/// Ordering follows declaration order, which is also presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    High,
    Medium,
    Low,
    Error,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::High => "High",
            Status::Medium => "Medium",
            Status::Low => "Low",
            Status::Error => "Error",
            Status::Other(label) => label,
        }
    }
}

impl From<String> for Status {
    fn from(label: String) -> Self {
        match label.as_str() {
            "High" => Status::High,
            "Medium" => Status::Medium,
            "Low" => Status::Low,
            "Error" => Status::Error,
            _ => Status::Other(label),
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_score_accepts_number_na_and_numeric_string() {
        let s: Score = serde_json::from_value(json!(85)).unwrap();
        assert_eq!(s, Score::Value(85.0));
        let s: Score = serde_json::from_value(json!("N/A")).unwrap();
        assert_eq!(s, Score::NotAvailable);
        let s: Score = serde_json::from_value(json!("72.5")).unwrap();
        assert_eq!(s, Score::Value(72.5));
        assert!(serde_json::from_value::<Score>(json!("lots")).is_err());
    }

    #[test]
    fn test_score_serializes_na_as_string() {
        assert_eq!(serde_json::to_value(Score::NotAvailable).unwrap(), json!("N/A"));
        assert_eq!(serde_json::to_value(Score::Value(30.0)).unwrap(), json!(30.0));
    }

    #[test]
    fn test_score_display() {
        assert_eq!(Score::Value(85.0).to_string(), "85");
        assert_eq!(Score::Value(72.45).to_string(), "72.45");
        assert_eq!(Score::NotAvailable.to_string(), "N/A");
    }

    #[test]
    fn test_status_keeps_unknown_labels() {
        let s: Status = serde_json::from_value(json!("Critical")).unwrap();
        assert_eq!(s, Status::Other("Critical".to_string()));
        assert_eq!(serde_json::to_value(&s).unwrap(), json!("Critical"));
        let s: Status = serde_json::from_value(json!("Medium")).unwrap();
        assert_eq!(s, Status::Medium);
    }

    #[test]
    fn test_developer_email_optional() {
        let dev: Developer = serde_json::from_value(json!({"id": 1, "name": "Alice"})).unwrap();
        assert_eq!(dev.id, DeveloperId(1));
        assert!(dev.email.is_none());
    }
}

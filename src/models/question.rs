use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sqlx::FromRow;

/// A question in a category bank.
///
/// `options` holds the raw JSON object text as stored, keyed by option letter,
/// e.g. `{"A": "Borrow", "B": "Move"}`. `answer` is the canonical answer text
/// compared verbatim against a candidate's selection.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub category_id: i64,
    pub question: String,
    pub options: String,
    pub answer: String,
    pub status_flag: String,
    pub created_date: Option<DateTime<Utc>>,
}

impl Question {
    pub fn parse_options(&self) -> Result<Map<String, JsonValue>, serde_json::Error> {
        serde_json::from_str(&self.options)
    }

    /// Option texts in the order the stored mapping iterates.
    pub fn option_values(&self) -> Result<Vec<String>, serde_json::Error> {
        Ok(self
            .parse_options()?
            .into_iter()
            .map(|(_, value)| match value {
                JsonValue::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    /// Parsed options object, or the raw text when it does not parse.
    pub fn options_or_raw(&self) -> JsonValue {
        match self.parse_options() {
            Ok(map) => JsonValue::Object(map),
            Err(_) => JsonValue::String(self.options.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &str) -> Question {
        Question {
            id: 1,
            category_id: 1,
            question: "Which keyword moves ownership?".into(),
            options: options.into(),
            answer: "move".into(),
            status_flag: "A".into(),
            created_date: None,
        }
    }

    #[test]
    fn option_values_follow_mapping() {
        let q = question(r#"{"A":"move","B":"ref","C":3}"#);
        assert_eq!(q.option_values().unwrap(), vec!["move", "ref", "3"]);
    }

    #[test]
    fn unparseable_options_fall_back_to_raw() {
        let q = question("A) move B) ref");
        assert!(q.option_values().is_err());
        assert_eq!(q.options_or_raw(), JsonValue::String("A) move B) ref".into()));
    }
}

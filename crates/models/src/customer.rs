use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Customer record as stored in the directory and exchanged over HTTP.
///
/// Field names are camelCase on the wire:
/// `{"id":1,"firstName":"John","lastName":"Doe","dateOfBirth":"1990-05-15"}`.
/// The `id` is supplied by the caller and never generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(with = "date_format")]
    pub date_of_birth: NaiveDate,
}

impl Customer {
    pub fn new(id: i32, first_name: &str, last_name: &str, date_of_birth: NaiveDate) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth,
        }
    }

    /// Overwrite the mutable fields from `other`; the id stays as is.
    pub fn apply_update(&mut self, other: &Customer) {
        self.first_name = other.first_name.clone();
        self.last_name = other.last_name.clone();
        self.date_of_birth = other.date_of_birth;
    }

    /// Whether `first_name` or `last_name` contains `fragment`, ignoring case.
    ///
    /// Comparison is ordinal: each char is replaced by its simple (single char)
    /// uppercase mapping, and no locale rules apply. An empty fragment matches
    /// every customer.
    pub fn name_contains(&self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return true;
        }
        let needle = fold_case(fragment);
        fold_case(&self.first_name).contains(&needle) || fold_case(&self.last_name).contains(&needle)
    }
}

fn fold_case(s: &str) -> String {
    s.chars().map(simple_upper).collect()
}

/// Chars whose uppercase form expands to several chars (`ß` → `SS`) stay as they are.
fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Parse a date of birth from `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// date-time or an RFC 3339 timestamp. The time of day is dropped.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ModelError> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Ok(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    Err(ModelError::Validation(format!("invalid date: {raw:?}")))
}

const DATE_FORMAT: &str = "%Y-%m-%d";

mod date_format {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(super::DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(D::Error::custom)
    }
}

/// Sample customers inserted at start-up when seeding is enabled.
pub fn sample_customers() -> Vec<Customer> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    vec![
        Customer::new(1, "John", "Doe", date(1990, 5, 15)),
        Customer::new(2, "Jane", "Smith", date(1985, 8, 20)),
        Customer::new(3, "Michael", "Johnson", date(1982, 11, 10)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serializes_camel_case_with_plain_date() {
        let c = Customer::new(1, "John", "Doe", ymd(1990, 5, 15));
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(
            v,
            json!({"id": 1, "firstName": "John", "lastName": "Doe", "dateOfBirth": "1990-05-15"})
        );
    }

    #[test]
    fn accepts_datetime_forms_for_date_of_birth() {
        for raw in ["1985-08-20", "1985-08-20T00:00:00", "1985-08-20T13:45:00.123", "1985-08-20T00:00:00Z"] {
            let c: Customer = serde_json::from_value(
                json!({"id": 2, "firstName": "Jane", "lastName": "Smith", "dateOfBirth": raw}),
            )
            .unwrap_or_else(|e| panic!("{raw}: {e}"));
            assert_eq!(c.date_of_birth, ymd(1985, 8, 20), "{raw}");
        }
    }

    #[test]
    fn rejects_garbage_date() {
        let res: Result<Customer, _> =
            serde_json::from_value(json!({"id": 2, "dateOfBirth": "20th of August"}));
        assert!(res.is_err());
        assert!(matches!(parse_date("1985-13-01"), Err(ModelError::Validation(_))));
    }

    #[test]
    fn missing_names_default_to_empty() {
        let c: Customer = serde_json::from_value(json!({"id": 9, "dateOfBirth": "2000-01-01"})).unwrap();
        assert_eq!(c.first_name, "");
        assert_eq!(c.last_name, "");
    }

    #[test]
    fn name_contains_is_case_insensitive_on_both_names() {
        let c = Customer::new(3, "Michael", "Johnson", ymd(1982, 11, 10));
        assert!(c.name_contains("john"));
        assert!(c.name_contains("MICH"));
        assert!(c.name_contains("sOn"));
        assert!(c.name_contains(""));
        assert!(!c.name_contains("smith"));
    }

    #[test]
    fn name_contains_folds_non_ascii() {
        let c = Customer::new(4, "Émile", "Öztürk", ymd(1970, 1, 1));
        assert!(c.name_contains("émile"));
        assert!(c.name_contains("ÖZ"));
    }

    #[test]
    fn name_contains_uses_simple_case_mapping_only() {
        let dotted = Customer::new(5, "İlker", "Başar", ymd(1975, 3, 3));
        assert!(!dotted.name_contains("i"));
        assert!(dotted.name_contains("İL"));

        let kelvin = Customer::new(6, "\u{212A}im", "Lee", ymd(1988, 8, 8));
        assert!(!kelvin.name_contains("kim"));
        assert!(kelvin.name_contains("\u{212A}IM"));

        let sharp = Customer::new(7, "Strauß", "Weiß", ymd(1960, 6, 6));
        assert!(sharp.name_contains("STRAUß"));
        assert!(!sharp.name_contains("strauss"));
    }

    #[test]
    fn apply_update_keeps_id() {
        let mut c = Customer::new(1, "John", "Doe", ymd(1990, 5, 15));
        c.apply_update(&Customer::new(99, "Johnny", "Dough", ymd(1991, 6, 16)));
        assert_eq!(c, Customer::new(1, "Johnny", "Dough", ymd(1991, 6, 16)));
    }

    #[test]
    fn sample_customers_are_the_three_seed_records() {
        let seed = sample_customers();
        assert_eq!(seed.len(), 3);
        assert_eq!(seed[1], Customer::new(2, "Jane", "Smith", ymd(1985, 8, 20)));
    }
}

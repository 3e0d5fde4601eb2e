use serde::{Deserialize, Deserializer};
use time::Date;

use crate::auth::services::is_valid_email;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// `YYYY-MM-DD` (de)serialization for calendar dates.
pub mod iso_date {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(S::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn parse(text: &str) -> Result<Date, time::error::Parse> {
        Date::parse(text, format_description!("[year]-[month]-[day]"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let text = String::deserialize(d)?;
        parse(&text).map_err(D::Error::custom)
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Date>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(text) => parse(&text).map(Some).map_err(D::Error::custom),
            None => Ok(None),
        }
    }
}

/// Present-but-null becomes `Some(None)`; absent stays `None` via `#[serde(default)]`.
fn nullable<'de, D, T>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(deserialize_with = "iso_date::deserialize")]
    pub birthday: Date,
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl ContactInput {
    pub fn validate(&self) -> Result<(), String> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("phone", &self.phone)?;
        require_email(&self.email)
    }
}

/// Partial update: only fields present in the body are written.
/// `additional_info: null` clears it; the required fields cannot be cleared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "iso_date::deserialize_option")]
    pub birthday: Option<Date>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Option<Option<String>>,
}

impl ContactUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(v) = &self.first_name {
            require_text("first_name", v)?;
        }
        if let Some(v) = &self.last_name {
            require_text("last_name", v)?;
        }
        if let Some(v) = &self.phone {
            require_text("phone", v)?;
        }
        if let Some(v) = &self.email {
            require_email(v)?;
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

fn require_email(value: &str) -> Result<(), String> {
    if !is_valid_email(value) {
        return Err("email is not a valid email address".into());
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Pagination {
    /// (skip, limit) with skip >= 0 and limit in 0..=MAX_LIMIT.
    pub fn clamped(&self) -> (i64, i64) {
        (self.skip.max(0), self.limit.clamp(0, MAX_LIMIT))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn input_parses_iso_birthday() {
        let input: ContactInput = serde_json::from_value(json!({
            "first_name": "A", "last_name": "B", "email": "a@x.com",
            "phone": "1", "birthday": "2000-01-01"
        }))
        .unwrap();
        assert_eq!(input.birthday, date!(2000 - 01 - 01));
        assert_eq!(input.additional_info, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn input_rejects_bad_date() {
        let res = serde_json::from_value::<ContactInput>(json!({
            "first_name": "A", "last_name": "B", "email": "a@x.com",
            "phone": "1", "birthday": "01/01/2000"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn input_validation_names_the_field() {
        let input: ContactInput = serde_json::from_value(json!({
            "first_name": "  ", "last_name": "B", "email": "a@x.com",
            "phone": "1", "birthday": "2000-01-01"
        }))
        .unwrap();
        assert!(input.validate().unwrap_err().contains("first_name"));

        let input: ContactInput = serde_json::from_value(json!({
            "first_name": "A", "last_name": "B", "email": "nope",
            "phone": "1", "birthday": "2000-01-01"
        }))
        .unwrap();
        assert!(input.validate().unwrap_err().contains("email"));
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let absent: ContactUpdate = serde_json::from_value(json!({ "first_name": "Z" })).unwrap();
        assert_eq!(absent.first_name.as_deref(), Some("Z"));
        assert_eq!(absent.phone, None);
        assert_eq!(absent.additional_info, None);

        let cleared: ContactUpdate =
            serde_json::from_value(json!({ "additional_info": null })).unwrap();
        assert_eq!(cleared.additional_info, Some(None));

        let dated: ContactUpdate =
            serde_json::from_value(json!({ "birthday": "1999-12-31" })).unwrap();
        assert_eq!(dated.birthday, Some(date!(1999 - 12 - 31)));
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { skip: -5, limit: 0 };
        assert_eq!(p.clamped(), (0, 0));
        let p = Pagination { skip: 3, limit: 10_000 };
        assert_eq!(p.clamped(), (3, MAX_LIMIT));
    }
}

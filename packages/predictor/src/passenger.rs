//! Passenger form input and the single-row record handed to the model.

use crate::error::InputError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Number of columns in a [`PassengerRecord`].
pub const FEATURE_COUNT: usize = 6;

/// Column order of the structured record.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["Pclass", "Sex", "Age", "Fare", "Embarked", "Familyno"];

/// Raw form fields as posted by the browser.
///
/// Every field is optional so that a missing value becomes an inline input
/// error instead of an extractor rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PassengerForm {
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub fare: Option<String>,
    #[serde(default)]
    pub sibsp: Option<String>,
    #[serde(default)]
    pub parch: Option<String>,
    #[serde(default)]
    pub pclass: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pclass {
    First = 1,
    Second = 2,
    Third = 3,
}

/// Encoded as in the form: 0 = female, 1 = male.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Female = 0,
    Male = 1,
}

/// Port of embarkation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embarked {
    Cherbourg,
    Queenstown,
    Southampton,
}

impl Embarked {
    /// Stand-in for the real port, which the form does not collect.
    ///
    /// Existing artifacts were fitted with this exact mapping, so it must
    /// stay keyed off sex: female -> `S`, male -> `C`.
    pub fn placeholder_for(sex: Sex) -> Self {
        match sex {
            Sex::Female => Embarked::Southampton,
            Sex::Male => Embarked::Cherbourg,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Embarked::Cherbourg => 'C',
            Embarked::Queenstown => 'Q',
            Embarked::Southampton => 'S',
        }
    }

    /// Ordinal encoding used for numeric models: C = 0, Q = 1, S = 2.
    pub fn ordinal(&self) -> f64 {
        match self {
            Embarked::Cherbourg => 0.0,
            Embarked::Queenstown => 1.0,
            Embarked::Southampton => 2.0,
        }
    }
}

/// One validated passenger, in the column order the model was fitted on.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerRecord {
    pub pclass: Pclass,
    pub sex: Sex,
    pub age: f64,
    pub fare: f64,
    pub embarked: Embarked,
    pub familyno: u32,
}

impl PassengerRecord {
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.pclass as u8 as f64,
            self.sex as u8 as f64,
            self.age,
            self.fare,
            self.embarked.ordinal(),
            self.familyno as f64,
        ]
    }
}

impl fmt::Display for PassengerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pclass={} Sex={} Age={} Fare={} Embarked={} Familyno={}",
            self.pclass as u8,
            self.sex as u8,
            self.age,
            self.fare,
            self.embarked.code(),
            self.familyno
        )
    }
}

impl TryFrom<&PassengerForm> for PassengerRecord {
    type Error = InputError;

    fn try_from(form: &PassengerForm) -> Result<Self, Self::Error> {
        let age = parse_float("age", &form.age)?;
        let fare = parse_float("fare", &form.fare)?;
        let sibsp = parse_count("sibsp", &form.sibsp)?;
        let parch = parse_count("parch", &form.parch)?;

        let pclass = match parse_number::<i64>("pclass", &form.pclass)? {
            1 => Pclass::First,
            2 => Pclass::Second,
            3 => Pclass::Third,
            other => {
                return Err(InputError::OutOfRange {
                    field: "pclass",
                    expected: "1, 2 or 3",
                    value: other.to_string(),
                });
            }
        };
        let sex = match parse_number::<i64>("sex", &form.sex)? {
            0 => Sex::Female,
            1 => Sex::Male,
            other => {
                return Err(InputError::OutOfRange {
                    field: "sex",
                    expected: "0 or 1",
                    value: other.to_string(),
                });
            }
        };

        let familyno = sibsp.checked_add(parch).ok_or(InputError::OutOfRange {
            field: "familyno",
            expected: "a reasonable family size",
            value: format!("{sibsp} + {parch}"),
        })?;

        Ok(PassengerRecord {
            pclass,
            sex,
            age,
            fare,
            embarked: Embarked::placeholder_for(sex),
            familyno,
        })
    }
}

fn parse_number<T>(field: &'static str, raw: &Option<String>) -> Result<T, InputError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = raw.as_deref().ok_or(InputError::Missing(field))?;
    value
        .trim()
        .parse::<T>()
        .map_err(|e| InputError::InvalidNumber {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_float(field: &'static str, raw: &Option<String>) -> Result<f64, InputError> {
    let value: f64 = parse_number(field, raw)?;
    if !value.is_finite() {
        return Err(InputError::OutOfRange {
            field,
            expected: "a finite number",
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse_count(field: &'static str, raw: &Option<String>) -> Result<u32, InputError> {
    let value: i64 = parse_number(field, raw)?;
    u32::try_from(value).map_err(|_| InputError::OutOfRange {
        field,
        expected: "a non-negative count",
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(age: &str, fare: &str, sibsp: &str, parch: &str, pclass: &str, sex: &str) -> PassengerForm {
        PassengerForm {
            age: Some(age.into()),
            fare: Some(fare.into()),
            sibsp: Some(sibsp.into()),
            parch: Some(parch.into()),
            pclass: Some(pclass.into()),
            sex: Some(sex.into()),
        }
    }

    #[test]
    fn test_familyno_is_sibsp_plus_parch() {
        let record = PassengerRecord::try_from(&form("29", "7.25", "1", "2", "3", "1")).unwrap();
        assert_eq!(record.familyno, 3);
    }

    #[test]
    fn test_embarked_placeholder_follows_sex() {
        let female = PassengerRecord::try_from(&form("29", "7.25", "0", "0", "3", "0")).unwrap();
        let male = PassengerRecord::try_from(&form("29", "7.25", "0", "0", "3", "1")).unwrap();
        assert_eq!(female.embarked.code(), 'S');
        assert_eq!(male.embarked.code(), 'C');
    }

    #[test]
    fn test_features_follow_column_order() {
        let record =
            PassengerRecord::try_from(&form(" 38 ", "71.2833", "1", "0", "1", "0")).unwrap();
        assert_eq!(record.features(), [1.0, 0.0, 38.0, 71.2833, 2.0, 1.0]);
        assert_eq!(FEATURE_COLUMNS[4], "Embarked");
    }

    #[test]
    fn test_invalid_age_reports_field_and_value() {
        let err = PassengerRecord::try_from(&form("abc", "7.25", "0", "0", "3", "1")).unwrap_err();
        match &err {
            InputError::InvalidNumber { field, value, .. } => {
                assert_eq!(*field, "age");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("age=\"abc\""));
    }

    #[test]
    fn test_integer_fields_reject_decimals() {
        let err = PassengerRecord::try_from(&form("29", "7.25", "1.5", "0", "3", "1")).unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber { field: "sibsp", .. }));
    }

    #[test]
    fn test_missing_field() {
        let mut input = form("29", "7.25", "0", "0", "3", "1");
        input.fare = None;
        let err = PassengerRecord::try_from(&input).unwrap_err();
        assert_eq!(err, InputError::Missing("fare"));
        assert_eq!(err.to_string(), "missing field 'fare'");
    }

    #[test]
    fn test_out_of_range_values() {
        let err = PassengerRecord::try_from(&form("29", "7.25", "0", "0", "4", "1")).unwrap_err();
        assert!(matches!(err, InputError::OutOfRange { field: "pclass", .. }));

        let err = PassengerRecord::try_from(&form("29", "7.25", "0", "0", "2", "2")).unwrap_err();
        assert!(matches!(err, InputError::OutOfRange { field: "sex", .. }));

        let err = PassengerRecord::try_from(&form("29", "7.25", "-1", "0", "2", "0")).unwrap_err();
        assert!(matches!(err, InputError::OutOfRange { field: "sibsp", .. }));

        let err = PassengerRecord::try_from(&form("inf", "7.25", "0", "0", "2", "0")).unwrap_err();
        assert!(matches!(err, InputError::OutOfRange { field: "age", .. }));
    }

    #[test]
    fn test_first_failing_field_wins() {
        let err = PassengerRecord::try_from(&form("x", "y", "0", "0", "2", "0")).unwrap_err();
        assert!(matches!(err, InputError::InvalidNumber { field: "age", .. }));
    }
}

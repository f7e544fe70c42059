// Structural gate for guest records coming from outside the process:
// uploaded import files and rows read back from the cloud store.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

use crate::domain::errors::GuestRuleError;
use crate::domain::guest::Guest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuestShapeError {
    NotAList,
    NotAnObject,
    MissingId,
    MissingName,
    InvalidPasses,
    InvalidConfirmed,
    Rule(GuestRuleError),
    DuplicateId(String),
    Entry {
        index: usize,
        source: Box<GuestShapeError>,
    },
}

impl fmt::Display for GuestShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestShapeError::NotAList => write!(f, "expected a JSON array of guests"),
            GuestShapeError::NotAnObject => write!(f, "guest must be an object"),
            GuestShapeError::MissingId => write!(f, "id must be a non-empty string"),
            GuestShapeError::MissingName => write!(f, "name must be a non-empty string"),
            GuestShapeError::InvalidPasses => write!(f, "passes must be a whole number"),
            GuestShapeError::InvalidConfirmed => {
                write!(f, "confirmed must be a whole number when present")
            }
            GuestShapeError::Rule(err) => write!(f, "{err}"),
            GuestShapeError::DuplicateId(id) => write!(f, "id {id} appears more than once"),
            GuestShapeError::Entry { index, source } => write!(f, "entry {index}: {source}"),
        }
    }
}

impl std::error::Error for GuestShapeError {}

pub fn is_valid_guest(candidate: &Value) -> bool {
    parse_guest(candidate).is_ok()
}

/// Returns the full list only when every element is a valid guest and ids
/// are unique; any failure rejects the whole list.
pub fn validate_guest_list(candidate: &Value) -> Option<Vec<Guest>> {
    check_guest_list(candidate).ok()
}

pub fn parse_guest(candidate: &Value) -> Result<Guest, GuestShapeError> {
    let object = candidate.as_object().ok_or(GuestShapeError::NotAnObject)?;

    let id = non_empty_str(object, "id").ok_or(GuestShapeError::MissingId)?;
    let name = non_empty_str(object, "name").ok_or(GuestShapeError::MissingName)?;
    let passes = whole_number(object.get("passes")).ok_or(GuestShapeError::InvalidPasses)?;
    let confirmed = match object.get("confirmed") {
        None | Some(Value::Null) => None,
        Some(value) => Some(whole_number(Some(value)).ok_or(GuestShapeError::InvalidConfirmed)?),
    };

    let guest = Guest {
        id: id.to_string(),
        name: name.to_string(),
        passes,
        confirmed,
    };
    guest.check_invariants().map_err(GuestShapeError::Rule)?;

    Ok(guest)
}

pub fn check_guest_list(candidate: &Value) -> Result<Vec<Guest>, GuestShapeError> {
    let items = candidate.as_array().ok_or(GuestShapeError::NotAList)?;

    let mut seen = HashSet::with_capacity(items.len());
    let mut guests = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let guest = parse_guest(item).map_err(|source| GuestShapeError::Entry {
            index,
            source: Box::new(source),
        })?;
        if !seen.insert(guest.id.clone()) {
            return Err(GuestShapeError::DuplicateId(guest.id));
        }
        guests.push(guest);
    }

    Ok(guests)
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn whole_number(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .and_then(|number| u32::try_from(number).ok())
}

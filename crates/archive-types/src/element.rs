use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::{Identifier, Uri};
use crate::short_form::{mal, ShortForm};
use crate::temporal::FineTime;

const fn mal_type(type_number: i32) -> ShortForm {
    ShortForm::new(mal::AREA, mal::SERVICE, mal::VERSION, type_number)
}

/// A single attribute value, used as the right-hand side of filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    Blob(Vec<u8>),
    Boolean(bool),
    Double(f64),
    Identifier(Identifier),
    Long(i64),
    String(String),
    FineTime(FineTime),
    Uri(Uri),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(bytes) => {
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Identifier(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::FineTime(v) => write!(f, "{v}"),
            Self::Uri(v) => write!(f, "{v}"),
        }
    }
}

/// Polymorphic list of archived object bodies.
///
/// Exactly one concrete list type travels per call; its [`ShortForm`] is
/// written in front of the body so the receiver can pick the decoder.
/// Elements are nullable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ElementList {
    Blob(Vec<Option<Vec<u8>>>),
    Boolean(Vec<Option<bool>>),
    Double(Vec<Option<f64>>),
    Identifier(Vec<Option<Identifier>>),
    Long(Vec<Option<i64>>),
    String(Vec<Option<String>>),
    FineTime(Vec<Option<FineTime>>),
    Uri(Vec<Option<Uri>>),
}

impl ElementList {
    pub const BLOB: ShortForm = mal_type(mal::BLOB).list();
    pub const BOOLEAN: ShortForm = mal_type(mal::BOOLEAN).list();
    pub const DOUBLE: ShortForm = mal_type(mal::DOUBLE).list();
    pub const IDENTIFIER: ShortForm = mal_type(mal::IDENTIFIER).list();
    pub const LONG: ShortForm = mal_type(mal::LONG).list();
    pub const STRING: ShortForm = mal_type(mal::STRING).list();
    pub const FINE_TIME: ShortForm = mal_type(mal::FINE_TIME).list();
    pub const URI: ShortForm = mal_type(mal::URI).list();

    pub fn short_form(&self) -> ShortForm {
        match self {
            Self::Blob(_) => Self::BLOB,
            Self::Boolean(_) => Self::BOOLEAN,
            Self::Double(_) => Self::DOUBLE,
            Self::Identifier(_) => Self::IDENTIFIER,
            Self::Long(_) => Self::LONG,
            Self::String(_) => Self::STRING,
            Self::FineTime(_) => Self::FINE_TIME,
            Self::Uri(_) => Self::URI,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Blob(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Identifier(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::String(v) => v.len(),
            Self::FineTime(v) => v.len(),
            Self::Uri(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_short_forms_are_negated() {
        assert_eq!(ElementList::LONG.type_number(), -mal::LONG);
        assert!(ElementList::STRING.is_list());
        assert_eq!(ElementList::LONG.list(), mal_type(mal::LONG));
    }

    #[test]
    fn list_short_forms_are_unique() {
        let mut tags = vec![
            ElementList::BLOB,
            ElementList::BOOLEAN,
            ElementList::DOUBLE,
            ElementList::IDENTIFIER,
            ElementList::LONG,
            ElementList::STRING,
            ElementList::FINE_TIME,
            ElementList::URI,
        ];
        let len = tags.len();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), len);
    }

    #[test]
    fn len_counts_nulls() {
        let list = ElementList::String(vec![Some("a".into()), None, Some("c".into())]);
        assert_eq!(list.len(), 3);
        assert!(!list.is_empty());
    }

    #[test]
    fn attribute_display() {
        assert_eq!(Attribute::Blob(vec![0xab, 0x01]).to_string(), "ab01");
        assert_eq!(Attribute::String("temp".into()).to_string(), "temp");
        assert_eq!(Attribute::Long(-3).to_string(), "-3");
    }
}

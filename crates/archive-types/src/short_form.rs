use std::fmt;

use serde::{Deserialize, Serialize};

/// Area, service and version numbers of the MAL base area.
pub mod mal {
    pub const AREA: u16 = 1;
    pub const SERVICE: u16 = 0;
    pub const VERSION: u8 = 1;

    pub const BLOB: i32 = 1;
    pub const BOOLEAN: i32 = 2;
    pub const DOUBLE: i32 = 5;
    pub const IDENTIFIER: i32 = 6;
    pub const LONG: i32 = 13;
    pub const STRING: i32 = 15;
    pub const FINE_TIME: i32 = 17;
    pub const URI: i32 = 18;
}

/// Area, service and version numbers of the COM archive service.
pub mod com {
    pub const AREA: u16 = 2;
    pub const ARCHIVE_SERVICE: u16 = 2;
    pub const VERSION: u8 = 1;

    pub const ARCHIVE_DETAILS: i32 = 1;
    pub const ARCHIVE_QUERY: i32 = 2;
    pub const COMPOSITE_FILTER: i32 = 3;
    pub const COMPOSITE_FILTER_SET: i32 = 4;
    pub const EXPRESSION_OPERATOR: i32 = 5;
}

/// Wire-level type tag carried in front of every polymorphic value.
///
/// Layout: `area << 48 | service << 32 | version << 24 | type number`, the
/// type number truncated to 24 bits. List types use the negated number of
/// their element type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShortForm(u64);

impl ShortForm {
    pub const fn new(area: u16, service: u16, version: u8, type_number: i32) -> Self {
        Self(
            ((area as u64) << 48)
                | ((service as u64) << 32)
                | ((version as u64) << 24)
                | ((type_number as u32 as u64) & 0x00FF_FFFF),
        )
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn area(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub const fn service(self) -> u16 {
        (self.0 >> 32) as u16
    }

    pub const fn version(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The type number, sign-extended from its 24-bit wire form.
    pub const fn type_number(self) -> i32 {
        let t = (self.0 & 0x00FF_FFFF) as i32;
        if t & 0x0080_0000 != 0 {
            t - 0x0100_0000
        } else {
            t
        }
    }

    /// The short form of a list whose elements have this short form.
    pub const fn list(self) -> Self {
        Self::new(
            self.area(),
            self.service(),
            self.version(),
            -self.type_number(),
        )
    }

    pub const fn is_list(self) -> bool {
        self.type_number() < 0
    }
}

impl fmt::Debug for ShortForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ShortForm({}.{}.{}:{})",
            self.area(),
            self.service(),
            self.version(),
            self.type_number()
        )
    }
}

impl fmt::Display for ShortForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_operator_short_form() {
        let sf = ShortForm::new(com::AREA, com::ARCHIVE_SERVICE, com::VERSION, com::EXPRESSION_OPERATOR);
        assert_eq!(sf.raw(), 0x2000201000005);
    }

    #[test]
    fn components_read_back() {
        let sf = ShortForm::new(7, 3, 2, 42);
        assert_eq!(sf.area(), 7);
        assert_eq!(sf.service(), 3);
        assert_eq!(sf.version(), 2);
        assert_eq!(sf.type_number(), 42);
        assert!(!sf.is_list());
    }

    #[test]
    fn list_negates_type_number() {
        let long = ShortForm::new(mal::AREA, mal::SERVICE, mal::VERSION, mal::LONG);
        let list = long.list();
        assert_eq!(list.type_number(), -13);
        assert!(list.is_list());
        assert_eq!(list.raw(), 0x1000001FFFFF3);
        assert_eq!(list.list(), long);
    }

    #[test]
    fn display_is_hex() {
        let sf = ShortForm::from_raw(0x2000201000005);
        assert_eq!(sf.to_string(), "0x2000201000005");
    }
}

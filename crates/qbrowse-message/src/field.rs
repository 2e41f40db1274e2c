use std::fmt;

use bytes::Bytes;

/// A single typed value carried in a stream body, map body, or property.
///
/// A wire null is represented as `Option::<Field>::None`, never as a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Bytes),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Boolean(v) => write!(f, "{v}"),
            Field::Byte(v) => write!(f, "{v}"),
            Field::Short(v) => write!(f, "{v}"),
            Field::Char(v) => write!(f, "{v}"),
            Field::Int(v) => write!(f, "{v}"),
            Field::Long(v) => write!(f, "{v}"),
            // Debug keeps the fractional part on whole numbers ("1.0", not "1").
            Field::Float(v) => write!(f, "{v:?}"),
            Field::Double(v) => write!(f, "{v:?}"),
            Field::String(v) => f.write_str(v),
            Field::Bytes(v) => f.write_str(&hex::encode(v)),
        }
    }
}

impl From<bool> for Field {
    fn from(v: bool) -> Self {
        Field::Boolean(v)
    }
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Int(v)
    }
}

impl From<i64> for Field {
    fn from(v: i64) -> Self {
        Field::Long(v)
    }
}

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Double(v)
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::String(v.to_string())
    }
}

impl From<String> for Field {
    fn from(v: String) -> Self {
        Field::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_plain_values() {
        assert_eq!(Field::Boolean(true).to_string(), "true");
        assert_eq!(Field::Int(42).to_string(), "42");
        assert_eq!(Field::Long(-7).to_string(), "-7");
        assert_eq!(Field::Char('x').to_string(), "x");
        assert_eq!(Field::from("hello").to_string(), "hello");
    }

    #[test]
    fn display_keeps_fraction_on_whole_floats() {
        assert_eq!(Field::Double(1.0).to_string(), "1.0");
        assert_eq!(Field::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn display_switches_to_exponent_at_extremes() {
        assert_eq!(Field::Double(0.5).to_string(), "0.5");
        assert_eq!(Field::Double(1e-7).to_string(), "1e-7");
        assert_eq!(Field::Double(1e21).to_string(), "1e21");
        assert_eq!(Field::Double(-0.0).to_string(), "-0.0");
        assert_eq!(Field::Double(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn display_bytes_as_hex() {
        let field = Field::Bytes(Bytes::from_static(&[0x00, 0xAB, 0x10]));
        assert_eq!(field.to_string(), "00ab10");
    }
}

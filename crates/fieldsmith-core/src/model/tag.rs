//! Closed catalog of field type tags

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Every type a field can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    String,
    Number,
    BigInt,
    Boolean,
    Date,
    Symbol,
    Undefined,
    Null,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal,
    Enum,
    NativeEnum,
    Object,
    Array,
    Tuple,
    Union,
    DiscriminatedUnion,
    Intersection,
    Record,
    Map,
    Set,
    Function,
    Promise,
}

impl TypeTag {
    pub const ALL: [TypeTag; 27] = [
        TypeTag::String,
        TypeTag::Number,
        TypeTag::BigInt,
        TypeTag::Boolean,
        TypeTag::Date,
        TypeTag::Symbol,
        TypeTag::Undefined,
        TypeTag::Null,
        TypeTag::Void,
        TypeTag::Any,
        TypeTag::Unknown,
        TypeTag::Never,
        TypeTag::NaN,
        TypeTag::Literal,
        TypeTag::Enum,
        TypeTag::NativeEnum,
        TypeTag::Object,
        TypeTag::Array,
        TypeTag::Tuple,
        TypeTag::Union,
        TypeTag::DiscriminatedUnion,
        TypeTag::Intersection,
        TypeTag::Record,
        TypeTag::Map,
        TypeTag::Set,
        TypeTag::Function,
        TypeTag::Promise,
    ];

    /// Wire spelling
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::BigInt => "bigint",
            TypeTag::Boolean => "boolean",
            TypeTag::Date => "date",
            TypeTag::Symbol => "symbol",
            TypeTag::Undefined => "undefined",
            TypeTag::Null => "null",
            TypeTag::Void => "void",
            TypeTag::Any => "any",
            TypeTag::Unknown => "unknown",
            TypeTag::Never => "never",
            TypeTag::NaN => "nan",
            TypeTag::Literal => "literal",
            TypeTag::Enum => "enum",
            TypeTag::NativeEnum => "nativeEnum",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::Tuple => "tuple",
            TypeTag::Union => "union",
            TypeTag::DiscriminatedUnion => "discriminatedUnion",
            TypeTag::Intersection => "intersection",
            TypeTag::Record => "record",
            TypeTag::Map => "map",
            TypeTag::Set => "set",
            TypeTag::Function => "function",
            TypeTag::Promise => "promise",
        }
    }

    /// Look up a tag, ignoring case and `-`/`_` separators
    pub fn parse(input: &str) -> Option<Self> {
        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().to_lowercase() == normalized)
    }

    /// Tags whose base validator accepts the `coerce` flag
    pub fn supports_coercion(self) -> bool {
        matches!(
            self,
            TypeTag::String | TypeTag::Number | TypeTag::BigInt | TypeTag::Boolean | TypeTag::Date
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::parse(s).ok_or_else(|| format!("unknown type tag '{}'", s))
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tag_round_trips_its_spelling() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::parse(tag.as_str()), Some(tag));
        }
    }

    #[test]
    fn test_lenient_spellings() {
        assert_eq!(TypeTag::parse("BigInt"), Some(TypeTag::BigInt));
        assert_eq!(TypeTag::parse("discriminated-union"), Some(TypeTag::DiscriminatedUnion));
        assert_eq!(TypeTag::parse("native_enum"), Some(TypeTag::NativeEnum));
        assert_eq!(TypeTag::parse(" NaN "), Some(TypeTag::NaN));
        assert_eq!(TypeTag::parse("email"), None);
    }

    #[test]
    fn test_coercible_tags() {
        let coercible: Vec<_> = TypeTag::ALL
            .into_iter()
            .filter(|t| t.supports_coercion())
            .collect();
        assert_eq!(
            coercible,
            vec![TypeTag::String, TypeTag::Number, TypeTag::BigInt, TypeTag::Boolean, TypeTag::Date]
        );
    }
}

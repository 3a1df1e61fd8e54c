//! Field specification tree
//!
//! The builder's document model: a tree of [`FieldSpec`] nodes, each with a
//! type tag from the closed [`TypeTag`] catalog, type-specific parameters and
//! an ordered list of [`ValidationRule`]s. The tree is a value; backends only
//! read it.

pub mod document;
pub mod field;
pub mod rule;
mod serde_util;
pub mod tag;

pub use document::FieldDocument;
pub use field::{
    ArrayParams, CommonParams, DatetimeParams, EnumParams, FieldKind, FieldSpec, FunctionParam,
    FunctionParams, IntersectionParams, IpParams, IpVersion, KeyValueParams, LiteralParams,
    NativeEnumEntry, NativeEnumParams, ObjectParams, PromiseParams, RawField, SetParams,
    StringParams, TypeRef, UnionCase, UnionParams,
};
pub use rule::{RuleKind, ValidationRule};
pub use tag::TypeTag;

//! Types command handler

use crate::cli::TypesArgs;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use fieldsmith_core::registry::{self, TypeInfo};
use fieldsmith_core::TypeTag;

/// Handle the types command
pub fn handle_types(args: TypesArgs, output: &mut OutputWriter) -> Result<()> {
    match args.tag {
        Some(tag) => {
            let parsed = TypeTag::parse(&tag).ok_or(Error::UnknownTag { tag })?;
            output.type_detail(&TypeInfo::for_tag(parsed))
        }
        None => output.type_catalog(&registry::catalog()),
    }
}

//! The fold both backends share
//!
//! A backend turns a [`BaseNode`] into its own output and then applies each
//! [`RuleOp`] in order. The walk itself lives in [`Backend::node`], so the
//! interpreter and the emitter cannot visit nodes or ops in different orders.
//! Each backend implements `base` and `apply` as exhaustive matches, so a new
//! tag or op does not compile until both handle it.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::ir::{BaseNode, RuleOp, SchemaNode};
use tracing::trace;

pub trait Backend {
    type Output;

    /// Build the unconfigured output for a base; composite bases recurse
    /// through [`Backend::node`]
    fn base(&mut self, base: &BaseNode) -> Self::Output;

    /// Apply one op to the output built so far
    fn apply(&mut self, base: &BaseNode, output: Self::Output, op: &RuleOp) -> Self::Output;

    /// Attach a description after every op
    fn describe(&mut self, output: Self::Output, description: &str) -> Self::Output;

    /// Base, then ops left to right, then description
    fn node(&mut self, node: &SchemaNode) -> Self::Output {
        trace!(kind = node.base.kind_name(), ops = node.ops.len(), "visiting node");
        let mut output = self.base(&node.base);
        for op in &node.ops {
            output = self.apply(&node.base, output, op);
        }
        match &node.description {
            Some(description) => self.describe(output, description),
            None => output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Bound, ObjectNode};

    /// Records the visiting order
    struct Trace;

    impl Backend for Trace {
        type Output = Vec<String>;

        fn base(&mut self, base: &BaseNode) -> Vec<String> {
            let mut out = Vec::new();
            for child in base.children() {
                out.extend(self.node(child));
            }
            out.push(base.kind_name().to_string());
            out
        }

        fn apply(&mut self, _base: &BaseNode, mut output: Vec<String>, op: &RuleOp) -> Vec<String> {
            output.push(format!("{:?}", op));
            output
        }

        fn describe(&mut self, mut output: Vec<String>, description: &str) -> Vec<String> {
            output.push(format!("describe {}", description));
            output
        }
    }

    #[test]
    fn test_fold_order() {
        let mut inner = SchemaNode::new(BaseNode::String { coerce: false })
            .with_op(RuleOp::Trim)
            .with_op(RuleOp::Min(Bound::Number(1.0), None));
        inner.description = Some("name".into());
        let root = SchemaNode::new(BaseNode::Object(ObjectNode::new(vec![("n".into(), inner)])))
            .with_op(RuleOp::Optional);
        assert_eq!(
            Trace.node(&root),
            vec![
                "string".to_string(),
                "Trim".to_string(),
                "Min(Number(1.0), None)".to_string(),
                "describe name".to_string(),
                "object".to_string(),
                "Optional".to_string(),
            ]
        );
    }
}

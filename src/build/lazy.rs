//! Rules with node-reference arguments

use tracing::trace;

use crate::config::DelimiterPolicy;
use crate::error::{Result, SchemaError};
use crate::nodes::{NodeId, NodeRef, Tree};

use super::argument::{normalize, RuleArg};

/// Rule whose text depends on where other nodes sit in the tree
///
/// Path and node arguments are kept symbolic until the rule is resolved
/// against its owning node. Binding does not mutate: [`LazyRule::bind`]
/// returns a bound copy.
#[derive(Debug, Clone)]
pub struct LazyRule {
    name: String,
    args: Vec<RuleArg>,
    owner: Option<NodeRef>,
}

impl LazyRule {
    pub fn new(name: impl Into<String>, args: Vec<RuleArg>) -> Self {
        Self {
            name: name.into(),
            args,
            owner: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[RuleArg] {
        &self.args
    }

    pub fn owner(&self) -> Option<&NodeRef> {
        self.owner.as_ref()
    }

    pub fn bind(mut self, owner: NodeRef) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Render against the bound owner
    pub fn stringify(&self) -> Result<String> {
        let owner = self.owner.as_ref().ok_or_else(|| {
            SchemaError::illegal(format!(
                "rule \"{}\" must be bound to a node before it can be rendered",
                self.name
            ))
        })?;
        let handle = owner.upgrade()?;
        let tree = handle.tree();
        self.resolve_in(&tree, handle.id())
    }

    /// Render with `owner` as the starting point of relative arguments
    pub(crate) fn resolve_in(&self, tree: &Tree, owner: NodeId) -> Result<String> {
        let policy = tree.config().arguments.delimiters;
        let mut parts = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let text = match arg {
                RuleArg::Path(exp) => {
                    let target = exp.traverse_in(tree, owner)?;
                    tree.path(target)
                }
                RuleArg::Node(node) => node.path()?,
                other => normalize(other)?.into_string(),
            };
            policy.check(&self.name, &text)?;
            parts.push(text);
        }

        let rendered = assemble(&self.name, &parts);
        trace!(owner = %tree.path(owner), rule = %rendered, "resolved deferred rule");
        Ok(rendered)
    }
}

/// `name` alone, or `name:arg1,arg2`
pub(crate) fn assemble(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", name, args.join(","))
    }
}

/// Compile a rule declaration into eager text or a deferred rule
pub(crate) fn compile(
    policy: DelimiterPolicy,
    name: &str,
    args: Vec<RuleArg>,
) -> Result<CompiledRule> {
    if args.iter().any(RuleArg::is_reference) {
        // plain arguments are still validated at declaration
        for arg in args.iter().filter(|arg| !arg.is_reference()) {
            normalize(arg)?;
        }
        return Ok(CompiledRule::Deferred(LazyRule::new(name, args)));
    }

    let mut parts = Vec::with_capacity(args.len());
    for arg in &args {
        let text = normalize(arg)?.into_string();
        policy.check(name, &text)?;
        parts.push(text);
    }
    Ok(CompiledRule::Ready(assemble(name, &parts)))
}

pub(crate) enum CompiledRule {
    Ready(String),
    Deferred(LazyRule),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_exp::PathExp;
    use crate::prelude::*;

    #[test]
    fn test_compile_plain_rule() {
        let compiled = compile(
            DelimiterPolicy::Verbatim,
            "between",
            vec![1.into(), 10.into()],
        )
        .unwrap();
        assert!(matches!(compiled, CompiledRule::Ready(ref s) if s == "between:1,10"));
    }

    #[test]
    fn test_compile_bare_rule() {
        let compiled = compile(DelimiterPolicy::Verbatim, "required", vec![]).unwrap();
        assert!(matches!(compiled, CompiledRule::Ready(ref s) if s == "required"));
    }

    #[test]
    fn test_compile_with_reference_is_deferred() {
        let compiled = compile(
            DelimiterPolicy::Verbatim,
            "required_if",
            vec![PathExp::new().parent().into(), true.into()],
        )
        .unwrap();
        assert!(matches!(compiled, CompiledRule::Deferred(_)));
    }

    #[test]
    fn test_compile_rejects_aggregate_next_to_reference() {
        let err = compile(
            DelimiterPolicy::Verbatim,
            "required_if",
            vec![
                PathExp::new().parent().into(),
                serde_json::json!([1, 2]).into(),
            ],
        )
        .err()
        .unwrap();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
    }

    #[test]
    fn test_reject_policy() {
        let err = compile(DelimiterPolicy::Reject, "in", vec!["a,b".into()])
            .err()
            .unwrap();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
    }

    #[test]
    fn test_unbound_rule_cannot_render() {
        let rule = LazyRule::new("same", vec![PathExp::new().into()]);
        let err = rule.stringify().unwrap_err();
        assert!(matches!(err, SchemaError::IllegalState(_)));
    }

    #[test]
    fn test_bind_returns_bound_copy() {
        let root = crate::create();
        let foo = root.object("foo").unwrap();
        let bar = foo.string("bar").unwrap();

        let rule = LazyRule::new("same", vec![PathExp::new().parent().into()]);
        let bound = rule.clone().bind(bar.to_ref());
        assert!(rule.owner().is_none());
        assert_eq!(bound.stringify().unwrap(), "same:foo");

        let other = rule.bind(foo.to_ref());
        assert_eq!(other.stringify().unwrap(), "same:");
    }

    #[test]
    fn test_node_argument() {
        let root = crate::create();
        let password = root.string("password").unwrap();
        let confirm = root.string("password_confirmation").unwrap();
        let rule = LazyRule::new("same", vec![RuleArg::from(&password), 1.into()])
            .bind(confirm.to_ref());
        assert_eq!(rule.stringify().unwrap(), "same:password,1");
    }
}

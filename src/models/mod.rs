//! Semantic models built from extracted lex nodes.
//!
//! Every builder is `LexNode<K> -> Result<Model, TemplateError>`. A failure
//! never stops the batch: the caller records the error and moves on.

mod component;
mod reactive_event;
mod reactive_property;
mod reactive_variable;

pub use component::{Component, ComponentImport};
pub use reactive_event::ReactiveEvent;
pub use reactive_property::ReactiveProperty;
pub use reactive_variable::{ReactiveVariable, VariableId};

/// Binding references may carry a `$` sigil: `$count` binds to `count`
pub(crate) fn binding_name(token: &str) -> &str {
    token.strip_prefix('$').unwrap_or(token)
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_name_strips_sigil() {
        assert_eq!(binding_name("$count"), "count");
        assert_eq!(binding_name("count"), "count");
    }

    #[test]
    fn test_identifier_shape() {
        assert!(is_identifier("count"));
        assert!(is_identifier("_private1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("a+b"));
    }
}

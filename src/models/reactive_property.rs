use serde::{Deserialize, Serialize};

use super::{binding_name, is_identifier, VariableId};
use crate::error::{BindingKind, TemplateError};
use crate::lexer::{LexNode, PropNode};

const EXPECTED_PROPERTY: &str = ":propertyName=\"$variable\"";

/// A markup property that reads a reactive variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveProperty {
    pub property_name: String,
    pub var_name: String,
    pub node: LexNode<PropNode>,
    pub bound_variable: Option<VariableId>,
}

impl ReactiveProperty {
    pub fn from_node(node: LexNode<PropNode>) -> Result<Self, TemplateError> {
        let var_name = match node.tokens.as_slice() {
            [_, var] if is_identifier(binding_name(var)) => binding_name(var).to_string(),
            _ => {
                return Err(TemplateError::MalformedBinding {
                    kind: BindingKind::Property,
                    expected: EXPECTED_PROPERTY,
                    found: node.selector.clone(),
                })
            }
        };

        Ok(Self {
            property_name: node.tokens[0].clone(),
            var_name,
            node,
            bound_variable: None,
        })
    }

    pub fn bind_variable(&mut self, id: VariableId) {
        self.bound_variable = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, value: &[&str]) -> LexNode<PropNode> {
        let mut tokens = vec![name.to_string()];
        tokens.extend(value.iter().map(|s| s.to_string()));
        LexNode::new(format!(":{}=\"{}\"", name, value.join(" ")), tokens)
    }

    #[test]
    fn test_property_binding() {
        let property = ReactiveProperty::from_node(node("text", &["$count"])).unwrap();
        assert_eq!(property.property_name, "text");
        assert_eq!(property.var_name, "count");
        assert!(property.bound_variable.is_none());
    }

    #[test]
    fn test_property_needs_single_variable() {
        for value in [&[][..], &["count", "+", "1"][..], &["1count"][..]] {
            let err = ReactiveProperty::from_node(node("text", value)).unwrap_err();
            assert!(matches!(
                err,
                TemplateError::MalformedBinding {
                    kind: BindingKind::Property,
                    ..
                }
            ));
        }
    }
}

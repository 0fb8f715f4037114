use serde::{Deserialize, Serialize};

use super::{binding_name, is_identifier, ReactiveEvent, ReactiveProperty};
use crate::error::{BindingKind, TemplateError};
use crate::lexer::{LexNode, VarNode};

const EXPECTED_DECLARATION: &str = "var variableName = value;";

/// Index of a variable in its file's variable table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveVariable {
    pub name: String,
    pub initial_value: Option<String>,
    pub declaration_node: LexNode<VarNode>,
    pub properties: Vec<ReactiveProperty>,
    pub events: Vec<ReactiveEvent>,
}

impl ReactiveVariable {
    /// Expects `var name;` or `var name = value;`
    pub fn from_node(node: LexNode<VarNode>) -> Result<Self, TemplateError> {
        let tokens = &node.tokens;

        let well_formed = match tokens.len() {
            0 | 1 => false,
            2 => true,
            3 => false,
            _ => tokens[2] == "=",
        };
        let name = tokens.get(1).map(|t| binding_name(t)).unwrap_or_default();

        if !well_formed || !is_identifier(name) {
            return Err(TemplateError::MalformedBinding {
                kind: BindingKind::Variable,
                expected: EXPECTED_DECLARATION,
                found: node.selector.clone(),
            });
        }

        let name = name.to_string();
        let initial_value = (tokens.len() > 3).then(|| tokens[3..].join(" "));

        Ok(Self {
            name,
            initial_value,
            declaration_node: node,
            properties: Vec::new(),
            events: Vec::new(),
        })
    }

    pub fn add_prop(&mut self, property: ReactiveProperty) {
        self.properties.push(property);
    }

    pub fn add_event(&mut self, event: ReactiveEvent) {
        self.events.push(event);
    }
}

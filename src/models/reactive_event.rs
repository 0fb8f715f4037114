use serde::{Deserialize, Serialize};

use super::{binding_name, VariableId};
use crate::error::{BindingKind, TemplateError};
use crate::lexer::{EventNode, LexNode};

const EXPECTED_EVENT: &str = "@eventName=\"$variable = value\"";

/// A markup event whose reducer writes a reactive variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveEvent {
    pub event_name: String,
    pub var_name: String,
    /// Assignment right-hand side, kept as opaque expression text
    pub reducer: String,
    pub node: LexNode<EventNode>,
    pub bound_variable: Option<VariableId>,
}

impl ReactiveEvent {
    /// Expects `eventName variableName = reducerTokens...`
    pub fn from_node(node: LexNode<EventNode>) -> Result<Self, TemplateError> {
        if node.tokens.len() < 4 || node.tokens[2] != "=" {
            return Err(TemplateError::MalformedBinding {
                kind: BindingKind::Event,
                expected: EXPECTED_EVENT,
                found: node.selector.clone(),
            });
        }

        let event_name = node.tokens[0].clone();
        let var_name = binding_name(&node.tokens[1]).to_string();
        let reducer = node.tokens[3..].join("");

        Ok(Self {
            event_name,
            var_name,
            reducer,
            node,
            bound_variable: None,
        })
    }

    pub fn bind_variable(&mut self, id: VariableId) {
        self.bound_variable = Some(id);
    }
}

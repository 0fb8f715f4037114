//! Name resolution between bindings and compiler variables.
//!
//! Variables live in a per-file arena. Properties and events are resolved by
//! exact name against a name index built once per file; the first declaration
//! of a name wins, later duplicates are never bound.

use std::collections::HashMap;
use tracing::debug;

use crate::error::{BindingKind, TemplateError};
use crate::lexer::{EventNode, LexNode, PropNode};
use crate::models::{ReactiveEvent, ReactiveProperty, ReactiveVariable, VariableId};

#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    variables: Vec<ReactiveVariable>,
    by_name: HashMap<String, VariableId>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variable: ReactiveVariable) -> VariableId {
        let id = VariableId(self.variables.len());
        self.by_name.entry(variable.name.clone()).or_insert(id);
        self.variables.push(variable);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<VariableId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: VariableId) -> Option<&ReactiveVariable> {
        self.variables.get(id.0)
    }

    fn get_mut(&mut self, id: VariableId) -> Option<&mut ReactiveVariable> {
        self.variables.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReactiveVariable> {
        self.variables.iter()
    }

    pub fn into_vec(self) -> Vec<ReactiveVariable> {
        self.variables
    }

    /// Bind one property. Returns the variable it was attached to.
    pub fn bind_property(&mut self, mut property: ReactiveProperty) -> Result<VariableId, TemplateError> {
        let Some(id) = self.lookup(&property.var_name) else {
            return Err(TemplateError::UnresolvedBinding {
                kind: BindingKind::Property,
                var_name: property.var_name,
                selector: property.node.selector,
            });
        };

        property.bind_variable(id);
        if let Some(variable) = self.get_mut(id) {
            variable.add_prop(property);
        }
        Ok(id)
    }

    /// Bind one event. Returns the variable it was attached to.
    pub fn bind_event(&mut self, mut event: ReactiveEvent) -> Result<VariableId, TemplateError> {
        let Some(id) = self.lookup(&event.var_name) else {
            return Err(TemplateError::UnresolvedBinding {
                kind: BindingKind::Event,
                var_name: event.var_name,
                selector: event.node.selector,
            });
        };

        event.bind_variable(id);
        if let Some(variable) = self.get_mut(id) {
            variable.add_event(event);
        }
        Ok(id)
    }
}

/// Build and bind every property node in extraction order.
/// Returns one error per malformed or unresolved binding.
pub fn bind_properties<I>(table: &mut VariableTable, nodes: I) -> Vec<TemplateError>
where
    I: IntoIterator<Item = LexNode<PropNode>>,
{
    let mut errors = Vec::new();
    for node in nodes {
        let result = ReactiveProperty::from_node(node).and_then(|p| table.bind_property(p));
        match result {
            Ok(id) => debug!(variable = id.0, "bound property"),
            Err(e) => errors.push(e),
        }
    }
    errors
}

/// Build and bind every event node in extraction order.
pub fn bind_events<I>(table: &mut VariableTable, nodes: I) -> Vec<TemplateError>
where
    I: IntoIterator<Item = LexNode<EventNode>>,
{
    let mut errors = Vec::new();
    for node in nodes {
        let result = ReactiveEvent::from_node(node).and_then(|e| table.bind_event(e));
        match result {
            Ok(id) => debug!(variable = id.0, "bound event"),
            Err(e) => errors.push(e),
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{find_nodes, find_prop_nodes, VarNode};

    fn table(script: &str) -> VariableTable {
        let mut table = VariableTable::new();
        for node in find_nodes::<VarNode>(script, "var", ";") {
            table.insert(ReactiveVariable::from_node(node).unwrap());
        }
        table
    }

    #[test]
    fn test_property_binds_both_ways() {
        let mut table = table("var count = 0;");
        let html = r#"<div :text="count"></div>"#;

        let errors = bind_properties(&mut table, find_prop_nodes::<PropNode>(html, ":"));

        assert!(errors.is_empty());
        let id = table.lookup("count").unwrap();
        let variable = table.get(id).unwrap();
        assert_eq!(variable.properties.len(), 1);
        assert_eq!(variable.properties[0].bound_variable, Some(id));
        assert_eq!(variable.properties[0].var_name, variable.name);
    }

    #[test]
    fn test_unresolved_property_is_dropped() {
        let mut table = table("var count = 0;");
        let html = r#"<div :text="missing"></div>"#;

        let errors = bind_properties(&mut table, find_prop_nodes::<PropNode>(html, ":"));

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            TemplateError::UnresolvedBinding {
                kind: BindingKind::Property,
                var_name: "missing".to_string(),
                selector: r#":text="missing""#.to_string(),
            }
        );
        assert!(table.iter().all(|v| v.properties.is_empty()));
    }

    #[test]
    fn test_duplicate_declaration_binds_first() {
        let mut table = table("var count = 0; var count = 5;");
        let html = r#"<button @click="count = count + 1"></button>"#;

        let errors = bind_events(&mut table, find_prop_nodes::<EventNode>(html, "@"));

        assert!(errors.is_empty());
        let variables: Vec<_> = table.iter().collect();
        assert_eq!(variables.len(), 2);
        assert_eq!(variables[0].events.len(), 1);
        assert!(variables[1].events.is_empty());
        assert_eq!(variables[0].events[0].bound_variable, Some(VariableId(0)));
    }

    #[test]
    fn test_malformed_event_keeps_batch_going() {
        let mut table = table("var a = 0; var b = 0;");
        let html = r#"
            <button @click="a"></button>
            <button @click="b = b - 1"></button>
            <button @click="c = 1"></button>
        "#;

        let errors = bind_events(&mut table, find_prop_nodes::<EventNode>(html, "@"));

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec!["MALFORMED_BINDING", "UNRESOLVED_BINDING"]);
        let b = table.get(table.lookup("b").unwrap()).unwrap();
        assert_eq!(b.events[0].reducer, "b-1");
    }
}

//! Hand-off to reactive code generation.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::binder::VariableTable;
use crate::models::ReactiveVariable;
use crate::page::Page;

/// The wired variable graph of one compiled unit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveModel {
    pub file_path: String,
    pub variables: Vec<ReactiveVariable>,
    /// Models of the components inlined into this unit, in import order
    #[serde(default)]
    pub components: Vec<ReactiveModel>,
}

impl ReactiveModel {
    pub fn variable(&self, name: &str) -> Option<&ReactiveVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Bound properties plus bound events, this unit only
    pub fn binding_count(&self) -> usize {
        self.variables
            .iter()
            .map(|v| v.properties.len() + v.events.len())
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct CompiledUnit {
    pub page: Page,
    pub model: ReactiveModel,
}

/// Consumes the bound variable graph of a unit
pub trait ReactivityCompiler: Send + Sync {
    fn compile_reactivity(&self, file_path: &str, page: Page, variables: VariableTable) -> CompiledUnit;
}

/// Leaves the markup as it is and emits the variable graph as a
/// serializable model for a downstream generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelEmitter;

impl ReactivityCompiler for ModelEmitter {
    fn compile_reactivity(&self, file_path: &str, page: Page, variables: VariableTable) -> CompiledUnit {
        let model = ReactiveModel {
            file_path: file_path.to_string(),
            variables: variables.into_vec(),
            components: Vec::new(),
        };

        info!(
            file = file_path,
            variables = model.variables.len(),
            bindings = model.binding_count(),
            "compiled reactivity"
        );

        CompiledUnit { page, model }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind_properties;
    use crate::lexer::{find_nodes, find_prop_nodes, PropNode, VarNode};

    #[test]
    fn test_model_keeps_declaration_order() {
        let mut table = VariableTable::new();
        for node in find_nodes::<VarNode>("var b = 1; var a = 2;", "var", ";") {
            table.insert(ReactiveVariable::from_node(node).unwrap());
        }
        let html = r#"<i :text="a"></i><i :title="a"></i>"#;
        let errors = bind_properties(&mut table, find_prop_nodes::<PropNode>(html, ":"));
        assert!(errors.is_empty());

        let unit = ModelEmitter.compile_reactivity("page.html", Page::new(html, vec![]), table);

        let names: Vec<_> = unit.model.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(unit.model.binding_count(), 2);
        assert_eq!(unit.model.variable("a").unwrap().properties.len(), 2);
        assert_eq!(unit.page.html_content, html);
    }

    #[test]
    fn test_model_serializes_camel_case() {
        let model = ReactiveModel {
            file_path: "a.html".to_string(),
            ..ReactiveModel::default()
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["filePath"], "a.html");
        assert!(json["variables"].as_array().unwrap().is_empty());
    }
}

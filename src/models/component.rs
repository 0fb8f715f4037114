use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BindingKind, TemplateError};
use crate::lexer::{ImportNode, LexNode};

const EXPECTED_IMPORT: &str = "import \"./component.html\";";

/// A component import statement found in compiler-only script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentImport {
    /// Import path as written, relative to the importing file
    pub path: String,
    /// `Name` in `import Name from "./path";`
    pub binding: Option<String>,
    pub node: LexNode<ImportNode>,
}

impl ComponentImport {
    pub fn from_node(node: LexNode<ImportNode>) -> Result<Self, TemplateError> {
        let parsed = match node.tokens.as_slice() {
            [_, path] => unquote(path).map(|p| (p, None)),
            [_, name, from, path] if from == "from" => {
                unquote(path).map(|p| (p, Some(name.clone())))
            }
            _ => None,
        };

        match parsed {
            Some((path, binding)) if !path.is_empty() => Ok(Self {
                path,
                binding,
                node,
            }),
            _ => Err(TemplateError::MalformedBinding {
                kind: BindingKind::Import,
                expected: EXPECTED_IMPORT,
                found: node.selector.clone(),
            }),
        }
    }
}

fn unquote(token: &str) -> Option<String> {
    let quote = token.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    token
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .map(str::to_string)
}

/// A resolved import target. Owned by the import expander until it is inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub source_path: PathBuf,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::find_nodes;

    fn import(statement: &str) -> Result<ComponentImport, TemplateError> {
        let node = find_nodes::<ImportNode>(statement, "import", ";")
            .next()
            .unwrap();
        ComponentImport::from_node(node)
    }

    #[test]
    fn test_bare_import() {
        let model = import(r#"import "./header.html";"#).unwrap();
        assert_eq!(model.path, "./header.html");
        assert!(model.binding.is_none());
    }

    #[test]
    fn test_named_import() {
        let model = import("import Counter from './counter.html';").unwrap();
        assert_eq!(model.path, "./counter.html");
        assert_eq!(model.binding.as_deref(), Some("Counter"));
    }

    #[test]
    fn test_malformed_imports() {
        for statement in [
            "import Counter;",
            "import Counter from;",
            r#"import "";"#,
            r#"import Counter of "./x.html";"#,
            r#"import "./x.html;"#,
        ] {
            let err = import(statement).unwrap_err();
            assert_eq!(err.code(), "MALFORMED_BINDING", "{}", statement);
        }
    }
}

use crate::catalog::ClassOrigin;
use crate::graph::NodeId;
use crate::script::literal::{is_python_identifier, render_string};
use itertools::Itertools;
use std::fmt;

/// Constructs the callable handle of a node class, once per class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryStatement {
    pub handle: String,
    pub class_type: String,
    pub origin: ClassOrigin,
}

impl FactoryStatement {
    /// Whether the class is importable by name from the `nodes` module.
    pub fn is_importable(&self) -> bool {
        self.origin == ClassOrigin::Builtin && is_python_identifier(&self.class_type)
    }
}

impl fmt::Display for FactoryStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_importable() {
            write!(f, "{} = {}()", self.handle, self.class_type)
        } else {
            write!(
                f,
                "{} = NODE_CLASS_MAPPINGS[{}]()",
                self.handle,
                render_string(&self.class_type)
            )
        }
    }
}

/// One rendered node invocation: `target = handle.operation(name=expr, ...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedStatement {
    pub node_id: NodeId,
    pub target: String,
    /// The callable expression, e.g. `ksampler.sample`.
    pub callee: String,
    /// Keyword arguments with their rendered source expressions.
    pub arguments: Vec<(String, String)>,
    pub is_async: bool,
    /// Comment lines flagging problems with this node.
    pub warnings: Vec<String>,
}

impl EmittedStatement {
    /// The source lines of this statement, warnings first.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .warnings
            .iter()
            .map(|w| format!("# WARNING: {}", w))
            .collect();
        lines.push(self.call_line());
        lines
    }

    fn call_line(&self) -> String {
        let (keywords, unpacked): (Vec<_>, Vec<_>) = self
            .arguments
            .iter()
            .partition(|(name, _)| is_python_identifier(name));

        let mut args = keywords
            .iter()
            .map(|(name, expr)| format!("{}={}", name, expr))
            .join(", ");
        // Names like `image.1` or `from` cannot be keyword arguments
        if !unpacked.is_empty() {
            let entries = unpacked
                .iter()
                .map(|(name, expr)| format!("{}: {}", render_string(name), expr))
                .join(", ");
            if !args.is_empty() {
                args.push_str(", ");
            }
            args.push_str(&format!("**{{{}}}", entries));
        }
        let suspend = if self.is_async { "await " } else { "" };
        format!("{} = {}{}({})", self.target, suspend, self.callee, args)
    }
}

impl fmt::Display for EmittedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

/// A statement of the one-time setup block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStatement {
    Factory(FactoryStatement),
    Call(EmittedStatement),
}

impl SetupStatement {
    pub fn lines(&self) -> Vec<String> {
        match self {
            SetupStatement::Factory(factory) => vec![factory.to_string()],
            SetupStatement::Call(call) => call.lines(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_classes_go_through_the_mapping() {
        let builtin = FactoryStatement {
            handle: "loadimage".to_string(),
            class_type: "LoadImage".to_string(),
            origin: ClassOrigin::Builtin,
        };
        let custom = FactoryStatement {
            handle: "impactsegs".to_string(),
            class_type: "Impact SEGS".to_string(),
            origin: ClassOrigin::Custom,
        };
        assert_eq!(builtin.to_string(), "loadimage = LoadImage()");
        assert_eq!(
            custom.to_string(),
            r#"impactsegs = NODE_CLASS_MAPPINGS["Impact SEGS"]()"#
        );
    }

    #[test]
    fn async_calls_suspend_and_warnings_lead() {
        let stmt = EmittedStatement {
            node_id: NodeId::from("4"),
            target: "loadtext_4".to_string(),
            callee: "loadtext.load".to_string(),
            arguments: vec![("text".to_string(), "\"hi\"".to_string())],
            is_async: true,
            warnings: vec!["check me".to_string()],
        };
        assert_eq!(
            stmt.lines(),
            vec![
                "# WARNING: check me".to_string(),
                "loadtext_4 = await loadtext.load(text=\"hi\")".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_keyword_names_are_unpacked() {
        let stmt = EmittedStatement {
            node_id: NodeId::from("2"),
            target: "merge_2".to_string(),
            callee: "merge.run".to_string(),
            arguments: vec![
                ("from".to_string(), "1".to_string()),
                ("a".to_string(), "2".to_string()),
                ("image.1".to_string(), "3".to_string()),
            ],
            is_async: false,
            warnings: Vec::new(),
        };
        assert_eq!(
            stmt.to_string(),
            r#"merge_2 = merge.run(a=2, **{"from": 1, "image.1": 3})"#
        );
    }
}

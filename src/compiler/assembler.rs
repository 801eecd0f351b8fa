use crate::options::ScriptOptions;
use crate::script::prelude::{
    ADD_EXTRA_MODEL_PATHS, ADD_HOST_DIRECTORY, FIND_PATH, GET_VALUE_AT_INDEX, IMPORT_CUSTOM_NODES,
    IMPORT_CUSTOM_NODES_ASYNC, PATH_SETUP_CALLS,
};
use crate::script::{EmittedStatement, SetupStatement, render_string};
use itertools::Itertools;
use std::collections::BTreeSet;

const INDENT: &str = "    ";

/// Everything the assembler needs besides the options.
#[derive(Debug, Clone, Default)]
pub struct ScriptParts {
    /// Classes imported by name from `nodes`.
    pub builtin_imports: BTreeSet<String>,
    /// Some factory goes through `NODE_CLASS_MAPPINGS`.
    pub needs_class_mappings: bool,
    /// Some class is not built in, so extensions must be loaded first.
    pub has_custom_nodes: bool,
    pub is_async: bool,
    pub setup: Vec<SetupStatement>,
    pub per_iteration: Vec<EmittedStatement>,
    pub iterations: u32,
}

/// Line-oriented text buffer with an indentation level.
#[derive(Debug, Default)]
struct ScriptWriter {
    out: String,
    indent: usize,
}

impl ScriptWriter {
    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            self.out.push_str(&INDENT.repeat(self.indent));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line.as_ref());
        }
    }

    /// Starts a top-level block, two blank lines after the previous one.
    fn section(&mut self) {
        if !self.out.is_empty() {
            self.out.push_str("\n\n");
        }
    }

    fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.indent += 1;
        body(self);
        self.indent -= 1;
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Lays out the complete Python module.
pub fn assemble(parts: &ScriptParts, options: &ScriptOptions) -> String {
    let mut w = ScriptWriter::default();

    w.section();
    if parts.is_async {
        w.line("import asyncio");
    }
    w.lines(["import os", "import random", "import sys"]);
    w.line("from typing import Sequence, Mapping, Any, Union");
    if options.inference_mode {
        w.line("import torch");
    }

    w.section();
    w.lines(GET_VALUE_AT_INDEX.lines());

    if options.path_discovery {
        let host = render_string(&options.host_directory);
        w.section();
        w.lines(FIND_PATH.lines());
        w.section();
        w.lines(ADD_HOST_DIRECTORY.replace("{host}", &host).lines());
        w.section();
        w.lines(ADD_EXTRA_MODEL_PATHS.lines());
        w.section();
        w.lines(PATH_SETUP_CALLS.lines());
    }

    if parts.has_custom_nodes {
        w.section();
        let helper = if parts.is_async {
            IMPORT_CUSTOM_NODES_ASYNC
        } else {
            IMPORT_CUSTOM_NODES
        };
        w.lines(helper.lines());
    }

    let mut imports: Vec<&str> = parts.builtin_imports.iter().map(String::as_str).collect();
    if parts.needs_class_mappings {
        imports.push("NODE_CLASS_MAPPINGS");
    }
    if !imports.is_empty() {
        w.section();
        w.line(&format!("from nodes import {}", imports.iter().join(", ")));
    }

    w.section();
    w.line(if parts.is_async {
        "async def main():"
    } else {
        "def main():"
    });
    w.indented(|w| {
        if parts.has_custom_nodes {
            w.line(if parts.is_async {
                "await import_custom_nodes()"
            } else {
                "import_custom_nodes()"
            });
        }
        if options.inference_mode {
            w.line("with torch.inference_mode():");
            w.indented(|w| write_body(w, parts, options));
        } else {
            write_body(w, parts, options);
        }
    });

    w.section();
    w.line("if __name__ == \"__main__\":");
    w.indented(|w| {
        w.line(if parts.is_async {
            "asyncio.run(main())"
        } else {
            "main()"
        })
    });

    w.finish()
}

fn write_body(w: &mut ScriptWriter, parts: &ScriptParts, options: &ScriptOptions) {
    for statement in &parts.setup {
        w.lines(statement.lines());
    }
    if !parts.setup.is_empty() {
        w.line("");
    }

    w.line(&format!(
        "for {} in range({}):",
        options.loop_counter(), parts.iterations
    ));
    w.indented(|w| {
        if parts.per_iteration.is_empty() {
            w.line("pass");
        }
        for statement in &parts.per_iteration {
            w.lines(statement.lines());
        }
    });
}

//! Building blocks of the generated Python source.

pub mod literal;
pub mod prelude;
pub mod statement;

pub use literal::{PyLiteral, is_python_identifier, render_literal, render_string};
pub use statement::{EmittedStatement, FactoryStatement, SetupStatement};

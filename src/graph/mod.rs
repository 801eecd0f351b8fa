pub mod conversion;
pub mod definition;
pub mod parsing;

pub use conversion::*;
pub use definition::*;

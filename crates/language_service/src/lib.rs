//! Editor-facing Solidity analysis.
//!
//! [`CodeParser`] keeps two views of the active file:
//!
//! ```text
//!  text ──► fast parser ──► retained AST ──► block lookup, fallback definitions
//!    │
//!    └───► compiler (collaborator) ──► Task queue ──► AnalysisDatabase
//!                                                     (result + SymbolIndex)
//! ```
//!
//! The authoritative view is rebuilt from every successful compilation and
//! answers definition, reference and hover queries. While the last compile
//! failed, definition lookups degrade to the fast-parse view.

pub mod code_parser;
pub mod collaborators;
pub mod config;
mod compile;
pub mod error;
mod fast_parse;
pub mod file_state;
mod find_refs;
pub mod goto_def;
pub mod hover;
pub mod state;


pub use code_parser::{CodeParser, Collaborators};
pub use config::CompilerConfig;
pub use error::CodeParserError;
pub use goto_def::Resolution;
pub use state::{AnalysisDatabase, CodeParserEvent, CompileState};

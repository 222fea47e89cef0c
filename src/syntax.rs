//! Immutable, trivia-preserving syntax trees shared by both surface syntaxes.
//!
//! The green layer (`GreenNode`/`GreenToken`) is position independent and
//! shared through `Arc`, so an edit only copies the path from the changed
//! element to the root. `SyntaxTree` indexes a green root once and hands out
//! cheap positioned `SyntaxNode` cursors.

mod green;
mod kind;
pub mod make;
mod text;
mod tree;

pub use green::{Annotation, GreenElement, GreenNode, GreenToken};
pub use kind::{Language, SyntaxKind};
pub use text::TextSpan;
pub use tree::{NodeId, SyntaxNode, SyntaxTree};

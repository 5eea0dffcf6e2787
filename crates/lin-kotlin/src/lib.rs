//! # lin-kotlin
//!
//! Kotlin front end for lin, built on Tree-sitter.
//!
//! [`KotlinFrontend`] parses a file into an owned [`KotlinNode`] tree. Each
//! node carries its [`NodeCategory`](lin_core::NodeCategory) and the facts
//! rules query: names, visibility, modifiers, and resolved types for
//! declarations, call receivers and constructor calls. Type resolution uses
//! the file's imports and declarations plus a [`TypeFacts`] table of library
//! supertypes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod frontend;
mod kinds;
mod node;
mod symbols;
mod types;

pub use frontend::KotlinFrontend;
pub use node::KotlinNode;
pub use types::{TypeFacts, TypeRef};

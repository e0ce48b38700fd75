//! # symbios-script
//!
//! A scripted L-System engine: parametric, stochastic, context-sensitive and
//! bracketed grammars written in a small declarative language, rewritten for a
//! configurable number of generations and interpreted by a 3-D turtle into a
//! vertex stream for an external renderer.
//!
//! ```text
//! lsystem Plant {
//!     let angle = 0.4;
//!     axiom X;
//!     replace X by F[+X][-X]FX : 2;
//!     replace X by F[-X]FX : 1;
//!     replace F by FF;
//!     interpret F as DrawLine(1);
//!     interpret X as Ignore();
//!     interpret + as RotateLeft(angle);
//!     interpret - as RotateRight(angle);
//!     interpret [ as StartBranch();
//!     interpret ] as EndBranch();
//! }
//! ```
//!
//! Pipeline: [`lexer`] → [`parser`] → [`grammar`] (semantic checks) →
//! [`rewriter`] → [`interpreter`]. [`Engine`] wires the stages together.

pub mod engine;
pub mod error;
pub mod expr;
pub mod geometry;
pub mod grammar;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod rewriter;
pub mod turtle;
pub mod word;

pub use engine::*;
pub use error::*;
pub use expr::*;
pub use geometry::*;
pub use grammar::*;
pub use interpreter::*;
pub use rewriter::*;
pub use turtle::*;
pub use word::*;

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shell code generation.
//!
//! [`BashEmitter`] walks the exec chain from the start node. Each node
//! contributes through [`EmitBash`]; data nodes are pulled in on demand when
//! a consumer resolves one of its inputs.

pub mod context;
pub mod emitter;
pub mod node;

pub use context::{EmitContext, DEFAULT_INDENT_WIDTH};
pub use emitter::{emit_exec_chain, BashEmitter};
pub use node::EmitBash;

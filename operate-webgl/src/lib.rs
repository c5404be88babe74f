//! WebGL backend for operate.
//!
//! This crate provides the [operate] native context for [WebGL], over both WebGL1 and WebGL2
//! rendering contexts, and a tracked GPU buffer.
//!
//! [operate]: https://crates.io/crates/operate
//! [WebGL]: https://www.khronos.org/webgl

pub mod webgl;

pub use crate::webgl::buffer::{Buffer, BufferData, TrackedBuffer};
pub use crate::webgl::state::{BufferTarget, BufferUsage};
pub use crate::webgl::{RenderingContext, WebGl};

//! # GPU object lifecycle and capability negotiation for WebGL
//!
//! operate is the backend-agnostic core of a WebGL toolkit. It does not render anything by itself;
//! it answers the questions every renderer built on top of WebGL has to answer first:
//!
//! - Which backend am I running on, and which extensions can I use? See [`Context`].
//! - How do I reproduce the capabilities of another machine on mine? See
//!   [`ContextMasquerade`] and [`ExtensionsHash`].
//! - How much GPU memory do my objects hold? See [`AllocationRegister`].
//! - How do I bind the lifetime of a native resource to that bookkeeping? See [`GpuObject`].
//!
//! # Backends
//!
//! The core only talks to the rendering API through two traits: [`NativeContext`], wrapping a
//! live rendering context, and [`Surface`], creating such contexts and exposing configuration
//! attributes. The `operate-webgl` and `operate-web-sys` crates implement them for the browser.
//!
//! # Configuration
//!
//! A context is configured by the attributes of its surface (`backend`, `msqrdH`, `msqrdP`) and
//! by the page query string (`msqrd_h`, `msqrd_p`), which takes priority. See [`config`].
//!
//! # Extensions hash
//!
//! The set of extensions a context supports can be summarized as a short string, e.g. `a8000000`
//! for a WebGL2 context only supporting `EXT_color_buffer_float`. Passing that string as
//! `msqrd_h` on another machine restricts its context to the same extensions.
//!
//! [`Context`]: crate::context::Context
//! [`ContextMasquerade`]: crate::masquerade::ContextMasquerade
//! [`ExtensionsHash`]: crate::hash::ExtensionsHash
//! [`AllocationRegister`]: crate::allocation::AllocationRegister
//! [`GpuObject`]: crate::object::GpuObject
//! [`NativeContext`]: crate::backend::native::NativeContext
//! [`Surface`]: crate::backend::surface::Surface

pub mod allocation;
pub mod backend;
pub mod config;
pub mod context;
pub mod extension;
pub mod hash;
pub mod lifecycle;
pub mod masquerade;
pub mod object;
pub mod observable;

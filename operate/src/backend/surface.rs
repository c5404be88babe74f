//! Rendering surface interface.

use crate::backend::native::NativeContext;
use crate::backend::Backend;
use crate::context::ContextAttributes;

/// Something hosting the rendering, typically a canvas.
///
/// A surface creates native contexts for a given backend and exposes configuration attributes
/// (on the web, the `data-*` attributes of the canvas element).
pub trait Surface {
  type Native: NativeContext;

  /// Create a native context for `backend`.
  ///
  /// Returns `None` if the backend is not available on this surface.
  fn create_context(&self, backend: Backend, attributes: &ContextAttributes)
    -> Option<Self::Native>;

  /// Read a configuration attribute, by its camel-cased name (e.g. `msqrdH`).
  fn attribute(&self, name: &str) -> Option<String>;
}

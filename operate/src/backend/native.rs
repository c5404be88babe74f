//! Native context interface.
//!
//! This interface defines what a live rendering context must provide for a [`Context`] to be built
//! on top of it: which backend it runs, which attributes it was granted, which extensions it
//! supports and how to fetch their objects, and a few parameter queries used for diagnostics.
//!
//! [`Context`]: crate::context::Context

use crate::backend::Backend;
use crate::context::ContextAttributes;

/// Parameters that can be queried from a native context for diagnostics.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Parameter {
  Vendor,
  Renderer,
  Version,
  ShadingLanguageVersion,
  /// Only meaningful when `WEBGL_debug_renderer_info` is supported.
  UnmaskedVendor,
  /// Only meaningful when `WEBGL_debug_renderer_info` is supported.
  UnmaskedRenderer,
  MaxTextureSize,
  MaxCubeMapTextureSize,
  MaxRenderbufferSize,
  MaxVertexAttribs,
  MaxVertexUniformVectors,
  MaxVaryingVectors,
  MaxFragmentUniformVectors,
  MaxTextureImageUnits,
  MaxVertexTextureImageUnits,
  MaxCombinedTextureImageUnits,
  Max3DTextureSize,
  MaxArrayTextureLayers,
  MaxColorAttachments,
  MaxDrawBuffers,
  MaxSamples,
  MaxUniformBufferBindings,
}

impl Parameter {
  /// Implementation limits reported by [`Context::about`], in report order.
  ///
  /// [`Context::about`]: crate::context::Context::about
  pub const LIMITS: [Parameter; 16] = [
    Parameter::MaxTextureSize,
    Parameter::MaxCubeMapTextureSize,
    Parameter::MaxRenderbufferSize,
    Parameter::MaxVertexAttribs,
    Parameter::MaxVertexUniformVectors,
    Parameter::MaxVaryingVectors,
    Parameter::MaxFragmentUniformVectors,
    Parameter::MaxTextureImageUnits,
    Parameter::MaxVertexTextureImageUnits,
    Parameter::MaxCombinedTextureImageUnits,
    Parameter::Max3DTextureSize,
    Parameter::MaxArrayTextureLayers,
    Parameter::MaxColorAttachments,
    Parameter::MaxDrawBuffers,
    Parameter::MaxSamples,
    Parameter::MaxUniformBufferBindings,
  ];

  /// Whether the parameter can only be queried on a WebGL2 context.
  pub fn webgl2_only(self) -> bool {
    matches!(
      self,
      Parameter::Max3DTextureSize
        | Parameter::MaxArrayTextureLayers
        | Parameter::MaxColorAttachments
        | Parameter::MaxDrawBuffers
        | Parameter::MaxSamples
        | Parameter::MaxUniformBufferBindings
    )
  }

  /// GL enumerant of the parameter.
  pub fn code(self) -> u32 {
    match self {
      Parameter::Vendor => 0x1F00,
      Parameter::Renderer => 0x1F01,
      Parameter::Version => 0x1F02,
      Parameter::ShadingLanguageVersion => 0x8B8C,
      Parameter::UnmaskedVendor => 0x9245,
      Parameter::UnmaskedRenderer => 0x9246,
      Parameter::MaxTextureSize => 0x0D33,
      Parameter::MaxCubeMapTextureSize => 0x851C,
      Parameter::MaxRenderbufferSize => 0x84E8,
      Parameter::MaxVertexAttribs => 0x8869,
      Parameter::MaxVertexUniformVectors => 0x8DFB,
      Parameter::MaxVaryingVectors => 0x8DFC,
      Parameter::MaxFragmentUniformVectors => 0x8DFD,
      Parameter::MaxTextureImageUnits => 0x8872,
      Parameter::MaxVertexTextureImageUnits => 0x8B4C,
      Parameter::MaxCombinedTextureImageUnits => 0x8B4D,
      Parameter::Max3DTextureSize => 0x8073,
      Parameter::MaxArrayTextureLayers => 0x88FF,
      Parameter::MaxColorAttachments => 0x8CDF,
      Parameter::MaxDrawBuffers => 0x8824,
      Parameter::MaxSamples => 0x8D57,
      Parameter::MaxUniformBufferBindings => 0x8A2F,
    }
  }

  /// Name of the GL enumerant.
  pub fn name(self) -> &'static str {
    match self {
      Parameter::Vendor => "VENDOR",
      Parameter::Renderer => "RENDERER",
      Parameter::Version => "VERSION",
      Parameter::ShadingLanguageVersion => "SHADING_LANGUAGE_VERSION",
      Parameter::UnmaskedVendor => "UNMASKED_VENDOR_WEBGL",
      Parameter::UnmaskedRenderer => "UNMASKED_RENDERER_WEBGL",
      Parameter::MaxTextureSize => "MAX_TEXTURE_SIZE",
      Parameter::MaxCubeMapTextureSize => "MAX_CUBE_MAP_TEXTURE_SIZE",
      Parameter::MaxRenderbufferSize => "MAX_RENDERBUFFER_SIZE",
      Parameter::MaxVertexAttribs => "MAX_VERTEX_ATTRIBS",
      Parameter::MaxVertexUniformVectors => "MAX_VERTEX_UNIFORM_VECTORS",
      Parameter::MaxVaryingVectors => "MAX_VARYING_VECTORS",
      Parameter::MaxFragmentUniformVectors => "MAX_FRAGMENT_UNIFORM_VECTORS",
      Parameter::MaxTextureImageUnits => "MAX_TEXTURE_IMAGE_UNITS",
      Parameter::MaxVertexTextureImageUnits => "MAX_VERTEX_TEXTURE_IMAGE_UNITS",
      Parameter::MaxCombinedTextureImageUnits => "MAX_COMBINED_TEXTURE_IMAGE_UNITS",
      Parameter::Max3DTextureSize => "MAX_3D_TEXTURE_SIZE",
      Parameter::MaxArrayTextureLayers => "MAX_ARRAY_TEXTURE_LAYERS",
      Parameter::MaxColorAttachments => "MAX_COLOR_ATTACHMENTS",
      Parameter::MaxDrawBuffers => "MAX_DRAW_BUFFERS",
      Parameter::MaxSamples => "MAX_SAMPLES",
      Parameter::MaxUniformBufferBindings => "MAX_UNIFORM_BUFFER_BINDINGS",
    }
  }
}

/// A live rendering context.
///
/// Implementors wrap the platform object (e.g. a `WebGl2RenderingContext`). The [`Context`] built
/// on top of it queries the extension list once, at construction, and fetches extension objects
/// lazily.
///
/// [`Context`]: crate::context::Context
pub trait NativeContext {
  /// Opaque extension object handed out by the implementation.
  type Extension: Clone;

  /// Backend the context runs.
  fn backend(&self) -> Backend;

  /// Attributes actually granted by the implementation.
  ///
  /// `None` if they cannot be queried (e.g. the context is lost).
  fn attributes(&self) -> Option<ContextAttributes>;

  /// Names of the extensions the implementation supports.
  fn supported_extensions(&self) -> Vec<String>;

  /// Enable an extension and return its object, if supported.
  fn get_extension(&self, name: &str) -> Option<Self::Extension>;

  /// Query a parameter, formatted as a string. `None` if unavailable.
  fn parameter(&self, parameter: Parameter) -> Option<String>;
}

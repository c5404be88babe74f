//! Known rendering extensions.
//!
//! Every extension this crate knows about is declared once, in the table at the bottom of this
//! module. The table gives its canonical name, whether it can be queried under each backend, and
//! the names of the typed accessors generated on [`Context`]:
//!
//! - `supports_<name>()` tells whether the extension is usable.
//! - `<name>()` returns its [`ExtensionObject`], fetching and caching the native object on first
//!   use.
//!
//! Under WebGL2, a number of WebGL1 extensions are part of the core API. Those are
//! [`Availability::Default`]: they are always usable and their object is
//! [`ExtensionObject::Core`], but asking the implementation whether it supports them is a usage
//! error (see [`Context::supports`]).
//!
//! [`Context`]: crate::context::Context
//! [`Context::supports`]: crate::context::Context::supports

use std::fmt;

use crate::backend::native::NativeContext;
use crate::backend::Backend;
use crate::context::{Context, ContextError};

/// How an extension relates to a backend.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Availability {
  /// The extension does not exist for this backend.
  Unavailable,
  /// The extension may or may not be supported by the implementation.
  Optional,
  /// The functionality is part of the backend core API.
  Default,
}

/// Object giving access to the functionality of an extension.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExtensionObject<E> {
  /// The functionality is core: use the context itself.
  Core,
  /// Native extension object.
  Native(E),
}

impl<E> ExtensionObject<E> {
  pub fn native(&self) -> Option<&E> {
    match *self {
      ExtensionObject::Core => None,
      ExtensionObject::Native(ref e) => Some(e),
    }
  }

  pub fn is_core(&self) -> bool {
    matches!(*self, ExtensionObject::Core)
  }
}

macro_rules! extensions {
  ($($variant:ident => $name:literal, $webgl1:ident, $webgl2:ident, $supports:ident, $object:ident;)*) => {
    /// A known extension.
    #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
    pub enum Extension {
      $(
        #[doc = concat!("`", $name, "`")]
        $variant,
      )*
    }

    impl Extension {
      /// Every known extension, in declaration order.
      pub const ALL: &'static [Extension] = &[$(Extension::$variant),*];

      /// Canonical name of the extension.
      pub fn name(self) -> &'static str {
        match self {
          $(Extension::$variant => $name,)*
        }
      }

      /// Look an extension up by its canonical name.
      pub fn from_name(name: &str) -> Option<Self> {
        match name {
          $($name => Some(Extension::$variant),)*
          _ => None,
        }
      }

      /// How the extension relates to `backend`.
      pub fn availability(self, backend: Backend) -> Availability {
        match (self, backend) {
          $(
            (Extension::$variant, Backend::WebGL1) => Availability::$webgl1,
            (Extension::$variant, Backend::WebGL2) => Availability::$webgl2,
          )*
        }
      }
    }

    impl<B> Context<B>
    where
      B: NativeContext,
    {
      $(
        #[doc = concat!("Whether `", $name, "` is usable.")]
        pub fn $supports(&self) -> bool {
          self.supports_extension(Extension::$variant)
        }

        #[doc = concat!("Object of `", $name, "`; fails if it is not usable.")]
        pub fn $object(&self) -> Result<ExtensionObject<B::Extension>, ContextError> {
          self.extension(Extension::$variant)
        }
      )*
    }
  }
}

impl Extension {
  /// Extensions that can be queried under `backend`, i.e. the [`Availability::Optional`] ones.
  pub fn optional(backend: Backend) -> impl Iterator<Item = Extension> {
    Extension::ALL
      .iter()
      .copied()
      .filter(move |ext| ext.availability(backend) == Availability::Optional)
  }
}

impl fmt::Display for Extension {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.write_str(self.name())
  }
}

extensions! {
  InstancedArrays => "ANGLE_instanced_arrays", Optional, Default, supports_instanced_arrays, instanced_arrays;
  BlendMinmax => "EXT_blend_minmax", Optional, Default, supports_blend_minmax, blend_minmax;
  ColorBufferFloat => "EXT_color_buffer_float", Unavailable, Optional, supports_color_buffer_float, color_buffer_float;
  ColorBufferHalfFloat => "EXT_color_buffer_half_float", Optional, Unavailable, supports_color_buffer_half_float, color_buffer_half_float;
  DisjointTimerQuery => "EXT_disjoint_timer_query", Optional, Unavailable, supports_disjoint_timer_query, disjoint_timer_query;
  DisjointTimerQueryWebGL2 => "EXT_disjoint_timer_query_webgl2", Unavailable, Optional, supports_disjoint_timer_query_webgl2, disjoint_timer_query_webgl2;
  FragDepth => "EXT_frag_depth", Optional, Default, supports_frag_depth, frag_depth;
  SRGB => "EXT_sRGB", Optional, Default, supports_srgb, srgb;
  ShaderTextureLod => "EXT_shader_texture_lod", Optional, Default, supports_shader_texture_lod, shader_texture_lod;
  TextureFilterAnisotropic => "EXT_texture_filter_anisotropic", Optional, Optional, supports_texture_filter_anisotropic, texture_filter_anisotropic;
  ElementIndexUint => "OES_element_index_uint", Optional, Default, supports_element_index_uint, element_index_uint;
  StandardDerivatives => "OES_standard_derivatives", Optional, Default, supports_standard_derivatives, standard_derivatives;
  TextureFloat => "OES_texture_float", Optional, Default, supports_texture_float, texture_float;
  TextureFloatLinear => "OES_texture_float_linear", Optional, Optional, supports_texture_float_linear, texture_float_linear;
  TextureHalfFloat => "OES_texture_half_float", Optional, Default, supports_texture_half_float, texture_half_float;
  TextureHalfFloatLinear => "OES_texture_half_float_linear", Optional, Default, supports_texture_half_float_linear, texture_half_float_linear;
  VertexArrayObject => "OES_vertex_array_object", Optional, Default, supports_vertex_array_object, vertex_array_object;
  WebGLColorBufferFloat => "WEBGL_color_buffer_float", Optional, Unavailable, supports_webgl_color_buffer_float, webgl_color_buffer_float;
  CompressedTextureAstc => "WEBGL_compressed_texture_astc", Optional, Optional, supports_compressed_texture_astc, compressed_texture_astc;
  CompressedTextureAtc => "WEBGL_compressed_texture_atc", Optional, Optional, supports_compressed_texture_atc, compressed_texture_atc;
  CompressedTextureEtc => "WEBGL_compressed_texture_etc", Optional, Optional, supports_compressed_texture_etc, compressed_texture_etc;
  CompressedTextureEtc1 => "WEBGL_compressed_texture_etc1", Optional, Optional, supports_compressed_texture_etc1, compressed_texture_etc1;
  CompressedTexturePvrtc => "WEBGL_compressed_texture_pvrtc", Optional, Optional, supports_compressed_texture_pvrtc, compressed_texture_pvrtc;
  CompressedTextureS3tc => "WEBGL_compressed_texture_s3tc", Optional, Optional, supports_compressed_texture_s3tc, compressed_texture_s3tc;
  CompressedTextureS3tcSrgb => "WEBGL_compressed_texture_s3tc_srgb", Optional, Optional, supports_compressed_texture_s3tc_srgb, compressed_texture_s3tc_srgb;
  DebugRendererInfo => "WEBGL_debug_renderer_info", Optional, Optional, supports_debug_renderer_info, debug_renderer_info;
  DebugShaders => "WEBGL_debug_shaders", Optional, Optional, supports_debug_shaders, debug_shaders;
  DepthTexture => "WEBGL_depth_texture", Optional, Default, supports_depth_texture, depth_texture;
  DrawBuffers => "WEBGL_draw_buffers", Optional, Default, supports_draw_buffers, draw_buffers;
  LoseContext => "WEBGL_lose_context", Optional, Optional, supports_lose_context, lose_context;
  FloatBlend => "EXT_float_blend", Optional, Optional, supports_float_blend, float_blend;
  TextureCompressionBptc => "EXT_texture_compression_bptc", Optional, Optional, supports_texture_compression_bptc, texture_compression_bptc;
  TextureCompressionRgtc => "EXT_texture_compression_rgtc", Optional, Optional, supports_texture_compression_rgtc, texture_compression_rgtc;
  ParallelShaderCompile => "KHR_parallel_shader_compile", Optional, Optional, supports_parallel_shader_compile, parallel_shader_compile;
  FboRenderMipmap => "OES_fbo_render_mipmap", Optional, Default, supports_fbo_render_mipmap, fbo_render_mipmap;
  Multiview2 => "OVR_multiview2", Unavailable, Optional, supports_multiview2, multiview2;
  MultiDraw => "WEBGL_multi_draw", Optional, Optional, supports_multi_draw, multi_draw;
}

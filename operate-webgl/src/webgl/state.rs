//! Graphics state.

use operate::backend::native::Parameter;
use std::collections::HashMap;
use web_sys::WebGlBuffer;

use crate::webgl::{param_to_string, RenderingContext};

const DEBUG_RENDERER_INFO: &str = "WEBGL_debug_renderer_info";

/// The graphics state.
///
/// Wraps the rendering context and adds a small cache layer over it to prevent from issuing the
/// same API call (with the same parameters) twice.
#[derive(Debug)]
pub struct WebGlState {
  pub(crate) ctx: RenderingContext,

  // array buffer
  bound_array_buffer: Option<WebGlBuffer>,
  // element buffer
  bound_element_array_buffer: Option<WebGlBuffer>,

  // parameters; cached when asked the first time and then re-used
  parameters: HashMap<Parameter, String>,
}

impl WebGlState {
  pub(crate) fn new(ctx: RenderingContext) -> Self {
    WebGlState {
      ctx,
      bound_array_buffer: None,
      bound_element_array_buffer: None,
      parameters: HashMap::new(),
    }
  }

  pub(crate) fn get_parameter(&mut self, parameter: Parameter) -> Option<String> {
    if let Some(value) = self.parameters.get(&parameter) {
      return Some(value.clone());
    }

    // unmasked names are only readable once the extension is enabled
    if matches!(
      parameter,
      Parameter::UnmaskedVendor | Parameter::UnmaskedRenderer
    ) {
      self.ctx.get_extension(DEBUG_RENDERER_INFO)?;
    }

    let value = param_to_string(&self.ctx.get_parameter(parameter.code())?)?;
    self.parameters.insert(parameter, value.clone());
    Some(value)
  }

  pub(crate) fn create_buffer(&mut self) -> Option<WebGlBuffer> {
    self.ctx.create_buffer()
  }

  pub(crate) fn bind_buffer(
    &mut self,
    target: BufferTarget,
    buffer: Option<&WebGlBuffer>,
    bind: Bind,
  ) {
    let bound = match target {
      BufferTarget::Array => &mut self.bound_array_buffer,
      BufferTarget::ElementArray => &mut self.bound_element_array_buffer,
    };

    if bind == Bind::Forced || bound.as_ref() != buffer {
      self.ctx.bind_buffer(target.to_gl(), buffer);
      *bound = buffer.cloned();
    }
  }

  pub(crate) fn unbind_buffer(&mut self, buffer: &WebGlBuffer) {
    if self.bound_array_buffer.as_ref() == Some(buffer) {
      self.bind_buffer(BufferTarget::Array, None, Bind::Cached);
    } else if self.bound_element_array_buffer.as_ref() == Some(buffer) {
      self.bind_buffer(BufferTarget::ElementArray, None, Bind::Cached);
    }
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

/// Buffer binding point.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferTarget {
  /// Vertex attributes.
  Array,
  /// Vertex indices.
  ElementArray,
}

impl BufferTarget {
  pub(crate) fn to_gl(self) -> u32 {
    match self {
      BufferTarget::Array => web_sys::WebGlRenderingContext::ARRAY_BUFFER,
      BufferTarget::ElementArray => web_sys::WebGlRenderingContext::ELEMENT_ARRAY_BUFFER,
    }
  }
}

/// Expected usage of a buffer's data store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BufferUsage {
  StaticDraw,
  DynamicDraw,
  StreamDraw,
}

impl BufferUsage {
  pub(crate) fn to_gl(self) -> u32 {
    match self {
      BufferUsage::StaticDraw => web_sys::WebGlRenderingContext::STATIC_DRAW,
      BufferUsage::DynamicDraw => web_sys::WebGlRenderingContext::DYNAMIC_DRAW,
      BufferUsage::StreamDraw => web_sys::WebGlRenderingContext::STREAM_DRAW,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gl_enumerants() {
    assert_eq!(BufferTarget::Array.to_gl(), 0x8892);
    assert_eq!(BufferTarget::ElementArray.to_gl(), 0x8893);
    assert_eq!(BufferUsage::StaticDraw.to_gl(), 0x88E4);
    assert_eq!(BufferUsage::DynamicDraw.to_gl(), 0x88E8);
    assert_eq!(BufferUsage::StreamDraw.to_gl(), 0x88E0);
  }
}

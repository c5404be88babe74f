//! WebGL native context.
//!
//! [`WebGl`] wraps either a `WebGlRenderingContext` or a `WebGl2RenderingContext` and implements
//! [`NativeContext`] on top of it. Both APIs share the calls used here, so they are dispatched
//! through [`RenderingContext`].

pub mod buffer;
pub mod state;

use js_sys::{Array, Object, Reflect};
use operate::backend::native::{NativeContext, Parameter};
use operate::backend::Backend;
use operate::context::ContextAttributes;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{WebGl2RenderingContext, WebGlBuffer, WebGlRenderingContext};

use crate::webgl::state::WebGlState;

/// A WebGL1 or WebGL2 rendering context.
#[derive(Clone, Debug)]
pub enum RenderingContext {
  WebGL1(WebGlRenderingContext),
  WebGL2(WebGl2RenderingContext),
}

macro_rules! dispatch {
  ($self:ident, $ctx:ident => $e:expr) => {
    match *$self {
      RenderingContext::WebGL1(ref $ctx) => $e,
      RenderingContext::WebGL2(ref $ctx) => $e,
    }
  };
}

impl RenderingContext {
  /// Downcast a context object as returned by `HtmlCanvasElement::get_context`.
  pub fn from_object(backend: Backend, object: Object) -> Option<Self> {
    match backend {
      Backend::WebGL1 => object
        .dyn_into::<WebGlRenderingContext>()
        .ok()
        .map(RenderingContext::WebGL1),
      Backend::WebGL2 => object
        .dyn_into::<WebGl2RenderingContext>()
        .ok()
        .map(RenderingContext::WebGL2),
    }
  }

  pub fn backend(&self) -> Backend {
    match *self {
      RenderingContext::WebGL1(_) => Backend::WebGL1,
      RenderingContext::WebGL2(_) => Backend::WebGL2,
    }
  }

  pub fn is_context_lost(&self) -> bool {
    dispatch!(self, ctx => ctx.is_context_lost())
  }

  pub(crate) fn context_attributes(&self) -> Option<JsValue> {
    dispatch!(self, ctx => ctx.get_context_attributes()).map(JsValue::from)
  }

  pub(crate) fn supported_extensions(&self) -> Option<Array> {
    dispatch!(self, ctx => ctx.get_supported_extensions())
  }

  pub(crate) fn get_extension(&self, name: &str) -> Option<Object> {
    dispatch!(self, ctx => ctx.get_extension(name)).ok().flatten()
  }

  pub(crate) fn get_parameter(&self, pname: u32) -> Option<JsValue> {
    dispatch!(self, ctx => ctx.get_parameter(pname)).ok()
  }

  pub(crate) fn create_buffer(&self) -> Option<WebGlBuffer> {
    dispatch!(self, ctx => ctx.create_buffer())
  }

  pub(crate) fn delete_buffer(&self, buffer: Option<&WebGlBuffer>) {
    dispatch!(self, ctx => ctx.delete_buffer(buffer))
  }

  pub(crate) fn is_buffer(&self, buffer: Option<&WebGlBuffer>) -> bool {
    dispatch!(self, ctx => ctx.is_buffer(buffer))
  }

  pub(crate) fn bind_buffer(&self, target: u32, buffer: Option<&WebGlBuffer>) {
    dispatch!(self, ctx => ctx.bind_buffer(target, buffer))
  }

  pub(crate) fn buffer_data_with_i32(&self, target: u32, size: i32, usage: u32) {
    dispatch!(self, ctx => ctx.buffer_data_with_i32(target, size, usage))
  }

  pub(crate) fn buffer_data_with_u8_array(&self, target: u32, data: &[u8], usage: u32) {
    dispatch!(self, ctx => ctx.buffer_data_with_u8_array(target, data, usage))
  }

  pub(crate) fn buffer_sub_data_with_i32_and_u8_array(
    &self,
    target: u32,
    offset: i32,
    data: &[u8],
  ) {
    dispatch!(self, ctx => ctx.buffer_sub_data_with_i32_and_u8_array(target, offset, data))
  }
}

/// WebGL native context.
#[derive(Clone, Debug)]
pub struct WebGl {
  backend: Backend,
  pub(crate) state: Rc<RefCell<WebGlState>>,
}

impl WebGl {
  pub fn new(ctx: RenderingContext) -> Self {
    WebGl {
      backend: ctx.backend(),
      state: Rc::new(RefCell::new(WebGlState::new(ctx))),
    }
  }

  /// The underlying rendering context.
  pub fn rendering_context(&self) -> RenderingContext {
    self.state.borrow().ctx.clone()
  }
}

impl From<WebGlRenderingContext> for WebGl {
  fn from(ctx: WebGlRenderingContext) -> Self {
    WebGl::new(RenderingContext::WebGL1(ctx))
  }
}

impl From<WebGl2RenderingContext> for WebGl {
  fn from(ctx: WebGl2RenderingContext) -> Self {
    WebGl::new(RenderingContext::WebGL2(ctx))
  }
}

impl NativeContext for WebGl {
  type Extension = Object;

  fn backend(&self) -> Backend {
    self.backend
  }

  fn attributes(&self) -> Option<ContextAttributes> {
    let attributes = self.state.borrow().ctx.context_attributes()?;
    let get = |name: &str, default: bool| {
      Reflect::get(&attributes, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
    };

    let defaults = ContextAttributes::default();
    Some(ContextAttributes {
      alpha: get("alpha", defaults.alpha),
      antialias: get("antialias", defaults.antialias),
      depth: get("depth", defaults.depth),
      stencil: get("stencil", defaults.stencil),
      premultiplied_alpha: get("premultipliedAlpha", defaults.premultiplied_alpha),
      preserve_drawing_buffer: get("preserveDrawingBuffer", defaults.preserve_drawing_buffer),
      fail_if_major_performance_caveat: get(
        "failIfMajorPerformanceCaveat",
        defaults.fail_if_major_performance_caveat,
      ),
    })
  }

  fn supported_extensions(&self) -> Vec<String> {
    match self.state.borrow().ctx.supported_extensions() {
      Some(extensions) => extensions.iter().filter_map(|e| e.as_string()).collect(),
      None => {
        log::warn!("cannot list supported extensions (context lost?)");
        Vec::new()
      }
    }
  }

  fn get_extension(&self, name: &str) -> Option<Self::Extension> {
    self.state.borrow().ctx.get_extension(name)
  }

  fn parameter(&self, parameter: Parameter) -> Option<String> {
    if parameter.webgl2_only() && self.backend != Backend::WebGL2 {
      return None;
    }

    self.state.borrow_mut().get_parameter(parameter)
  }
}

/// Convert a GL parameter value into a displayable string.
pub(crate) fn param_to_string(value: &JsValue) -> Option<String> {
  value
    .as_string()
    .or_else(|| value.as_f64().map(|n| n.to_string()))
    .or_else(|| value.as_bool().map(|b| b.to_string()))
}

//! web-sys operate platform.
//!
//! [`WebSysSurface`] is the [`Surface`] of a canvas element: it creates WebGL contexts on it and
//! exposes its `data-*` attributes as configuration (`data-backend`, `data-msqrd-h`,
//! `data-msqrd-p`). [`WebSysSurface::request_context`] also reads the page query string, so a
//! context can be masqueraded by adding `?msqrd_h=<hash>` to the URL.

use js_sys::{Object, Reflect};
use operate::backend::surface::Surface;
use operate::backend::Backend;
use operate::config::{data_attribute_name, QueryParameters};
use operate::context::{Context, ContextAttributes, ContextError};
use operate_webgl::{RenderingContext, WebGl};
use std::fmt;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement, Window};

const LEGACY_WEBGL1_CONTEXT_ID: &str = "experimental-webgl";

/// web-sys errors that might occur while initializing and using the platform.
#[non_exhaustive]
#[derive(Debug)]
pub enum WebSysSurfaceError {
  CannotGrabWindow,
  CannotGrabDocument,
  NoSuchCanvasElement(String),
  NotACanvasElement(String),
  Context(ContextError),
}

impl WebSysSurfaceError {
  fn cannot_grab_window() -> Self {
    WebSysSurfaceError::CannotGrabWindow
  }

  fn cannot_grab_document() -> Self {
    WebSysSurfaceError::CannotGrabDocument
  }

  fn no_such_canvas_element(name: impl Into<String>) -> Self {
    WebSysSurfaceError::NoSuchCanvasElement(name.into())
  }

  fn not_a_canvas_element(name: impl Into<String>) -> Self {
    WebSysSurfaceError::NotACanvasElement(name.into())
  }
}

impl fmt::Display for WebSysSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      WebSysSurfaceError::CannotGrabWindow => f.write_str("cannot grab the window node"),
      WebSysSurfaceError::CannotGrabDocument => f.write_str("cannot grab the document node"),
      WebSysSurfaceError::NoSuchCanvasElement(ref name) => {
        write!(f, "cannot grab canvas named {}", name)
      }
      WebSysSurfaceError::NotACanvasElement(ref name) => {
        write!(f, "element {} is not a canvas", name)
      }
      WebSysSurfaceError::Context(ref e) => write!(f, "cannot create context: {}", e),
    }
  }
}

impl std::error::Error for WebSysSurfaceError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match *self {
      WebSysSurfaceError::Context(ref e) => Some(e),
      _ => None,
    }
  }
}

impl From<ContextError> for WebSysSurfaceError {
  fn from(e: ContextError) -> Self {
    WebSysSurfaceError::Context(e)
  }
}

/// web-sys surface: a canvas element.
#[derive(Clone, Debug)]
pub struct WebSysSurface {
  window: Window,
  document: Document,
  canvas: HtmlCanvasElement,
}

impl WebSysSurface {
  /// Grab the canvas element with id `canvas_name`.
  pub fn new(canvas_name: &str) -> Result<Self, WebSysSurfaceError> {
    let window = web_sys::window().ok_or_else(WebSysSurfaceError::cannot_grab_window)?;

    let document = window
      .document()
      .ok_or_else(WebSysSurfaceError::cannot_grab_document)?;

    let canvas = document
      .get_element_by_id(canvas_name)
      .ok_or_else(|| WebSysSurfaceError::no_such_canvas_element(canvas_name))?
      .dyn_into::<HtmlCanvasElement>()
      .map_err(|_| WebSysSurfaceError::not_a_canvas_element(canvas_name))?;

    Ok(WebSysSurface {
      window,
      document,
      canvas,
    })
  }

  pub fn canvas(&self) -> &HtmlCanvasElement {
    &self.canvas
  }

  pub fn document(&self) -> &Document {
    &self.document
  }

  /// Parameters of the page query string.
  pub fn query_parameters(&self) -> QueryParameters {
    self
      .window
      .location()
      .search()
      .map(|search| QueryParameters::parse(&search))
      .unwrap_or_default()
  }

  /// Request a context on the canvas, configured by its attributes and the page query string.
  pub fn request_context(
    &self,
    attributes: &ContextAttributes,
  ) -> Result<Context<WebGl>, WebSysSurfaceError> {
    let context = Context::request(self, attributes, &self.query_parameters())?;
    Ok(context)
  }

  fn get_context(&self, context_id: &str, options: &JsValue) -> Option<Object> {
    self
      .canvas
      .get_context_with_context_options(context_id, options)
      .ok()
      .flatten()
  }
}

impl Surface for WebSysSurface {
  type Native = WebGl;

  fn create_context(&self, backend: Backend, attributes: &ContextAttributes) -> Option<WebGl> {
    let options = context_options(attributes);

    let object = self
      .get_context(backend.context_id(), &options)
      .or_else(|| match backend {
        Backend::WebGL1 => self.get_context(LEGACY_WEBGL1_CONTEXT_ID, &options),
        Backend::WebGL2 => None,
      })?;

    RenderingContext::from_object(backend, object).map(WebGl::new)
  }

  fn attribute(&self, name: &str) -> Option<String> {
    self.canvas.get_attribute(&data_attribute_name(name))
  }
}

/// Context creation options object.
fn context_options(attributes: &ContextAttributes) -> JsValue {
  let options = Object::new();

  for &(name, value) in &[
    ("alpha", attributes.alpha),
    ("antialias", attributes.antialias),
    ("depth", attributes.depth),
    ("stencil", attributes.stencil),
    ("premultipliedAlpha", attributes.premultiplied_alpha),
    ("preserveDrawingBuffer", attributes.preserve_drawing_buffer),
    (
      "failIfMajorPerformanceCaveat",
      attributes.fail_if_major_performance_caveat,
    ),
  ] {
    if Reflect::set(&options, &JsValue::from_str(name), &JsValue::from_bool(value)).is_err() {
      log::warn!("cannot set context option {}", name);
    }
  }

  options.into()
}

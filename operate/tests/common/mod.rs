//! In-memory native context and surface.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use operate::backend::native::{NativeContext, Parameter};
use operate::backend::surface::Surface;
use operate::backend::Backend;
use operate::context::{Context, ContextAttributes};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MockExtension(pub String);

#[derive(Debug)]
pub struct MockNative {
  backend: Backend,
  attributes: ContextAttributes,
  extensions: Vec<String>,
  pub fetched: Rc<Cell<usize>>,
}

impl MockNative {
  pub fn new(backend: Backend, extensions: &[&str]) -> Self {
    MockNative {
      backend,
      attributes: ContextAttributes::default(),
      extensions: extensions.iter().map(|e| (*e).to_owned()).collect(),
      fetched: Rc::new(Cell::new(0)),
    }
  }
}

impl NativeContext for MockNative {
  type Extension = MockExtension;

  fn backend(&self) -> Backend {
    self.backend
  }

  fn attributes(&self) -> Option<ContextAttributes> {
    Some(self.attributes)
  }

  fn supported_extensions(&self) -> Vec<String> {
    self.extensions.clone()
  }

  fn get_extension(&self, name: &str) -> Option<Self::Extension> {
    if self.extensions.iter().any(|e| e == name) {
      self.fetched.set(self.fetched.get() + 1);
      Some(MockExtension(name.to_owned()))
    } else {
      None
    }
  }

  fn parameter(&self, parameter: Parameter) -> Option<String> {
    match parameter {
      Parameter::Vendor => Some("Mock Vendor".to_owned()),
      Parameter::Renderer => Some("Mock Renderer".to_owned()),
      Parameter::Version => Some(format!("{} mock", self.backend)),
      Parameter::ShadingLanguageVersion => Some("GLSL mock".to_owned()),
      Parameter::UnmaskedVendor | Parameter::UnmaskedRenderer => Some("Unmasked".to_owned()),
      _ => Some("4096".to_owned()),
    }
  }
}

/// Surface able to create contexts for a set of backends.
///
/// Granted attributes differ from the requested ones: antialiasing is never granted.
#[derive(Debug, Default)]
pub struct MockSurface {
  available: HashMap<Backend, Vec<String>>,
  attributes: HashMap<String, String>,
  pub attempts: RefCell<Vec<Backend>>,
}

impl MockSurface {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_backend(mut self, backend: Backend, extensions: &[&str]) -> Self {
    self.available.insert(
      backend,
      extensions.iter().map(|e| (*e).to_owned()).collect(),
    );
    self
  }

  pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
    self.attributes.insert(name.to_owned(), value.to_owned());
    self
  }
}

impl Surface for MockSurface {
  type Native = MockNative;

  fn create_context(
    &self,
    backend: Backend,
    attributes: &ContextAttributes,
  ) -> Option<Self::Native> {
    self.attempts.borrow_mut().push(backend);

    self.available.get(&backend).map(|extensions| MockNative {
      backend,
      attributes: ContextAttributes {
        antialias: false,
        ..*attributes
      },
      extensions: extensions.clone(),
      fetched: Rc::new(Cell::new(0)),
    })
  }

  fn attribute(&self, name: &str) -> Option<String> {
    self.attributes.get(name).cloned()
  }
}

pub const WEBGL1_EXTENSIONS: &[&str] = &[
  "ANGLE_instanced_arrays",
  "OES_vertex_array_object",
  "OES_texture_float",
  "WEBGL_debug_renderer_info",
  "WEBGL_lose_context",
];

pub const WEBGL2_EXTENSIONS: &[&str] = &[
  "EXT_color_buffer_float",
  "EXT_texture_filter_anisotropic",
  "WEBGL_debug_renderer_info",
  "WEBGL_lose_context",
];

pub fn webgl2_context() -> Rc<Context<MockNative>> {
  Rc::new(Context::from_native(
    MockNative::new(Backend::WebGL2, WEBGL2_EXTENSIONS),
    None,
  ))
}

pub fn init_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

//! Rendering context.
//!
//! A [`Context`] wraps a live [`NativeContext`] and answers capability questions about it: which
//! backend it runs, which creation attributes were granted, which extensions are usable. It
//! applies an optional [`ContextMasquerade`] on top of the implementation, and owns the
//! [`AllocationRegister`] every GPU object created with it reports to.
//!
//! Contexts are obtained with [`Context::request`], which reads the configuration of the surface
//! and of the page query string, then tries the candidate backends in order.

use std::cell::RefCell;
use std::collections::HashMap;
use std::error;
use std::fmt;

use crate::allocation::AllocationRegister;
use crate::backend::native::{NativeContext, Parameter};
use crate::backend::surface::Surface;
use crate::backend::{Backend, BackendRequest};
use crate::config::{QueryParameters, SurfaceAttributes};
use crate::extension::{Availability, Extension, ExtensionObject};
use crate::hash::ExtensionsHash;
use crate::masquerade::{ContextMasquerade, MasqueradeError};

/// Context creation attributes.
///
/// When requesting a context, those are the desired attributes. Once the context exists,
/// [`Context::attributes`] reflects what the implementation actually granted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ContextAttributes {
  pub alpha: bool,
  pub antialias: bool,
  pub depth: bool,
  pub stencil: bool,
  pub premultiplied_alpha: bool,
  pub preserve_drawing_buffer: bool,
  pub fail_if_major_performance_caveat: bool,
}

impl Default for ContextAttributes {
  fn default() -> Self {
    ContextAttributes {
      alpha: true,
      antialias: true,
      depth: true,
      stencil: false,
      premultiplied_alpha: true,
      preserve_drawing_buffer: false,
      fail_if_major_performance_caveat: false,
    }
  }
}

/// Errors that can occur with a [`Context`].
#[non_exhaustive]
#[derive(Debug)]
pub enum ContextError {
  /// None of the candidate backends could be created.
  Unavailable(BackendRequest),
  /// The configured masquerade is invalid.
  Masquerade(MasqueradeError),
  /// The extension name is not a known extension.
  UnknownExtension(String),
  /// The extension does not exist for the backend.
  InvalidExtension { extension: Extension, backend: Backend },
  /// The extension is part of the backend core API and cannot be queried.
  CoreExtension { extension: Extension, backend: Backend },
  /// The extension is valid but not supported (or concealed).
  UnsupportedExtension(Extension),
}

impl fmt::Display for ContextError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ContextError::Unavailable(ref requested) => {
        write!(f, "no rendering context available (requested: {:?})", requested)
      }

      ContextError::Masquerade(ref e) => write!(f, "masquerade error: {}", e),

      ContextError::UnknownExtension(ref name) => write!(f, "unknown extension {}", name),

      ContextError::InvalidExtension { extension, backend } => {
        write!(f, "extension {} does not exist for {}", extension, backend)
      }

      ContextError::CoreExtension { extension, backend } => write!(
        f,
        "extension {} is part of {} core and cannot be queried",
        extension, backend
      ),

      ContextError::UnsupportedExtension(extension) => {
        write!(f, "extension {} is not supported", extension)
      }
    }
  }
}

impl error::Error for ContextError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match *self {
      ContextError::Masquerade(ref e) => Some(e),
      _ => None,
    }
  }
}

impl From<MasqueradeError> for ContextError {
  fn from(e: MasqueradeError) -> Self {
    ContextError::Masquerade(e)
  }
}

/// A rendering context with its capabilities resolved.
pub struct Context<B>
where
  B: NativeContext,
{
  native: B,
  backend: Backend,
  attributes: ContextAttributes,
  extensions: Vec<String>,
  mask: Option<ContextMasquerade>,
  allocations: AllocationRegister,
  support: HashMap<Extension, bool>,
  objects: RefCell<HashMap<Extension, B::Extension>>,
}

impl<B> Context<B>
where
  B: NativeContext,
{
  /// Request a context on `surface`.
  ///
  /// The masquerade is resolved from, in order, the query hash, the query preset, the surface
  /// hash and the surface preset. When one is found, its backend replaces the backend requested
  /// by the surface. WebGL2 is attempted first unless WebGL1 is requested, falling back to WebGL1.
  pub fn request<S>(
    surface: &S,
    attributes: &ContextAttributes,
    parameters: &QueryParameters,
  ) -> Result<Self, ContextError>
  where
    S: ?Sized + Surface<Native = B>,
  {
    let surface_attributes = SurfaceAttributes::read(surface);
    let mask = ContextMasquerade::resolve(parameters, &surface_attributes)?;

    let requested = match mask {
      Some(ref mask) => {
        log::debug!("masquerade selects backend {}", mask.backend());
        BackendRequest::from(mask.backend())
      }
      None => surface_attributes.backend,
    };

    for &backend in requested.candidates() {
      match surface.create_context(backend, attributes) {
        Some(native) => {
          if requested == BackendRequest::WebGL2 && backend != Backend::WebGL2 {
            log::warn!("{} requested but unavailable, falling back to {}", Backend::WebGL2, backend);
          }

          return Ok(Self::from_native(native, mask));
        }

        None => log::debug!("cannot create {} context", backend),
      }
    }

    Err(ContextError::Unavailable(requested))
  }

  /// Build a context over an existing native context.
  pub fn from_native(native: B, mask: Option<ContextMasquerade>) -> Self {
    let backend = native.backend();
    let attributes = native.attributes().unwrap_or_else(|| {
      log::warn!("cannot read granted context attributes, assuming defaults");
      ContextAttributes::default()
    });
    let extensions = native.supported_extensions();

    let support = Extension::ALL
      .iter()
      .map(|&ext| {
        let supported = match ext.availability(backend) {
          Availability::Unavailable => false,
          Availability::Default => true,
          Availability::Optional => {
            let name = ext.name();
            let concealed = mask.as_ref().map_or(false, |m| m.conceals(name));
            !concealed && extensions.iter().any(|e| e == name)
          }
        };

        (ext, supported)
      })
      .collect();

    if let Some(ref mask) = mask {
      for strived in mask.extensions_strive() {
        if !extensions.iter().any(|e| e == strived) {
          log::warn!(
            "masquerade strives for {} but the implementation does not support it",
            strived
          );
        }
      }
    }

    log::debug!(
      "{} context created with {} extensions{}",
      backend,
      extensions.len(),
      if mask.is_some() { " (masqueraded)" } else { "" }
    );

    Context {
      native,
      backend,
      attributes,
      extensions,
      mask,
      allocations: AllocationRegister::new(),
      support,
      objects: RefCell::new(HashMap::new()),
    }
  }

  pub fn native(&self) -> &B {
    &self.native
  }

  pub fn backend(&self) -> Backend {
    self.backend
  }

  pub fn is_webgl1(&self) -> bool {
    self.backend == Backend::WebGL1
  }

  pub fn is_webgl2(&self) -> bool {
    self.backend == Backend::WebGL2
  }

  /// Attributes granted by the implementation.
  pub fn attributes(&self) -> &ContextAttributes {
    &self.attributes
  }

  /// Extensions reported by the implementation, masquerade not applied.
  pub fn extensions(&self) -> &[String] {
    &self.extensions
  }

  pub fn mask(&self) -> Option<&ContextMasquerade> {
    self.mask.as_ref()
  }

  /// Whether the function `name` is erased by the masquerade.
  pub fn is_function_erased(&self, name: &str) -> bool {
    self.mask.as_ref().map_or(false, |m| m.undefines(name))
  }

  /// Whether the extension `name` is supported.
  ///
  /// Concealed extensions are unsupported. Asking for an unknown extension, for an extension
  /// that does not exist for the backend, or for one that is part of its core API is an error.
  pub fn supports(&self, name: &str) -> Result<bool, ContextError> {
    if self.mask.as_ref().map_or(false, |m| m.conceals(name)) {
      return Ok(false);
    }

    let extension =
      Extension::from_name(name).ok_or_else(|| ContextError::UnknownExtension(name.to_owned()))?;

    match extension.availability(self.backend) {
      Availability::Unavailable => Err(ContextError::InvalidExtension {
        extension,
        backend: self.backend,
      }),

      Availability::Default => Err(ContextError::CoreExtension {
        extension,
        backend: self.backend,
      }),

      Availability::Optional => Ok(self.supports_extension(extension)),
    }
  }

  /// Whether `extension` is usable, core extensions included.
  pub fn supports_extension(&self, extension: Extension) -> bool {
    self.support.get(&extension).copied().unwrap_or(false)
  }

  /// Object of `extension`.
  ///
  /// The native object is fetched on first use and cached.
  pub fn extension(
    &self,
    extension: Extension,
  ) -> Result<ExtensionObject<B::Extension>, ContextError> {
    match extension.availability(self.backend) {
      Availability::Default => return Ok(ExtensionObject::Core),

      Availability::Unavailable => {
        return Err(ContextError::InvalidExtension {
          extension,
          backend: self.backend,
        })
      }

      Availability::Optional => (),
    }

    if !self.supports_extension(extension) {
      return Err(ContextError::UnsupportedExtension(extension));
    }

    if let Some(object) = self.objects.borrow().get(&extension) {
      return Ok(ExtensionObject::Native(object.clone()));
    }

    let object = self
      .native
      .get_extension(extension.name())
      .ok_or(ContextError::UnsupportedExtension(extension))?;

    log::trace!("fetched extension object {}", extension);
    self
      .objects
      .borrow_mut()
      .insert(extension, object.clone());

    Ok(ExtensionObject::Native(object))
  }

  /// Extensions hash of the implementation.
  pub fn hash(&self) -> String {
    ExtensionsHash::encode(self.backend, &self.extensions)
  }

  /// GPU memory held by the objects of this context.
  pub fn allocations(&self) -> &AllocationRegister {
    &self.allocations
  }

  /// Diagnostic summary of the context, as (name, value) pairs.
  pub fn about(&self) -> Vec<(String, String)> {
    let mut about = Vec::new();
    let mut push = |name: &str, value: String| about.push((name.to_owned(), value));

    push("Backend", self.backend.to_string());

    for &parameter in &[
      Parameter::Vendor,
      Parameter::Renderer,
      Parameter::Version,
      Parameter::ShadingLanguageVersion,
    ] {
      push(parameter.name(), self.parameter(parameter));
    }

    if self.supports_debug_renderer_info() {
      for &parameter in &[Parameter::UnmaskedVendor, Parameter::UnmaskedRenderer] {
        push(parameter.name(), self.parameter(parameter));
      }
    }

    let attributes = &self.attributes;
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
      push(name, value.to_string());
    }

    for &parameter in &Parameter::LIMITS {
      if parameter.webgl2_only() && !self.is_webgl2() {
        continue;
      }

      push(parameter.name(), self.parameter(parameter));
    }

    let supported = Extension::optional(self.backend)
      .filter(|&ext| self.supports_extension(ext))
      .count();
    let optional = Extension::optional(self.backend).count();

    push("Extensions", format!("{}/{}", supported, optional));
    push("Hash", self.hash());

    if let Some(ref mask) = self.mask {
      push(
        "Masquerade",
        format!(
          "{} ({} concealed, {} erased)",
          mask.backend(),
          mask.extensions_conceal().len(),
          mask.functions_undefine().len()
        ),
      );
    }

    push("Allocated", self.allocations().bytes_to_string());

    about
  }

  /// Log [`Context::about`] at info level.
  pub fn log_about(&self) {
    for (name, value) in self.about() {
      log::info!("{}: {}", name, value);
    }
  }

  fn parameter(&self, parameter: Parameter) -> String {
    self
      .native
      .parameter(parameter)
      .unwrap_or_else(|| "n/a".to_owned())
  }
}

impl<B> fmt::Debug for Context<B>
where
  B: NativeContext,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Context")
      .field("backend", &self.backend)
      .field("attributes", &self.attributes)
      .field("extensions", &self.extensions)
      .field("mask", &self.mask)
      .finish()
  }
}

//! Backend interfacing.
//!
//! A backend is the rendering API version a [`Context`] ends up running on. It is resolved once,
//! when the context is requested, and never changes afterwards.
//!
//! The actual rendering API is reached through two traits:
//!
//! - [`native::NativeContext`], implemented by the type wrapping a live rendering context.
//! - [`surface::Surface`], implemented by whatever hosts the rendering (typically a canvas), able
//!   to create native contexts and to expose its configuration attributes.
//!
//! [`Context`]: crate::context::Context

pub mod native;
pub mod surface;

use std::error;
use std::fmt;
use std::str::FromStr;

/// Rendering backend.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Backend {
  WebGL1,
  WebGL2,
}

impl Backend {
  /// Every backend, in index order.
  pub const ALL: [Backend; 2] = [Backend::WebGL1, Backend::WebGL2];

  /// Zero-based index of the backend, as used by the extensions hash.
  pub fn index(self) -> u8 {
    match self {
      Backend::WebGL1 => 0,
      Backend::WebGL2 => 1,
    }
  }

  pub fn from_index(index: u8) -> Option<Self> {
    Backend::ALL.get(index as usize).copied()
  }

  /// Canonical identifier (`webgl1` or `webgl2`).
  pub fn as_str(self) -> &'static str {
    match self {
      Backend::WebGL1 => "webgl1",
      Backend::WebGL2 => "webgl2",
    }
  }

  /// Context identifier understood by `getContext`.
  pub fn context_id(self) -> &'static str {
    match self {
      Backend::WebGL1 => "webgl",
      Backend::WebGL2 => "webgl2",
    }
  }
}

impl fmt::Display for Backend {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.write_str(self.as_str())
  }
}

/// Error returned when parsing a canonical backend identifier fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseBackendError(pub String);

impl fmt::Display for ParseBackendError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "unknown backend: {} (expected webgl1 or webgl2)", self.0)
  }
}

impl error::Error for ParseBackendError {}

impl FromStr for Backend {
  type Err = ParseBackendError;

  /// Strict parsing of canonical identifiers, as found in masquerade presets.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "webgl1" => Ok(Backend::WebGL1),
      "webgl2" => Ok(Backend::WebGL2),
      _ => Err(ParseBackendError(s.to_owned())),
    }
  }
}

/// Backend asked for by the user of a surface.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BackendRequest {
  /// Prefer WebGL2, fall back to WebGL1.
  Auto,
  /// WebGL1 only.
  WebGL1,
  /// Prefer WebGL2, fall back to WebGL1.
  WebGL2,
}

impl Default for BackendRequest {
  fn default() -> Self {
    BackendRequest::Auto
  }
}

impl BackendRequest {
  /// Parse a backend identifier as found in surface attributes.
  ///
  /// Matching is case-insensitive and accepts the legacy `experimental-*` aliases. Anything else
  /// degrades to [`BackendRequest::Auto`] with a warning.
  pub fn parse_lossy(s: &str) -> Self {
    match s.trim().to_ascii_lowercase().as_str() {
      "auto" => BackendRequest::Auto,
      "webgl" | "webgl1" | "experimental-webgl" => BackendRequest::WebGL1,
      "webgl2" | "experimental-webgl2" => BackendRequest::WebGL2,
      _ => {
        log::warn!(
          "unknown backend '{}' changed to 'auto'; expected one of auto, webgl, webgl1, \
           experimental-webgl, webgl2, experimental-webgl2",
          s
        );
        BackendRequest::Auto
      }
    }
  }

  /// Backends to try, in order.
  pub fn candidates(self) -> &'static [Backend] {
    match self {
      BackendRequest::WebGL1 => &[Backend::WebGL1],
      BackendRequest::Auto | BackendRequest::WebGL2 => &[Backend::WebGL2, Backend::WebGL1],
    }
  }
}

impl From<Backend> for BackendRequest {
  fn from(backend: Backend) -> Self {
    match backend {
      Backend::WebGL1 => BackendRequest::WebGL1,
      Backend::WebGL2 => BackendRequest::WebGL2,
    }
  }
}

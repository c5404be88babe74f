//! Context masquerade.
//!
//! A masquerade restricts what a [`Context`] reports about its capabilities, so that a specific
//! configuration (a given browser on a given GPU, say) can be reproduced on a machine that
//! supports more. It consists of:
//!
//! - The backend to request.
//! - Extensions to strive for: they should be supported to faithfully reproduce the configuration.
//! - Extensions to conceal: reported as unsupported even if the implementation supports them.
//! - Functions to erase: entry points the configuration lacks.
//!
//! A masquerade is built from an extensions hash ([`ContextMasquerade::from_hash`]), from a named
//! preset ([`ContextMasquerade::from_preset`]) or from the page query string
//! ([`ContextMasquerade::from_query`]). When derived from a hash, the concealed extensions are
//! exactly the extensions valid for the backend that are not strived for.
//!
//! [`Context`]: crate::context::Context

use serde_derive::Deserialize;
use std::error;
use std::fmt;

use crate::backend::Backend;
use crate::config::{QueryParameters, SurfaceAttributes};
use crate::hash::{ExtensionsHash, HashError};

const DEFAULT_PRESETS: &str = include_str!("masquerade.json");

/// Errors that can occur while building a masquerade.
#[non_exhaustive]
#[derive(Debug)]
pub enum MasqueradeError {
  /// The extensions hash could not be decoded.
  Hash(HashError),
  /// No preset with that identifier.
  UnknownPreset { identifier: String, known: Vec<String> },
  /// The preset has neither a usable hash nor a usable backend.
  InvalidPreset { identifier: String, reason: String },
  /// The preset catalog could not be parsed.
  Catalog(serde_json::Error),
}

impl MasqueradeError {
  fn invalid_preset(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
    MasqueradeError::InvalidPreset {
      identifier: identifier.into(),
      reason: reason.into(),
    }
  }
}

impl fmt::Display for MasqueradeError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      MasqueradeError::Hash(ref e) => write!(f, "cannot decode masquerade hash: {}", e),

      MasqueradeError::UnknownPreset {
        ref identifier,
        ref known,
      } => write!(
        f,
        "unknown masquerade preset '{}' (known presets: {})",
        identifier,
        known.join(", ")
      ),

      MasqueradeError::InvalidPreset {
        ref identifier,
        ref reason,
      } => write!(f, "invalid masquerade preset '{}': {}", identifier, reason),

      MasqueradeError::Catalog(ref e) => write!(f, "cannot parse masquerade presets: {}", e),
    }
  }
}

impl error::Error for MasqueradeError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match *self {
      MasqueradeError::Hash(ref e) => Some(e),
      MasqueradeError::Catalog(ref e) => Some(e),
      _ => None,
    }
  }
}

impl From<HashError> for MasqueradeError {
  fn from(e: HashError) -> Self {
    MasqueradeError::Hash(e)
  }
}

/// A record of the preset catalog.
///
/// Either `extensions_hash` or `backend` must be set. When the hash is set, it overrides
/// `backend`, `extensions_strive` and `extensions_conceal`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Preset {
  pub identifier: String,
  #[serde(default)]
  pub backend: Option<String>,
  #[serde(default)]
  pub extensions_hash: Option<String>,
  #[serde(default)]
  pub extensions_strive: Vec<String>,
  #[serde(default)]
  pub extensions_conceal: Vec<String>,
  #[serde(default)]
  pub functions_undefine: Vec<String>,
}

/// A list of named masquerade presets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PresetCatalog {
  presets: Vec<Preset>,
}

impl PresetCatalog {
  /// Parse a catalog from a JSON array of presets.
  pub fn from_json(json: &str) -> Result<Self, MasqueradeError> {
    serde_json::from_str(json)
      .map(|presets| PresetCatalog { presets })
      .map_err(MasqueradeError::Catalog)
  }

  /// The catalog shipped with this crate.
  pub fn builtin() -> Result<Self, MasqueradeError> {
    Self::from_json(DEFAULT_PRESETS)
  }

  pub fn identifiers(&self) -> impl Iterator<Item = &str> {
    self.presets.iter().map(|p| p.identifier.as_str())
  }

  pub fn find(&self, identifier: &str) -> Option<&Preset> {
    self.presets.iter().find(|p| p.identifier == identifier)
  }
}

/// A capability restriction applied to a context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContextMasquerade {
  backend: Backend,
  extensions_strive: Vec<String>,
  extensions_conceal: Vec<String>,
  functions_undefine: Vec<String>,
}

impl ContextMasquerade {
  /// Derive a masquerade from an extensions hash.
  pub fn from_hash(hash: &str) -> Result<Self, MasqueradeError> {
    let (backend, extensions_strive) = ExtensionsHash::decode(hash)?;
    let extensions_conceal = ExtensionsHash::complement(backend, &extensions_strive);

    Ok(ContextMasquerade {
      backend,
      extensions_strive,
      extensions_conceal,
      functions_undefine: Vec::new(),
    })
  }

  /// Look a preset up in the built-in catalog.
  pub fn from_preset(identifier: &str) -> Result<Self, MasqueradeError> {
    Self::from_preset_in(&PresetCatalog::builtin()?, identifier)
  }

  /// Look a preset up in `catalog`.
  pub fn from_preset_in(catalog: &PresetCatalog, identifier: &str) -> Result<Self, MasqueradeError> {
    let preset = catalog
      .find(identifier)
      .ok_or_else(|| MasqueradeError::UnknownPreset {
        identifier: identifier.to_owned(),
        known: catalog.identifiers().map(str::to_owned).collect(),
      })?;

    let mut mask = if let Some(ref hash) = preset.extensions_hash {
      Self::from_hash(hash)?
    } else {
      let backend = preset
        .backend
        .as_deref()
        .ok_or_else(|| MasqueradeError::invalid_preset(identifier, "neither hash nor backend"))?
        .parse::<Backend>()
        .map_err(|e| MasqueradeError::invalid_preset(identifier, e.to_string()))?;

      ContextMasquerade {
        backend,
        extensions_strive: preset.extensions_strive.clone(),
        extensions_conceal: preset.extensions_conceal.clone(),
        functions_undefine: Vec::new(),
      }
    };

    mask.functions_undefine = preset.functions_undefine.clone();
    Ok(mask)
  }

  /// Build a masquerade from query parameters: the hash first, then the preset.
  ///
  /// Returns `Ok(None)` if neither is present.
  pub fn from_query(parameters: &QueryParameters) -> Result<Option<Self>, MasqueradeError> {
    if let Some(ref hash) = parameters.masquerade_hash {
      return Self::from_hash(hash).map(Some);
    }

    if let Some(ref preset) = parameters.masquerade_preset {
      return Self::from_preset(preset).map(Some);
    }

    Ok(None)
  }

  /// Resolve the masquerade of a context.
  ///
  /// Sources are tried in order, the first one present wins: query hash, query preset, surface
  /// hash, surface preset.
  pub fn resolve(
    parameters: &QueryParameters,
    attributes: &SurfaceAttributes,
  ) -> Result<Option<Self>, MasqueradeError> {
    if let Some(mask) = Self::from_query(parameters)? {
      return Ok(Some(mask));
    }

    if let Some(ref hash) = attributes.masquerade_hash {
      return Self::from_hash(hash).map(Some);
    }

    if let Some(ref preset) = attributes.masquerade_preset {
      return Self::from_preset(preset).map(Some);
    }

    Ok(None)
  }

  pub fn backend(&self) -> Backend {
    self.backend
  }

  pub fn extensions_strive(&self) -> &[String] {
    &self.extensions_strive
  }

  pub fn extensions_conceal(&self) -> &[String] {
    &self.extensions_conceal
  }

  pub fn functions_undefine(&self) -> &[String] {
    &self.functions_undefine
  }

  /// Whether `extension` must be reported as unsupported.
  pub fn conceals(&self, extension: &str) -> bool {
    self.extensions_conceal.iter().any(|e| e == extension)
  }

  /// Whether the function `name` must be treated as missing.
  pub fn undefines(&self, name: &str) -> bool {
    self.functions_undefine.iter().any(|f| f == name)
  }
}

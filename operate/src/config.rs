//! Context configuration sources.
//!
//! A [`Context`] reads its configuration from two places:
//!
//! - The surface attributes (on the web, the `data-*` attributes of the canvas), read once when
//!   the context is requested: `backend`, `msqrdH` (masquerade hash) and `msqrdP` (masquerade
//!   preset identifier).
//! - The query string of the page: `msqrd_h` and `msqrd_p`. Those take priority over the surface
//!   attributes.
//!
//! [`Context`]: crate::context::Context

use crate::backend::surface::Surface;
use crate::backend::BackendRequest;

/// Surface attribute selecting the backend.
pub const BACKEND_ATTRIBUTE: &str = "backend";
/// Surface attribute carrying a masquerade hash.
pub const MASQUERADE_HASH_ATTRIBUTE: &str = "msqrdH";
/// Surface attribute carrying a masquerade preset identifier.
pub const MASQUERADE_PRESET_ATTRIBUTE: &str = "msqrdP";

/// Query parameter carrying a masquerade hash.
pub const MASQUERADE_HASH_PARAMETER: &str = "msqrd_h";
/// Query parameter carrying a masquerade preset identifier.
pub const MASQUERADE_PRESET_PARAMETER: &str = "msqrd_p";

/// Query-string parameters understood by the context.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryParameters {
  /// Masquerade hash (`msqrd_h`).
  pub masquerade_hash: Option<String>,
  /// Masquerade preset identifier (`msqrd_p`).
  pub masquerade_preset: Option<String>,
}

impl QueryParameters {
  /// Parse a query string, with or without its leading `?`.
  ///
  /// Values are percent-decoded, but `+` is kept as is: it is a hash symbol, not an encoded
  /// space. Empty values are ignored and a repeated parameter takes its first non-empty value.
  /// Unknown parameters are ignored. A malformed query string yields no parameters.
  pub fn parse(query: &str) -> Self {
    let query = query.strip_prefix('?').unwrap_or(query).replace('+', "%2B");

    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(&query) {
      Ok(pairs) => pairs,
      Err(e) => {
        log::warn!("ignoring malformed query string '{}': {}", query, e);
        return QueryParameters::default();
      }
    };

    let first = |name: &str| {
      pairs
        .iter()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.clone())
    };

    QueryParameters {
      masquerade_hash: first(MASQUERADE_HASH_PARAMETER),
      masquerade_preset: first(MASQUERADE_PRESET_PARAMETER),
    }
  }
}

/// Configuration attributes of a surface.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SurfaceAttributes {
  pub backend: BackendRequest,
  pub masquerade_hash: Option<String>,
  pub masquerade_preset: Option<String>,
}

impl SurfaceAttributes {
  /// Read the attributes of `surface`.
  pub fn read<S>(surface: &S) -> Self
  where
    S: ?Sized + Surface,
  {
    let backend = surface
      .attribute(BACKEND_ATTRIBUTE)
      .map(|b| BackendRequest::parse_lossy(&b))
      .unwrap_or_default();

    SurfaceAttributes {
      backend,
      masquerade_hash: non_empty(surface.attribute(MASQUERADE_HASH_ATTRIBUTE)),
      masquerade_preset: non_empty(surface.attribute(MASQUERADE_PRESET_ATTRIBUTE)),
    }
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}

/// Turn a camel-cased attribute name into its `data-*` attribute (`msqrdH` → `data-msqrd-h`).
pub fn data_attribute_name(name: &str) -> String {
  let mut attribute = String::from("data-");

  for c in name.chars() {
    if c.is_ascii_uppercase() {
      attribute.push('-');
      attribute.push(c.to_ascii_lowercase());
    } else {
      attribute.push(c);
    }
  }

  attribute
}

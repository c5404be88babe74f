//! Extensions hash.
//!
//! An extensions hash is a compact string encoding a backend and a set of supported extensions,
//! so that a capability configuration observed on one machine can be reproduced on another (see
//! [`ContextMasquerade`]).
//!
//! # Format
//!
//! Every character is one of 64 symbols (`0-9`, `a-z`, `A-Z`, `-`, `+`) and carries 6 bits.
//!
//! - The first character packs the format version in its 3 high bits and `backend index + 1` in
//!   its 3 low bits (0 is reserved so that an all-zero head is never valid).
//! - The following `ceil(K / 6)` characters are a bitmap over the `K` extensions known at that
//!   version, in catalog order: extension `6 * g + i` is bit `i` of character `g`, most
//!   significant bit first. Trailing bits of the last character are zero.
//! - A hash without any supported extension is just the head character.
//!
//! Catalogs are append-only: growing the set of known extensions adds a new version, so that
//! hashes produced with an older version still decode.
//!
//! [`ContextMasquerade`]: crate::masquerade::ContextMasquerade

use std::error;
use std::fmt;

use crate::backend::Backend;
use crate::extension::Extension;

const ALPHABET: &[u8; 64] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-+";

const BITS_PER_SYMBOL: usize = 6;

/// Version used when encoding.
pub const CURRENT_VERSION: u8 = 0b001;

const CATALOG_V0: &[&str] = &[
  "ANGLE_instanced_arrays",
  "EXT_blend_minmax",
  "EXT_color_buffer_float",
  "EXT_color_buffer_half_float",
  "EXT_disjoint_timer_query",
  "EXT_disjoint_timer_query_webgl2",
  "EXT_frag_depth",
  "EXT_sRGB",
  "EXT_shader_texture_lod",
  "EXT_texture_filter_anisotropic",
  "OES_element_index_uint",
  "OES_standard_derivatives",
  "OES_texture_float",
  "OES_texture_float_linear",
  "OES_texture_half_float",
  "OES_texture_half_float_linear",
  "OES_vertex_array_object",
  "WEBGL_color_buffer_float",
  "WEBGL_compressed_texture_astc",
  "WEBGL_compressed_texture_atc",
  "WEBGL_compressed_texture_etc",
  "WEBGL_compressed_texture_etc1",
  "WEBGL_compressed_texture_pvrtc",
  "WEBGL_compressed_texture_s3tc",
  "WEBGL_compressed_texture_s3tc_srgb",
  "WEBGL_debug_renderer_info",
  "WEBGL_debug_shaders",
  "WEBGL_depth_texture",
  "WEBGL_draw_buffers",
  "WEBGL_lose_context",
];

const CATALOG_V1: &[&str] = &[
  "ANGLE_instanced_arrays",
  "EXT_blend_minmax",
  "EXT_color_buffer_float",
  "EXT_color_buffer_half_float",
  "EXT_disjoint_timer_query",
  "EXT_disjoint_timer_query_webgl2",
  "EXT_frag_depth",
  "EXT_sRGB",
  "EXT_shader_texture_lod",
  "EXT_texture_filter_anisotropic",
  "OES_element_index_uint",
  "OES_standard_derivatives",
  "OES_texture_float",
  "OES_texture_float_linear",
  "OES_texture_half_float",
  "OES_texture_half_float_linear",
  "OES_vertex_array_object",
  "WEBGL_color_buffer_float",
  "WEBGL_compressed_texture_astc",
  "WEBGL_compressed_texture_atc",
  "WEBGL_compressed_texture_etc",
  "WEBGL_compressed_texture_etc1",
  "WEBGL_compressed_texture_pvrtc",
  "WEBGL_compressed_texture_s3tc",
  "WEBGL_compressed_texture_s3tc_srgb",
  "WEBGL_debug_renderer_info",
  "WEBGL_debug_shaders",
  "WEBGL_depth_texture",
  "WEBGL_draw_buffers",
  "WEBGL_lose_context",
  "EXT_float_blend",
  "EXT_texture_compression_bptc",
  "EXT_texture_compression_rgtc",
  "KHR_parallel_shader_compile",
  "OES_fbo_render_mipmap",
  "OVR_multiview2",
  "WEBGL_multi_draw",
];

// append-only; never edit an existing entry
const CATALOGS: &[(u8, &[&str])] = &[(0b000, CATALOG_V0), (0b001, CATALOG_V1)];

/// Errors that can occur while decoding a hash.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HashError {
  /// The hash is empty.
  Empty,
  /// A character outside of the 64-symbol alphabet.
  InvalidCharacter(char),
  /// The head encodes a version without catalog.
  UnknownVersion(u8),
  /// The head encodes a backend index that does not exist.
  UnknownBackend(u8),
  /// The hash length does not match its version.
  InvalidLength { expected: usize, found: usize },
}

impl fmt::Display for HashError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      HashError::Empty => f.write_str("empty extensions hash"),

      HashError::InvalidCharacter(c) => write!(f, "invalid character in extensions hash: {:?}", c),

      HashError::UnknownVersion(version) => {
        write!(f, "unknown extensions hash version: {:#05b}", version)
      }

      HashError::UnknownBackend(index) => {
        write!(f, "unknown backend index in extensions hash: {}", index)
      }

      HashError::InvalidLength { expected, found } => write!(
        f,
        "invalid extensions hash length (expected {}, found {})",
        expected, found
      ),
    }
  }
}

impl error::Error for HashError {}

fn symbol(value: u8) -> char {
  ALPHABET[(value & 0b11_1111) as usize] as char
}

fn value(symbol: char) -> Result<u8, HashError> {
  ALPHABET
    .iter()
    .position(|&c| c as char == symbol)
    .map(|i| i as u8)
    .ok_or(HashError::InvalidCharacter(symbol))
}

/// Catalog of extensions known at `version`.
pub fn catalog(version: u8) -> Option<&'static [&'static str]> {
  CATALOGS
    .iter()
    .find(|(v, _)| *v == version)
    .map(|(_, catalog)| *catalog)
}

fn bitmap_len(version_catalog: &[&str]) -> usize {
  (version_catalog.len() + BITS_PER_SYMBOL - 1) / BITS_PER_SYMBOL
}

/// Expected length of a non-empty hash of `version`.
pub fn hash_len(version: u8) -> Option<usize> {
  catalog(version).map(|c| bitmap_len(c) + 1)
}

fn encode_with<S>(version: u8, version_catalog: &[&str], backend: Backend, supported: &[S]) -> String
where
  S: AsRef<str>,
{
  let head = symbol((version << 3) | (backend.index() + 1));

  let mut hash = String::with_capacity(bitmap_len(version_catalog) + 1);
  hash.push(head);

  if supported.is_empty() {
    return hash;
  }

  for group in version_catalog.chunks(BITS_PER_SYMBOL) {
    let mut bits = 0u8;

    for (i, name) in group.iter().enumerate() {
      if supported.iter().any(|s| s.as_ref() == *name) {
        bits |= 1 << (BITS_PER_SYMBOL - 1 - i);
      }
    }

    hash.push(symbol(bits));
  }

  for name in supported {
    if !version_catalog.contains(&name.as_ref()) {
      log::debug!(
        "extension {} unknown to hash version {}, dropped",
        name.as_ref(),
        version
      );
    }
  }

  hash
}

/// Codec between (backend, supported extensions) and extensions hashes.
#[derive(Clone, Copy, Debug)]
pub struct ExtensionsHash;

impl ExtensionsHash {
  /// Encode `backend` and `supported` with the current version.
  ///
  /// Names unknown to the current catalog are dropped.
  pub fn encode<S>(backend: Backend, supported: &[S]) -> String
  where
    S: AsRef<str>,
  {
    encode_with(CURRENT_VERSION, CATALOG_V1, backend, supported)
  }

  /// Encode with a specific catalog version. `None` if the version has no catalog.
  pub fn encode_version<S>(version: u8, backend: Backend, supported: &[S]) -> Option<String>
  where
    S: AsRef<str>,
  {
    catalog(version).map(|version_catalog| encode_with(version, version_catalog, backend, supported))
  }

  /// Decode a hash into its backend and supported extensions (in catalog order).
  pub fn decode(hash: &str) -> Result<(Backend, Vec<String>), HashError> {
    let mut chars = hash.chars();
    let head = value(chars.next().ok_or(HashError::Empty)?)?;

    let version = head >> 3;
    let backend_index = head & 0b111;

    let version_catalog = catalog(version).ok_or(HashError::UnknownVersion(version))?;
    let backend = backend_index
      .checked_sub(1)
      .and_then(Backend::from_index)
      .ok_or(HashError::UnknownBackend(backend_index))?;

    let found = hash.chars().count();
    if found == 1 {
      return Ok((backend, Vec::new()));
    }

    let expected = bitmap_len(version_catalog) + 1;
    if found != expected {
      return Err(HashError::InvalidLength { expected, found });
    }

    let mut supported = Vec::new();

    for (group, c) in version_catalog.chunks(BITS_PER_SYMBOL).zip(chars) {
      let bits = value(c)?;

      // bits beyond the catalog in the last group are ignored
      for (i, name) in group.iter().enumerate() {
        if bits & (1 << (BITS_PER_SYMBOL - 1 - i)) != 0 {
          supported.push((*name).to_owned());
        }
      }
    }

    Ok((backend, supported))
  }

  /// Extensions valid for `backend` that are not in `extensions`.
  pub fn complement<S>(backend: Backend, extensions: &[S]) -> Vec<String>
  where
    S: AsRef<str>,
  {
    Extension::optional(backend)
      .map(Extension::name)
      .filter(|name| !extensions.iter().any(|e| e.as_ref() == *name))
      .map(str::to_owned)
      .collect()
  }
}

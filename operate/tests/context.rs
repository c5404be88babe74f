mod common;

use common::{init_logger, MockSurface, WEBGL1_EXTENSIONS, WEBGL2_EXTENSIONS};
use operate::backend::Backend;
use operate::config::QueryParameters;
use operate::context::{Context, ContextAttributes, ContextError};
use operate::extension::{Extension, ExtensionObject};
use operate::hash::{catalog, CURRENT_VERSION};
use operate::masquerade::MasqueradeError;

fn both() -> MockSurface {
  MockSurface::new()
    .with_backend(Backend::WebGL1, WEBGL1_EXTENSIONS)
    .with_backend(Backend::WebGL2, WEBGL2_EXTENSIONS)
}

fn request(surface: &MockSurface, query: &str) -> Result<Context<common::MockNative>, ContextError> {
  init_logger();
  Context::request(
    surface,
    &ContextAttributes::default(),
    &QueryParameters::parse(query),
  )
}

#[test]
fn prefers_webgl2() {
  let surface = both();
  let context = request(&surface, "").unwrap();

  assert_eq!(context.backend(), Backend::WebGL2);
  assert!(context.is_webgl2());
  assert!(!context.is_webgl1());
  assert_eq!(*surface.attempts.borrow(), vec![Backend::WebGL2]);
}

#[test]
fn falls_back_to_webgl1() {
  let surface = MockSurface::new().with_backend(Backend::WebGL1, WEBGL1_EXTENSIONS);
  let context = request(&surface, "").unwrap();

  assert!(context.is_webgl1());
  assert_eq!(
    *surface.attempts.borrow(),
    vec![Backend::WebGL2, Backend::WebGL1]
  );
}

#[test]
fn explicit_webgl2_falls_back_to_webgl1() {
  let surface = MockSurface::new()
    .with_backend(Backend::WebGL1, WEBGL1_EXTENSIONS)
    .with_attribute("backend", "webgl2");
  let context = request(&surface, "").unwrap();

  assert!(context.is_webgl1());
}

#[test]
fn pinned_webgl1() {
  let surface = both().with_attribute("backend", "Experimental-WebGL");
  let context = request(&surface, "").unwrap();

  assert!(context.is_webgl1());
  assert_eq!(*surface.attempts.borrow(), vec![Backend::WebGL1]);
}

#[test]
fn unknown_backend_is_auto() {
  let surface = both().with_attribute("backend", "vulkan");
  let context = request(&surface, "").unwrap();

  assert!(context.is_webgl2());
}

#[test]
fn no_backend_available() {
  let surface = MockSurface::new();

  assert!(matches!(
    request(&surface, ""),
    Err(ContextError::Unavailable(_))
  ));
}

#[test]
fn granted_attributes_are_reflected() {
  let surface = both();
  let requested = ContextAttributes {
    stencil: true,
    ..ContextAttributes::default()
  };
  let context = Context::request(&surface, &requested, &QueryParameters::default()).unwrap();

  assert!(context.attributes().stencil);
  assert!(!context.attributes().antialias);
}

#[test]
fn supports_by_name() {
  let surface = both();
  let context = request(&surface, "").unwrap();

  assert_eq!(context.supports("EXT_color_buffer_float").ok(), Some(true));
  assert_eq!(
    context.supports("WEBGL_compressed_texture_astc").ok(),
    Some(false)
  );

  assert!(matches!(
    context.supports("ANGLE_instanced_arrays"),
    Err(ContextError::CoreExtension {
      extension: Extension::InstancedArrays,
      backend: Backend::WebGL2
    })
  ));
  assert!(matches!(
    context.supports("EXT_color_buffer_half_float"),
    Err(ContextError::InvalidExtension { .. })
  ));
  assert!(matches!(
    context.supports("WEBGL_teleportation"),
    Err(ContextError::UnknownExtension(_))
  ));
}

#[test]
fn webgl1_rejects_webgl2_only_extensions() {
  let surface = MockSurface::new().with_backend(Backend::WebGL1, WEBGL1_EXTENSIONS);
  let context = request(&surface, "").unwrap();

  assert_eq!(context.supports("ANGLE_instanced_arrays").ok(), Some(true));
  assert!(matches!(
    context.supports("EXT_color_buffer_float"),
    Err(ContextError::InvalidExtension { .. })
  ));
}

#[test]
fn typed_accessors() {
  let surface = both();
  let context = request(&surface, "").unwrap();

  // core under WebGL2
  assert!(context.supports_instanced_arrays());
  assert_eq!(context.instanced_arrays().ok(), Some(ExtensionObject::Core));

  assert!(context.supports_color_buffer_float());
  let object = context.color_buffer_float().unwrap();
  assert_eq!(
    object.native().map(|e| e.0.as_str()),
    Some("EXT_color_buffer_float")
  );

  // fetched once, then cached
  context.color_buffer_float().unwrap();
  assert_eq!(context.native().fetched.get(), 1);

  assert!(!context.supports_compressed_texture_astc());
  assert!(matches!(
    context.compressed_texture_astc(),
    Err(ContextError::UnsupportedExtension(Extension::CompressedTextureAstc))
  ));

  assert!(!context.supports_color_buffer_half_float());
  assert!(matches!(
    context.color_buffer_half_float(),
    Err(ContextError::InvalidExtension { .. })
  ));
}

#[test]
fn hash_of_raw_extensions() {
  let surface = MockSurface::new().with_backend(Backend::WebGL2, &["EXT_color_buffer_float"]);
  let context = request(&surface, "").unwrap();

  assert_eq!(context.hash(), "a8000000");
  assert_eq!(context.extensions(), &["EXT_color_buffer_float".to_owned()]);
}

#[test]
fn masquerade_from_query_hash() {
  let surface = both();
  let context = request(&surface, "?msqrd_h=9").unwrap();

  // the masquerade backend overrides the requested one
  assert!(context.is_webgl1());
  assert_eq!(*surface.attempts.borrow(), vec![Backend::WebGL1]);

  assert_eq!(context.supports("OES_vertex_array_object").ok(), Some(false));
  assert!(!context.supports_vertex_array_object());
  assert!(matches!(
    context.vertex_array_object(),
    Err(ContextError::UnsupportedExtension(_))
  ));

  // raw extensions are left untouched
  assert_eq!(context.extensions().len(), WEBGL1_EXTENSIONS.len());
}

#[test]
fn hash_pasted_in_query_string() {
  let every = catalog(CURRENT_VERSION).unwrap();
  let reference = MockSurface::new().with_backend(Backend::WebGL1, every);
  let hash = request(&reference, "").unwrap().hash();
  assert_eq!(hash, "9++++++w");

  let surface = MockSurface::new()
    .with_backend(Backend::WebGL1, every)
    .with_backend(Backend::WebGL2, WEBGL2_EXTENSIONS);
  let context = request(&surface, &format!("?msqrd_h={}", hash)).unwrap();

  assert!(context.is_webgl1());
  assert_eq!(context.mask().map(|mask| mask.extensions_strive().len()), Some(every.len()));
  assert_eq!(context.supports("OES_vertex_array_object").ok(), Some(true));
  assert_eq!(context.hash(), hash);
}

#[test]
fn empty_query_values_fall_through() {
  let surface = both().with_attribute("msqrdP", "webgl1-minimal");
  let context = request(&surface, "?msqrd_h=&msqrd_p=").unwrap();

  assert!(context.is_webgl1());
  assert_eq!(context.supports("OES_vertex_array_object").ok(), Some(false));

  // nothing anywhere: no masquerade at all
  let context = request(&both(), "?msqrd_h=&msqrd_p=").unwrap();
  assert!(context.is_webgl2());
  assert!(context.mask().is_none());
}

#[test]
fn masquerade_priority() {
  // surface preset only
  let surface = both().with_attribute("msqrdP", "webgl1-minimal");
  assert!(request(&surface, "").unwrap().is_webgl1());

  // surface hash beats surface preset
  let surface = both()
    .with_attribute("msqrdP", "webgl1-minimal")
    .with_attribute("msqrdH", "a");
  assert!(request(&surface, "").unwrap().is_webgl2());

  // query preset beats surface hash
  assert!(request(&surface, "msqrd_p=webgl1-ie11").unwrap().is_webgl1());

  // query hash beats query preset
  let context = request(&surface, "msqrd_p=webgl1-ie11&msqrd_h=a8000000").unwrap();
  assert!(context.is_webgl2());
  assert!(context.supports_color_buffer_float());
  assert!(!context.supports_lose_context());
}

#[test]
fn invalid_masquerade_fails() {
  let surface = both();

  assert!(matches!(
    request(&surface, "msqrd_p=netscape-4"),
    Err(ContextError::Masquerade(MasqueradeError::UnknownPreset { .. }))
  ));
  assert!(matches!(
    request(&surface, "msqrd_h=a00"),
    Err(ContextError::Masquerade(MasqueradeError::Hash(_)))
  ));
}

#[test]
fn erased_functions() {
  let surface = both().with_attribute("msqrdP", "webgl1-no-vertex-array-object");
  let context = request(&surface, "").unwrap();

  assert!(context.is_function_erased("createVertexArrayOES"));
  assert!(!context.is_function_erased("createBuffer"));
  assert!(!context.supports_vertex_array_object());
  assert!(context.supports_instanced_arrays());

  let unmasked = request(&both(), "").unwrap();
  assert!(unmasked.mask().is_none());
  assert!(!unmasked.is_function_erased("createVertexArrayOES"));
}

#[test]
fn about() {
  let surface = both();
  let context = request(&surface, "").unwrap();
  let about = context.about();
  let value = |name: &str| {
    about
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.as_str())
  };

  assert_eq!(value("Backend"), Some("webgl2"));
  assert_eq!(value("VENDOR"), Some("Mock Vendor"));
  assert_eq!(value("UNMASKED_RENDERER_WEBGL"), Some("Unmasked"));
  assert_eq!(value("MAX_SAMPLES"), Some("4096"));
  assert_eq!(value("antialias"), Some("false"));
  assert_eq!(value("Extensions"), Some("4/20"));
  assert_eq!(value("Allocated"), Some("0B"));

  let surface = MockSurface::new().with_backend(Backend::WebGL1, &["OES_texture_float"]);
  let context = request(&surface, "").unwrap();
  let about = context.about();

  assert!(about.iter().any(|(n, _)| n == "MAX_TEXTURE_SIZE"));
  assert!(!about.iter().any(|(n, _)| n == "MAX_SAMPLES"));
  assert!(!about.iter().any(|(n, _)| n == "UNMASKED_VENDOR_WEBGL"));

  context.log_about();
}

//! Two-state lifecycle.
//!
//! Objects backed by native resources go through `Uninitialized → Initialized → Uninitialized`,
//! possibly several times. The state is held in a [`Lifecycle`] field. State-dependent operations
//! call [`Lifecycle::require_initialized`] or [`Lifecycle::require_uninitialized`] first; both are
//! a single comparison when the requirement holds, and fail otherwise.

use std::error;
use std::fmt;

/// Lifecycle misuse.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LifecycleError {
  /// The object is initialized, and the operation requires it not to be.
  AlreadyInitialized,
  /// The object is not initialized, and the operation requires it to be.
  NotInitialized,
  /// The object cannot be uninitialized while it is still referenced.
  StillReferenced(usize),
  /// Releasing a reference the object does not have.
  NotReferenced,
}

impl fmt::Display for LifecycleError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      LifecycleError::AlreadyInitialized => f.write_str("object already initialized"),
      LifecycleError::NotInitialized => f.write_str("object not initialized"),
      LifecycleError::StillReferenced(references) => {
        write!(f, "object still referenced ({} references)", references)
      }
      LifecycleError::NotReferenced => f.write_str("object has no reference to release"),
    }
  }
}

impl error::Error for LifecycleError {}

/// Initialization state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Lifecycle {
  initialized: bool,
}

impl Lifecycle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  pub fn require_initialized(&self) -> Result<(), LifecycleError> {
    if self.initialized {
      Ok(())
    } else {
      Err(LifecycleError::NotInitialized)
    }
  }

  pub fn require_uninitialized(&self) -> Result<(), LifecycleError> {
    if self.initialized {
      Err(LifecycleError::AlreadyInitialized)
    } else {
      Ok(())
    }
  }

  /// Run `create` and become initialized if it reports success.
  ///
  /// Fails without calling `create` if already initialized. If `create` returns `Ok(false)` or an
  /// error, the state is left uninitialized.
  pub fn initialize<F, E>(&mut self, create: F) -> Result<bool, E>
  where
    F: FnOnce() -> Result<bool, E>,
    E: From<LifecycleError>,
  {
    self.require_uninitialized()?;

    let created = create()?;
    self.initialized = created;

    Ok(created)
  }

  /// Run `delete` and become uninitialized, whatever `delete` returns.
  ///
  /// Fails without calling `delete` if not initialized.
  pub fn uninitialize<F, E>(&mut self, delete: F) -> Result<(), E>
  where
    F: FnOnce() -> Result<(), E>,
    E: From<LifecycleError>,
  {
    self.require_initialized()?;

    let deleted = delete();
    self.initialized = false;

    deleted
  }
}

/// Types carrying a [`Lifecycle`].
pub trait Initializable {
  fn lifecycle(&self) -> &Lifecycle;

  fn is_initialized(&self) -> bool {
    self.lifecycle().is_initialized()
  }

  fn require_initialized(&self) -> Result<(), LifecycleError> {
    self.lifecycle().require_initialized()
  }

  fn require_uninitialized(&self) -> Result<(), LifecycleError> {
    self.lifecycle().require_uninitialized()
  }
}

impl Initializable for Lifecycle {
  fn lifecycle(&self) -> &Lifecycle {
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fresh_is_uninitialized() {
    let lifecycle = Lifecycle::new();

    assert!(!lifecycle.is_initialized());
    assert_eq!(lifecycle.require_uninitialized(), Ok(()));
    assert_eq!(
      lifecycle.require_initialized(),
      Err(LifecycleError::NotInitialized)
    );
  }

  #[test]
  fn full_cycle() {
    let mut lifecycle = Lifecycle::new();

    assert_eq!(lifecycle.initialize(|| Ok::<_, LifecycleError>(true)), Ok(true));
    assert!(lifecycle.is_initialized());
    assert_eq!(lifecycle.require_initialized(), Ok(()));

    assert_eq!(lifecycle.uninitialize(|| Ok::<_, LifecycleError>(())), Ok(()));
    assert!(!lifecycle.is_initialized());

    // can be initialized again
    assert_eq!(lifecycle.initialize(|| Ok::<_, LifecycleError>(true)), Ok(true));
    assert!(lifecycle.is_initialized());
  }

  #[test]
  fn double_initialize_fails() {
    let mut lifecycle = Lifecycle::new();
    lifecycle
      .initialize(|| Ok::<_, LifecycleError>(true))
      .unwrap();

    let mut called = false;
    let result = lifecycle.initialize(|| {
      called = true;
      Ok::<_, LifecycleError>(true)
    });

    assert_eq!(result, Err(LifecycleError::AlreadyInitialized));
    assert!(!called);
    assert!(lifecycle.is_initialized());
  }

  #[test]
  fn uninitialize_requires_initialized() {
    let mut lifecycle = Lifecycle::new();

    assert_eq!(
      lifecycle.uninitialize(|| Ok::<_, LifecycleError>(())),
      Err(LifecycleError::NotInitialized)
    );
  }

  #[test]
  fn failed_creation_stays_uninitialized() {
    let mut lifecycle = Lifecycle::new();

    assert_eq!(lifecycle.initialize(|| Ok::<_, LifecycleError>(false)), Ok(false));
    assert!(!lifecycle.is_initialized());

    assert_eq!(
      lifecycle.initialize(|| Err::<bool, _>(LifecycleError::NotReferenced)),
      Err(LifecycleError::NotReferenced)
    );
    assert!(!lifecycle.is_initialized());
  }

  #[test]
  fn failed_deletion_still_uninitializes() {
    let mut lifecycle = Lifecycle::new();
    lifecycle
      .initialize(|| Ok::<_, LifecycleError>(true))
      .unwrap();

    assert_eq!(
      lifecycle.uninitialize(|| Err(LifecycleError::NotReferenced)),
      Err(LifecycleError::NotReferenced)
    );
    assert!(!lifecycle.is_initialized());
  }
}

//! GPU objects.
//!
//! A [`GpuObject`] binds the lifetime of a native resource to the allocation bookkeeping of its
//! [`Context`]. The resource-specific part is a [`Resource`]: it knows how to create and delete
//! the native object. The [`GpuObject`] drives it:
//!
//! - [`GpuObject::initialize`] registers a unique identifier in the allocation register, then
//!   creates the resource. If creation yields no handle, or an invalid one, the identifier is
//!   released and the object stays uninitialized.
//! - [`GpuObject::uninitialize`] zeroes the tracked allocation, releases the identifier and
//!   deletes the resource. It fails while the object is referenced.
//!
//! Dropping an initialized object uninitializes it.

use std::error;
use std::fmt;
use std::rc::Rc;

use crate::allocation::AllocationError;
use crate::backend::native::NativeContext;
use crate::context::Context;
use crate::lifecycle::{Initializable, Lifecycle, LifecycleError};

/// Errors of [`GpuObject`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ObjectError {
  Lifecycle(LifecycleError),
  Allocation(AllocationError),
}

impl fmt::Display for ObjectError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ObjectError::Lifecycle(ref e) => write!(f, "lifecycle error: {}", e),
      ObjectError::Allocation(ref e) => write!(f, "allocation error: {}", e),
    }
  }
}

impl error::Error for ObjectError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match *self {
      ObjectError::Lifecycle(ref e) => Some(e),
      ObjectError::Allocation(ref e) => Some(e),
    }
  }
}

impl From<LifecycleError> for ObjectError {
  fn from(e: LifecycleError) -> Self {
    ObjectError::Lifecycle(e)
  }
}

impl From<AllocationError> for ObjectError {
  fn from(e: AllocationError) -> Self {
    ObjectError::Allocation(e)
  }
}

/// Native resource creation and deletion.
pub trait Resource<B>
where
  B: NativeContext,
{
  /// Native handle.
  type Handle;

  /// Arguments of creation.
  type Args;

  /// Create the native resource.
  ///
  /// `identifier` is the unique identifier the object is tracked under; allocations made during
  /// creation can be reported against it. Returns `None` if the resource cannot be created.
  fn create(
    &mut self,
    context: &Context<B>,
    identifier: &str,
    args: Self::Args,
  ) -> Option<Self::Handle>;

  /// Delete the native resource.
  fn delete(&mut self, context: &Context<B>, handle: Self::Handle);

  /// Whether a freshly created handle is usable.
  fn is_valid(&self, _context: &Context<B>, _handle: &Self::Handle) -> bool {
    true
  }
}

/// A native resource tracked by the allocation register of its context.
pub struct GpuObject<B, R>
where
  B: NativeContext,
  R: Resource<B>,
{
  context: Rc<Context<B>>,
  name: String,
  identifier: Option<String>,
  resource: R,
  handle: Option<R::Handle>,
  valid: bool,
  references: usize,
  lifecycle: Lifecycle,
}

impl<B, R> GpuObject<B, R>
where
  B: NativeContext,
  R: Resource<B>,
{
  /// Create an uninitialized object.
  ///
  /// `name` is the base of the identifier it will be tracked under.
  pub fn new(context: Rc<Context<B>>, name: impl Into<String>, resource: R) -> Self {
    GpuObject {
      context,
      name: name.into(),
      identifier: None,
      resource,
      handle: None,
      valid: false,
      references: 0,
      lifecycle: Lifecycle::new(),
    }
  }

  /// Create the native resource.
  ///
  /// Returns `Ok(false)` if the resource could not be created; the object is then left
  /// uninitialized and its identifier is released.
  pub fn initialize(&mut self, args: R::Args) -> Result<bool, ObjectError> {
    let context = &self.context;
    let name = &self.name;
    let resource = &mut self.resource;
    let identifier = &mut self.identifier;
    let handle = &mut self.handle;
    let valid = &mut self.valid;

    self.lifecycle.initialize::<_, ObjectError>(|| {
      let unique = context.allocations().create_unique_identifier(name);
      let created = resource.create(context, &unique, args);

      match created {
        Some(created) if resource.is_valid(context, &created) => {
          log::debug!("initialized {}", unique);

          *handle = Some(created);
          *valid = true;
          *identifier = Some(unique);

          Ok(true)
        }

        created => {
          log::debug!("cannot initialize {}", unique);

          if let Some(invalid) = created {
            resource.delete(context, invalid);
          }

          let allocations = context.allocations();
          allocations.reallocate(&unique, 0)?;
          allocations.delete_unique_identifier(&unique)?;

          Ok(false)
        }
      }
    })
  }

  /// Delete the native resource and its bookkeeping.
  ///
  /// Fails if the object is not initialized, or still referenced.
  pub fn uninitialize(&mut self) -> Result<(), ObjectError> {
    self.lifecycle.require_initialized()?;

    if self.references > 0 {
      return Err(LifecycleError::StillReferenced(self.references).into());
    }

    let context = &self.context;
    let resource = &mut self.resource;
    let identifier = &mut self.identifier;
    let handle = &mut self.handle;
    let valid = &mut self.valid;

    self.lifecycle.uninitialize::<_, ObjectError>(|| {
      let released = match identifier.take() {
        Some(identifier) => {
          let allocations = context.allocations();

          log::debug!("uninitializing {}", identifier);
          allocations
            .reallocate(&identifier, 0)
            .and_then(|_| allocations.delete_unique_identifier(&identifier))
        }

        None => Ok(()),
      };

      if let Some(handle) = handle.take() {
        resource.delete(context, handle);
      }

      *valid = false;

      released.map_err(ObjectError::from)
    })
  }

  /// Take a reference on the object.
  pub fn reference(&mut self) -> Result<(), ObjectError> {
    self.lifecycle.require_initialized()?;
    self.references += 1;
    Ok(())
  }

  /// Release a reference.
  pub fn unreference(&mut self) -> Result<(), ObjectError> {
    if self.references == 0 {
      return Err(LifecycleError::NotReferenced.into());
    }

    self.references -= 1;
    Ok(())
  }

  pub fn references(&self) -> usize {
    self.references
  }

  pub fn context(&self) -> &Rc<Context<B>> {
    &self.context
  }

  /// Identifier the object is tracked under while initialized, its base name otherwise.
  pub fn identifier(&self) -> &str {
    self.identifier.as_deref().unwrap_or(&self.name)
  }

  pub fn resource(&self) -> &R {
    &self.resource
  }

  pub fn resource_mut(&mut self) -> &mut R {
    &mut self.resource
  }

  pub fn handle(&self) -> Result<&R::Handle, ObjectError> {
    self.lifecycle.require_initialized()?;
    self
      .handle
      .as_ref()
      .ok_or_else(|| LifecycleError::NotInitialized.into())
  }

  pub fn is_valid(&self) -> bool {
    self.valid
  }

  /// Report the bytes the native resource currently holds.
  pub fn reallocate(&self, bytes: usize) -> Result<(), ObjectError> {
    self.lifecycle.require_initialized()?;

    let identifier = self.identifier();
    self
      .context
      .allocations()
      .reallocate(identifier, bytes)
      .map_err(ObjectError::from)
  }

  /// Bytes currently reported for the object.
  pub fn allocated(&self) -> Result<usize, ObjectError> {
    self.lifecycle.require_initialized()?;
    Ok(self.context.allocations().allocated_by(self.identifier())?)
  }
}

impl<B, R> Initializable for GpuObject<B, R>
where
  B: NativeContext,
  R: Resource<B>,
{
  fn lifecycle(&self) -> &Lifecycle {
    &self.lifecycle
  }
}

impl<B, R> fmt::Debug for GpuObject<B, R>
where
  B: NativeContext,
  R: Resource<B>,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("GpuObject")
      .field("identifier", &self.identifier())
      .field("valid", &self.valid)
      .field("references", &self.references)
      .field("lifecycle", &self.lifecycle)
      .finish()
  }
}

impl<B, R> Drop for GpuObject<B, R>
where
  B: NativeContext,
  R: Resource<B>,
{
  fn drop(&mut self) {
    if !self.lifecycle.is_initialized() {
      return;
    }

    if self.references > 0 {
      log::warn!(
        "dropping {} while still referenced ({} references)",
        self.identifier(),
        self.references
      );
      self.references = 0;
    }

    if let Err(e) = self.uninitialize() {
      log::warn!("cannot uninitialize {} on drop: {}", self.identifier(), e);
    }
  }
}

//! WebGL buffer implementation.
//!
//! A [`Buffer`] is the [`Resource`] part of a tracked GPU buffer: wrap it in a [`GpuObject`] (see
//! [`TrackedBuffer`]) to get its memory reported to the context's allocation register. Uploading
//! data through [`BufferData`] reallocates the tracked bytes to the new size of the data store.

use operate::context::Context;
use operate::object::{GpuObject, ObjectError, Resource};
use web_sys::WebGlBuffer;

use crate::webgl::state::{Bind, BufferTarget, BufferUsage};
use crate::webgl::WebGl;

/// WebGL buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Buffer {
  target: BufferTarget,
  usage: BufferUsage,
}

impl Buffer {
  pub fn new(target: BufferTarget, usage: BufferUsage) -> Self {
    Buffer { target, usage }
  }

  pub fn target(&self) -> BufferTarget {
    self.target
  }

  pub fn usage(&self) -> BufferUsage {
    self.usage
  }
}

impl Resource<WebGl> for Buffer {
  type Handle = WebGlBuffer;

  /// Initial size of the data store, in bytes.
  type Args = usize;

  fn create(
    &mut self,
    context: &Context<WebGl>,
    identifier: &str,
    size: Self::Args,
  ) -> Option<Self::Handle> {
    let gl_size = match i32::try_from(size) {
      Ok(gl_size) => gl_size,
      Err(_) => {
        log::warn!("cannot create {}: {} bytes is out of range", identifier, size);
        return None;
      }
    };

    let mut state = context.native().state.borrow_mut();

    // generate a buffer and force binding the handle; this prevent side-effects from previous bound
    // resources to prevent binding the buffer
    let handle = state.create_buffer()?;
    state.bind_buffer(self.target, Some(&handle), Bind::Forced);

    if size == 0 {
      return Some(handle);
    }

    state
      .ctx
      .buffer_data_with_i32(self.target.to_gl(), gl_size, self.usage.to_gl());
    drop(state);

    if let Err(e) = context.allocations().allocate(identifier, size) {
      log::warn!("cannot track {}: {}", identifier, e);
      self.delete(context, handle);
      return None;
    }

    Some(handle)
  }

  fn delete(&mut self, context: &Context<WebGl>, handle: Self::Handle) {
    let mut state = context.native().state.borrow_mut();

    state.unbind_buffer(&handle);
    state.ctx.delete_buffer(Some(&handle));
  }

  fn is_valid(&self, context: &Context<WebGl>, handle: &Self::Handle) -> bool {
    context.native().state.borrow().ctx.is_buffer(Some(handle))
  }
}

/// A buffer tracked by the allocation register of its context.
pub type TrackedBuffer = GpuObject<WebGl, Buffer>;

/// Data upload to a tracked buffer.
pub trait BufferData {
  /// Replace the data store with `data`; the tracked size becomes `data.len()`.
  fn data(&self, data: &[u8]) -> Result<(), ObjectError>;

  /// Overwrite part of the data store, starting at `offset` bytes. The tracked size is unchanged.
  fn sub_data(&self, offset: usize, data: &[u8]) -> Result<(), ObjectError>;
}

impl BufferData for TrackedBuffer {
  fn data(&self, data: &[u8]) -> Result<(), ObjectError> {
    let handle = self.handle()?;
    let buffer = self.resource();

    {
      let mut state = self.context().native().state.borrow_mut();
      state.bind_buffer(buffer.target, Some(handle), Bind::Cached);
      state
        .ctx
        .buffer_data_with_u8_array(buffer.target.to_gl(), data, buffer.usage.to_gl());
    }

    self.reallocate(data.len())
  }

  fn sub_data(&self, offset: usize, data: &[u8]) -> Result<(), ObjectError> {
    let handle = self.handle()?;
    let buffer = self.resource();

    let offset = match i32::try_from(offset) {
      Ok(offset) => offset,
      Err(_) => {
        log::warn!("skipping upload to {}: offset {} is out of range", self.identifier(), offset);
        return Ok(());
      }
    };

    let mut state = self.context().native().state.borrow_mut();

    state.bind_buffer(buffer.target, Some(handle), Bind::Cached);
    state
      .ctx
      .buffer_sub_data_with_i32_and_u8_array(buffer.target.to_gl(), offset, data);

    Ok(())
  }
}

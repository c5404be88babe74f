//! GPU memory accounting.
//!
//! An [`AllocationRegister`] keeps track of how many bytes every GPU object currently holds, and
//! of the aggregate over all of them. Objects first reserve a unique identifier with
//! [`AllocationRegister::create_unique_identifier`], then report their allocations against it
//! with [`AllocationRegister::allocate`], [`AllocationRegister::deallocate`] and
//! [`AllocationRegister::reallocate`]. When an object is destroyed, its identifier is removed with
//! [`AllocationRegister::delete_unique_identifier`].
//!
//! Every call that actually changes the aggregate publishes the new total (and its pretty-printed
//! form) to observers registered with [`AllocationRegister::subscribe`]. Observers subscribing
//! after a change immediately receive the latest total.
//!
//! All precondition violations (unknown identifiers, releasing more than is held) are reported as
//! [`AllocationError`]. Nothing is clamped: a wrong bookkeeping call is a bug in the caller and
//! silently absorbing it would make the numbers useless for diagnostics.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::error;
use std::fmt;

use crate::observable::{ReplaySubject, SubscriptionId};

/// Errors raised by the [`AllocationRegister`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AllocationError {
  /// The identifier was never registered (or was already deleted).
  UnknownIdentifier(String),
  /// Deallocating more bytes than the identifier currently holds.
  Underflow {
    identifier: String,
    allocated: usize,
    requested: usize,
  },
  /// The aggregate would not fit in `usize`.
  Overflow { identifier: String, requested: usize },
}

impl AllocationError {
  fn unknown_identifier(identifier: impl Into<String>) -> Self {
    AllocationError::UnknownIdentifier(identifier.into())
  }
}

impl fmt::Display for AllocationError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      AllocationError::UnknownIdentifier(ref identifier) => {
        write!(f, "unknown allocation identifier: {}", identifier)
      }

      AllocationError::Underflow {
        ref identifier,
        allocated,
        requested,
      } => write!(
        f,
        "cannot deallocate {} bytes from {} (only {} allocated)",
        requested, identifier, allocated
      ),

      AllocationError::Overflow {
        ref identifier,
        requested,
      } => write!(
        f,
        "allocating {} bytes for {} overflows the aggregate",
        requested, identifier
      ),
    }
  }
}

impl error::Error for AllocationError {}

/// Format a byte count with binary prefixes, e.g. `1.500MiB`.
///
/// Counts below 1024 are printed without decimals (`512B`).
pub fn pretty_print_bytes(bytes: usize) -> String {
  const PREFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

  let mut prefix = 0;
  let mut scale = 1u128;

  while prefix + 1 < PREFIXES.len() && bytes as u128 >= scale * 1024 {
    scale *= 1024;
    prefix += 1;
  }

  if prefix == 0 {
    format!("{}B", bytes)
  } else {
    format!("{:.3}{}B", bytes as f64 / scale as f64, PREFIXES[prefix])
  }
}

/// Tracks named GPU allocations and their aggregate.
///
/// The register is shared by reference: every operation takes `&self`. Observers are notified
/// once the bookkeeping is updated and released, so they can freely read the register (or even
/// change it; such nested changes are delivered after the current notification).
#[derive(Debug, Default)]
pub struct AllocationRegister {
  state: RefCell<Allocations>,
  // (aggregate bytes, pretty-printed aggregate)
  changes: RefCell<ReplaySubject<(usize, String)>>,
  pending: RefCell<VecDeque<(usize, String)>>,
}

#[derive(Debug, Default)]
struct Allocations {
  bytes_by_identifier: BTreeMap<String, usize>,
  bytes: usize,
}

impl AllocationRegister {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register `identifier`, uniquified with a numeric suffix if it is already taken.
  ///
  /// The first registration of `name` returns `name`; the following ones return `name-2`,
  /// `name-3`, and so on (skipping suffixes that are still in use). The new identifier starts at
  /// zero bytes.
  pub fn create_unique_identifier(&self, identifier: &str) -> String {
    let mut state = self.state.borrow_mut();
    let mut unique = identifier.to_owned();
    let mut count = 2;

    while state.bytes_by_identifier.contains_key(&unique) {
      unique = format!("{}-{}", identifier, count);
      count += 1;
    }

    state.bytes_by_identifier.insert(unique.clone(), 0);
    unique
  }

  /// Remove the bookkeeping of `identifier`.
  ///
  /// Bytes still held by the identifier are released from the aggregate first.
  pub fn delete_unique_identifier(&self, identifier: &str) -> Result<(), AllocationError> {
    let held = self.allocated_by(identifier)?;

    if held > 0 {
      log::warn!(
        "deleting identifier {} while it still holds {}",
        identifier,
        pretty_print_bytes(held)
      );
      self.deallocate(identifier, held)?;
    }

    self.state.borrow_mut().bytes_by_identifier.remove(identifier);
    Ok(())
  }

  /// Whether `identifier` is currently registered.
  pub fn contains(&self, identifier: &str) -> bool {
    self.state.borrow().bytes_by_identifier.contains_key(identifier)
  }

  /// All registered identifiers, in lexicographic order.
  pub fn identifiers(&self) -> Vec<String> {
    self.state.borrow().bytes_by_identifier.keys().cloned().collect()
  }

  /// Add `bytes` to the allocation of `identifier`.
  pub fn allocate(&self, identifier: &str, bytes: usize) -> Result<(), AllocationError> {
    let held = self.allocated_by(identifier)?;

    if bytes == 0 {
      return Ok(());
    }

    let overflow = || AllocationError::Overflow {
      identifier: identifier.to_owned(),
      requested: bytes,
    };
    let total = self.allocated().checked_add(bytes).ok_or_else(overflow)?;
    let held = held.checked_add(bytes).ok_or_else(overflow)?;

    self.commit(identifier, held, total);
    Ok(())
  }

  /// Remove `bytes` from the allocation of `identifier`.
  pub fn deallocate(&self, identifier: &str, bytes: usize) -> Result<(), AllocationError> {
    let held = self.allocated_by(identifier)?;

    if bytes > held {
      return Err(AllocationError::Underflow {
        identifier: identifier.to_owned(),
        allocated: held,
        requested: bytes,
      });
    }

    if bytes == 0 {
      return Ok(());
    }

    let total = self.allocated() - bytes;
    self.commit(identifier, held - bytes, total);
    Ok(())
  }

  /// Replace the allocation of `identifier` with `bytes`.
  pub fn reallocate(&self, identifier: &str, bytes: usize) -> Result<(), AllocationError> {
    let held = self.allocated_by(identifier)?;

    if bytes > held {
      self.allocate(identifier, bytes - held)
    } else {
      self.deallocate(identifier, held - bytes)
    }
  }

  /// Bytes held by `identifier`.
  pub fn allocated_by(&self, identifier: &str) -> Result<usize, AllocationError> {
    self
      .state
      .borrow()
      .bytes_by_identifier
      .get(identifier)
      .copied()
      .ok_or_else(|| AllocationError::unknown_identifier(identifier))
  }

  /// Bytes held over all identifiers.
  pub fn allocated(&self) -> usize {
    self.state.borrow().bytes
  }

  /// Pretty-printed bytes held by `identifier`.
  pub fn bytes_to_string_by(&self, identifier: &str) -> Result<String, AllocationError> {
    self.allocated_by(identifier).map(pretty_print_bytes)
  }

  /// Pretty-printed aggregate.
  pub fn bytes_to_string(&self) -> String {
    pretty_print_bytes(self.allocated())
  }

  /// Observe aggregate changes as `(bytes, pretty-printed bytes)`.
  ///
  /// Observers must not subscribe or unsubscribe from within a notification.
  pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
  where
    F: FnMut(&(usize, String)) + 'static,
  {
    self.changes.borrow_mut().subscribe(observer)
  }

  pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
    self.changes.borrow_mut().unsubscribe(id)
  }

  fn commit(&self, identifier: &str, held: usize, total: usize) {
    {
      let mut state = self.state.borrow_mut();

      if let Some(entry) = state.bytes_by_identifier.get_mut(identifier) {
        *entry = held;
      }

      state.bytes = total;
    }

    log::trace!(
      "{} now holds {} ({} in total)",
      identifier,
      pretty_print_bytes(held),
      pretty_print_bytes(total)
    );

    self
      .pending
      .borrow_mut()
      .push_back((total, pretty_print_bytes(total)));
    self.publish();
  }

  fn publish(&self) {
    // already publishing further up the stack; that loop delivers what was just queued
    let mut changes = match self.changes.try_borrow_mut() {
      Ok(changes) => changes,
      Err(_) => return,
    };

    loop {
      let next = self.pending.borrow_mut().pop_front();

      match next {
        Some(change) => changes.next(change),
        None => break,
      }
    }
  }
}

impl fmt::Display for AllocationRegister {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    let mut first = true;

    for (identifier, bytes) in &self.state.borrow().bytes_by_identifier {
      if !first {
        f.write_str(", ")?;
      }

      write!(f, "{}: {}", identifier, pretty_print_bytes(*bytes))?;
      first = false;
    }

    Ok(())
  }
}

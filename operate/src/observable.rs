//! Replaying multicast notifications.
//!
//! A [`ReplaySubject`] broadcasts values to any number of observers. It remembers the most recent
//! value it published so that an observer subscribing late immediately receives it, before any
//! subsequent update. Updates are delivered synchronously, in the order they were published.

use std::fmt;

/// Identifier of a subscription, used to cancel it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SubscriptionId(usize);

type Observer<T> = Box<dyn FnMut(&T)>;

/// Multicast subject replaying its latest value to new observers.
pub struct ReplaySubject<T> {
  latest: Option<T>,
  observers: Vec<(SubscriptionId, Observer<T>)>,
  next_id: usize,
}

impl<T> Default for ReplaySubject<T> {
  fn default() -> Self {
    ReplaySubject {
      latest: None,
      observers: Vec::new(),
      next_id: 0,
    }
  }
}

impl<T> fmt::Debug for ReplaySubject<T>
where
  T: fmt::Debug,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("ReplaySubject")
      .field("latest", &self.latest)
      .field("observers", &self.observers.len())
      .finish()
  }
}

impl<T> ReplaySubject<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register an observer.
  ///
  /// If a value was already published, the observer is called with it before this function
  /// returns.
  pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
  where
    F: FnMut(&T) + 'static,
  {
    let id = SubscriptionId(self.next_id);
    self.next_id += 1;

    let mut observer: Observer<T> = Box::new(observer);

    if let Some(ref latest) = self.latest {
      observer(latest);
    }

    self.observers.push((id, observer));
    id
  }

  /// Cancel a subscription. Returns `false` if it was not active.
  pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
    let len = self.observers.len();
    self.observers.retain(|(sid, _)| *sid != id);
    self.observers.len() != len
  }

  /// Publish a value to every observer and remember it for late subscribers.
  pub fn next(&mut self, value: T) {
    for (_, observer) in &mut self.observers {
      observer(&value);
    }

    self.latest = Some(value);
  }

  /// The most recently published value, if any.
  pub fn latest(&self) -> Option<&T> {
    self.latest.as_ref()
  }

  pub fn observer_count(&self) -> usize {
    self.observers.len()
  }
}

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{init_logger, webgl2_context, MockNative};
use operate::context::Context;
use operate::lifecycle::{Initializable, LifecycleError};
use operate::object::{GpuObject, ObjectError, Resource};

#[derive(Debug, Default)]
struct Counters {
  created: Cell<usize>,
  deleted: Cell<usize>,
}

/// Resource whose creation yields the handle passed as argument; `0` is an invalid handle.
#[derive(Debug)]
struct FakeBuffer {
  counters: Rc<Counters>,
  bytes_on_create: usize,
}

impl Resource<MockNative> for FakeBuffer {
  type Handle = u32;
  type Args = Option<u32>;

  fn create(
    &mut self,
    context: &Context<MockNative>,
    identifier: &str,
    args: Self::Args,
  ) -> Option<Self::Handle> {
    self.counters.created.set(self.counters.created.get() + 1);
    context
      .allocations()
      .allocate(identifier, self.bytes_on_create)
      .ok()?;
    args
  }

  fn delete(&mut self, _: &Context<MockNative>, _: Self::Handle) {
    self.counters.deleted.set(self.counters.deleted.get() + 1);
  }

  fn is_valid(&self, _: &Context<MockNative>, handle: &Self::Handle) -> bool {
    *handle != 0
  }
}

fn buffer(
  context: &Rc<Context<MockNative>>,
  bytes_on_create: usize,
) -> (GpuObject<MockNative, FakeBuffer>, Rc<Counters>) {
  let counters = Rc::new(Counters::default());
  let object = GpuObject::new(
    context.clone(),
    "Buffer",
    FakeBuffer {
      counters: counters.clone(),
      bytes_on_create,
    },
  );

  (object, counters)
}

#[test]
fn lifecycle() {
  init_logger();
  let context = webgl2_context();
  let (mut object, counters) = buffer(&context, 0);

  assert!(!object.is_initialized());
  assert_eq!(
    object.handle(),
    Err(ObjectError::Lifecycle(LifecycleError::NotInitialized))
  );

  assert_eq!(object.initialize(Some(7)), Ok(true));
  assert!(object.is_initialized());
  assert!(object.is_valid());
  assert_eq!(object.handle(), Ok(&7));
  assert_eq!(object.identifier(), "Buffer");
  assert!(context.allocations().contains("Buffer"));

  assert_eq!(
    object.initialize(Some(8)),
    Err(ObjectError::Lifecycle(LifecycleError::AlreadyInitialized))
  );
  assert_eq!(counters.created.get(), 1);

  assert_eq!(object.uninitialize(), Ok(()));
  assert!(!object.is_initialized());
  assert!(!object.is_valid());
  assert!(!context.allocations().contains("Buffer"));
  assert_eq!(counters.deleted.get(), 1);

  assert_eq!(
    object.uninitialize(),
    Err(ObjectError::Lifecycle(LifecycleError::NotInitialized))
  );

  // can be initialized again
  assert_eq!(object.initialize(Some(9)), Ok(true));
  assert_eq!(object.handle(), Ok(&9));
}

#[test]
fn invalid_handle_leaves_no_trace() {
  let context = webgl2_context();
  let (mut object, counters) = buffer(&context, 256);

  assert_eq!(object.initialize(Some(0)), Ok(false));
  assert!(!object.is_initialized());
  assert!(!object.is_valid());
  assert_eq!(context.allocations().identifiers().len(), 0);
  assert_eq!(context.allocations().allocated(), 0);

  // the invalid native object is deleted
  assert_eq!(counters.deleted.get(), 1);
}

#[test]
fn failed_creation_leaves_no_trace() {
  let context = webgl2_context();
  let (mut object, counters) = buffer(&context, 0);

  assert_eq!(object.initialize(None), Ok(false));
  assert!(!object.is_initialized());
  assert_eq!(context.allocations().identifiers().len(), 0);
  assert_eq!(counters.deleted.get(), 0);

  // nothing to tear down
  drop(object);
  assert_eq!(counters.deleted.get(), 0);
}

#[test]
fn identifiers_are_uniquified() {
  let context = webgl2_context();
  let (mut a, _) = buffer(&context, 0);
  let (mut b, _) = buffer(&context, 0);
  let (mut c, _) = buffer(&context, 0);

  a.initialize(Some(1)).unwrap();
  b.initialize(Some(2)).unwrap();
  c.initialize(Some(3)).unwrap();

  assert_eq!(a.identifier(), "Buffer");
  assert_eq!(b.identifier(), "Buffer-2");
  assert_eq!(c.identifier(), "Buffer-3");

  b.uninitialize().unwrap();
  assert_eq!(b.identifier(), "Buffer");

  let identifiers = context.allocations().identifiers();
  assert_eq!(identifiers, vec!["Buffer", "Buffer-3"]);
}

#[test]
fn allocations_are_tracked() {
  let context = webgl2_context();
  let (mut a, _) = buffer(&context, 128);
  let (mut b, _) = buffer(&context, 0);

  assert_eq!(
    a.reallocate(64),
    Err(ObjectError::Lifecycle(LifecycleError::NotInitialized))
  );

  a.initialize(Some(1)).unwrap();
  b.initialize(Some(2)).unwrap();
  assert_eq!(a.allocated(), Ok(128));

  a.reallocate(1024).unwrap();
  b.reallocate(2048).unwrap();
  assert_eq!(a.allocated(), Ok(1024));
  assert_eq!(context.allocations().allocated(), 3072);

  a.uninitialize().unwrap();
  assert_eq!(context.allocations().allocated(), 2048);

  b.uninitialize().unwrap();
  assert_eq!(context.allocations().allocated(), 0);
}

#[test]
fn allocation_changes_are_observed() {
  let context = webgl2_context();
  let (mut object, _) = buffer(&context, 0);
  let seen = Rc::new(RefCell::new(Vec::new()));

  {
    let seen = seen.clone();
    context
      .allocations()
      .subscribe(move |(bytes, pretty)| seen.borrow_mut().push((*bytes, pretty.clone())));
  }

  object.initialize(Some(1)).unwrap();
  object.reallocate(1536).unwrap();
  object.reallocate(1536).unwrap();
  object.uninitialize().unwrap();

  assert_eq!(
    *seen.borrow(),
    vec![(1536, "1.500KiB".to_owned()), (0, "0B".to_owned())]
  );
}

#[test]
fn references_block_uninitialize() {
  let context = webgl2_context();
  let (mut object, counters) = buffer(&context, 0);

  assert_eq!(
    object.reference(),
    Err(ObjectError::Lifecycle(LifecycleError::NotInitialized))
  );

  object.initialize(Some(1)).unwrap();
  object.reference().unwrap();
  object.reference().unwrap();
  assert_eq!(object.references(), 2);

  assert_eq!(
    object.uninitialize(),
    Err(ObjectError::Lifecycle(LifecycleError::StillReferenced(2)))
  );
  assert!(object.is_initialized());
  assert_eq!(counters.deleted.get(), 0);

  object.unreference().unwrap();
  object.unreference().unwrap();
  assert_eq!(
    object.unreference(),
    Err(ObjectError::Lifecycle(LifecycleError::NotReferenced))
  );

  assert_eq!(object.uninitialize(), Ok(()));
}

#[test]
fn drop_tears_down() {
  init_logger();
  let context = webgl2_context();
  let (mut a, a_counters) = buffer(&context, 512);
  let (mut b, b_counters) = buffer(&context, 512);

  a.initialize(Some(1)).unwrap();
  b.initialize(Some(2)).unwrap();
  b.reference().unwrap();
  assert_eq!(context.allocations().allocated(), 1024);

  drop(a);
  drop(b);

  assert_eq!(a_counters.deleted.get(), 1);
  assert_eq!(b_counters.deleted.get(), 1);
  assert_eq!(context.allocations().allocated(), 0);
  assert_eq!(context.allocations().identifiers().len(), 0);
}

#[test]
fn observers_can_inspect_the_context() {
  let context = webgl2_context();
  let (mut object, _) = buffer(&context, 96);
  let seen = Rc::new(RefCell::new(Vec::new()));

  {
    let weak = Rc::downgrade(&context);
    let seen = seen.clone();
    context.allocations().subscribe(move |&(bytes, _): &(usize, String)| {
      let context = weak.upgrade().unwrap();
      seen
        .borrow_mut()
        .push((bytes, context.allocations().identifiers()));
    });
  }

  object.initialize(Some(1)).unwrap();
  object.uninitialize().unwrap();

  assert_eq!(
    *seen.borrow(),
    vec![(96, vec!["Buffer".to_owned()]), (0, vec!["Buffer".to_owned()])]
  );
}

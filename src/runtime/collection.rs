//! Child containers backing `array` / `hash` builder methods.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::runtime::Instance;
use crate::value::Key;

/// Shape of the container a builder method stores children in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionKind {
    /// Not a collection builder method.
    #[default]
    None,
    /// Ordered list; each call appends.
    List,
    /// Keyed map; the leading argument is the key.
    Map,
}

#[derive(Debug)]
enum Container {
    List(Vec<Instance>),
    Map(IndexMap<Key, Instance>),
}

/// Shared handle to a memoized child container.
///
/// Cloning the handle shares the container; a keyed map keeps the position of
/// a key's first insertion when its value is replaced.
#[derive(Clone)]
pub struct Collection(Rc<RefCell<Container>>);

impl Collection {
    /// Creates an empty container. `CollectionKind::None` yields a list.
    pub fn new(kind: CollectionKind) -> Self {
        let container = match kind {
            CollectionKind::Map => Container::Map(IndexMap::new()),
            CollectionKind::List | CollectionKind::None => Container::List(Vec::new()),
        };
        Collection(Rc::new(RefCell::new(container)))
    }

    pub fn kind(&self) -> CollectionKind {
        match &*self.0.borrow() {
            Container::List(_) => CollectionKind::List,
            Container::Map(_) => CollectionKind::Map,
        }
    }

    pub fn len(&self) -> usize {
        match &*self.0.borrow() {
            Container::List(items) => items.len(),
            Container::Map(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends to a list. On a keyed map the instance is stored under its
    /// position index.
    pub fn push(&self, instance: Instance) {
        let mut container = self.0.borrow_mut();
        match &mut *container {
            Container::List(items) => items.push(instance),
            Container::Map(items) => {
                let key = Key::Int(items.len() as i64);
                items.insert(key, instance);
            }
        }
    }

    /// Stores `instance` under `key`, returning the replaced instance.
    /// On a list the key is ignored and the instance appended.
    pub fn insert(&self, key: Key, instance: Instance) -> Option<Instance> {
        let mut container = self.0.borrow_mut();
        match &mut *container {
            Container::Map(items) => items.insert(key, instance),
            Container::List(items) => {
                items.push(instance);
                None
            }
        }
    }

    /// Instance at enumeration position `index`.
    pub fn get(&self, index: usize) -> Option<Instance> {
        match &*self.0.borrow() {
            Container::List(items) => items.get(index).cloned(),
            Container::Map(items) => items.get_index(index).map(|(_, v)| v.clone()),
        }
    }

    /// Instance stored under `key` (keyed maps only).
    pub fn get_key(&self, key: &Key) -> Option<Instance> {
        match &*self.0.borrow() {
            Container::Map(items) => items.get(key).cloned(),
            Container::List(_) => None,
        }
    }

    /// Keys in enumeration order; empty for lists.
    pub fn keys(&self) -> Vec<Key> {
        match &*self.0.borrow() {
            Container::Map(items) => items.keys().cloned().collect(),
            Container::List(_) => Vec::new(),
        }
    }

    /// Snapshot of the stored instances in enumeration order.
    pub fn instances(&self) -> Vec<Instance> {
        match &*self.0.borrow() {
            Container::List(items) => items.clone(),
            Container::Map(items) => items.values().cloned().collect(),
        }
    }

    pub fn first(&self) -> Option<Instance> {
        self.get(0)
    }

    pub fn last(&self) -> Option<Instance> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0.borrow() {
            Container::List(items) => write!(f, "#<List len={}>", items.len()),
            Container::Map(items) => {
                write!(f, "#<Map keys=[")?;
                for (i, key) in items.keys().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}")?;
                }
                write!(f, "]>")
            }
        }
    }
}

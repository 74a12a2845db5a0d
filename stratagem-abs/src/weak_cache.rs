/*!

A small utility for memoisation tables whose keys and values are reference-counted values that
must not be kept alive by the cache itself. This is the weak-map building block the lattice op-cache
(`stratagem::lattice`) is built from: a cache entry is identified by the *pointer identity* of the
other operand, and holds only a `Weak` reference to the result, so a cache hit never extends the
lifetime of anything beyond what the caller already holds live.

Grounded on the contract documented (but whose implementation was not retrieved into this corpus)
by the teacher project's `mod2_abs::rccell` module: "Reference counted pointers with mutable
stable, and complementary weak pointers."

*/

use std::{
  cell::RefCell,
  collections::HashMap,
  hash::{Hash, Hasher},
  rc::{Rc, Weak},
};

/// Wraps a `Weak<T>` so it can be used as a hash map key by pointer identity. `Weak::as_ptr`
/// remains stable for the lifetime of the backing allocation even after every strong reference
/// is dropped, which is exactly the identity this cache needs.
struct PtrKey<T: ?Sized>(Weak<T>);

impl<T: ?Sized> PtrKey<T> {
  fn addr(&self) -> usize {
    self.0.as_ptr() as *const () as usize
  }
}

impl<T: ?Sized> PartialEq for PtrKey<T> {
  fn eq(&self, other: &Self) -> bool {
    self.addr() == other.addr()
  }
}
impl<T: ?Sized> Eq for PtrKey<T> {}

impl<T: ?Sized> Hash for PtrKey<T> {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.addr().hash(state)
  }
}

/// A weakly-referenced memoisation table keyed by the pointer identity of an `Rc<K>`, holding a
/// `Weak<V>` to the memoised result.
///
/// Because both keys and values are held weakly, entries are reclaimed automatically once nothing
/// else references them; [`WeakCache::get`] performs the "is this entry still alive" check on
/// every lookup, so a stale entry is simply treated as a cache miss rather than requiring an
/// explicit sweep pass. [`WeakCache::sweep`] is provided for callers who want to reclaim map slots
/// for dead entries proactively (e.g. between saturation rounds).
pub struct WeakCache<K: ?Sized, V: ?Sized> {
  entries: RefCell<HashMap<PtrKey<K>, Weak<V>>>,
}

impl<K: ?Sized, V: ?Sized> Default for WeakCache<K, V> {
  fn default() -> Self {
    Self { entries: RefCell::new(HashMap::new()) }
  }
}

impl<K: ?Sized, V: ?Sized> WeakCache<K, V> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Looks up the entry for `key`'s identity. Returns `None` on a miss, and also treats an entry
  /// whose stored key or value has been reclaimed as a miss, removing the stale slot.
  ///
  /// `PtrKey` equality is address-only, so a probe can match a slot whose original key has since
  /// been dropped and had its allocation reused by an unrelated `Rc<K>`. Checking only the value's
  /// liveness is not enough to rule this out: the old value can still be alive through some other
  /// referent, which would return it for a key it was never memoised against. Upgrading the stored
  /// key's `Weak` as well confirms the slot still refers to the same live allocation as `key`.
  pub fn get(&self, key: &Rc<K>) -> Option<Rc<V>> {
    let probe = PtrKey(Rc::downgrade(key));
    let mut entries = self.entries.borrow_mut();
    match entries.get_key_value(&probe) {
      Some((stored_key, weak)) if stored_key.0.strong_count() > 0 => match weak.upgrade() {
        Some(value) => Some(value),
        None => {
          entries.remove(&probe);
          None
        }
      },
      Some(_) => {
        entries.remove(&probe);
        None
      }
      None => None,
    }
  }

  pub fn insert(&self, key: &Rc<K>, value: &Rc<V>) {
    self.entries.borrow_mut().insert(PtrKey(Rc::downgrade(key)), Rc::downgrade(value));
  }

  /// Removes every entry whose key or value has already been reclaimed.
  pub fn sweep(&self) {
    self.entries.borrow_mut().retain(|k, v| k.0.strong_count() > 0 && v.strong_count() > 0);
  }

  pub fn len(&self) -> usize {
    self.entries.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

use core::{
	borrow::Borrow,
	fmt::{self, Debug, Formatter},
	hash::{BuildHasher, Hash},
};
use hashbrown::{
	hash_map::{DefaultHashBuilder, DrainFilter, Entry},
	HashMap,
};
use num_traits::{CheckedAdd, CheckedSub, One, Zero};

/// A map of counted values. Values whose count dropped to zero ("weak" values) stay in place until drained.
pub struct RcHashMap<K, C, V, S = DefaultHashBuilder>(HashMap<K, (C, V), S>)
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher;
impl<K, C, V, S> Default for RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: Default + BuildHasher,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, C, V, S> Debug for RcHashMap<K, C, V, S>
where
	K: Hash + Eq + Debug,
	C: CheckedAdd + CheckedSub + One + Zero + Debug,
	S: BuildHasher,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.0.iter().map(|(k, (c, _))| (k, c))).finish()
	}
}
impl<K, C, V, S> RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher,
{
	#[must_use]
	pub fn new() -> Self
	where
		S: Default,
	{
		Self(HashMap::with_hasher(S::default()))
	}

	/// Increments the count for `k`, or inserts `v()` with a count of one.
	///
	/// A weak entry is revived by this, keeping its value.
	pub fn increment_or_insert_with<F: FnOnce() -> V>(&mut self, k: K, v: F) -> Result<&mut V, CountSaturatedError> {
		match self.0.entry(k) {
			Entry::Occupied(occupied) => {
				let (c, v) = occupied.into_mut();
				*c = c.checked_add(&C::one()).ok_or(CountSaturatedError)?;
				Ok(v)
			}
			Entry::Vacant(vacant) => {
				let (_, v) = vacant.insert((C::one(), v()));
				Ok(v)
			}
		}
	}

	/// Decrements the count for `k` without removing the entry.
	pub fn weak_decrement<Q: ?Sized>(&mut self, k: &Q) -> Result<Option<&mut V>, CountSaturatedError>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		match self.0.get_mut(k) {
			Some((c, v)) => {
				*c = c.checked_sub(&C::one()).ok_or(CountSaturatedError)?;
				Ok(Some(v))
			}
			None => Ok(None),
		}
	}

	#[cfg(test)]
	pub fn count<Q: ?Sized>(&self, k: &Q) -> Option<&C>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		self.0.get(k).map(|(c, _)| c)
	}

	/// Removes and yields all entries with a count of zero.
	pub fn drain_weak(&mut self) -> DrainWeak<'_, K, C, V> {
		DrainWeak(self.0.drain_filter(weak_filter::<K, C, V> as fn(&K, &mut (C, V)) -> bool))
	}

	/// Removes and yields all entries, regardless of count.
	pub fn drain(&mut self) -> impl '_ + Iterator<Item = (K, V)> {
		self.0.drain().map(|(k, (_, v))| (k, v))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

fn weak_filter<K, C: Zero, V>(_: &K, (c, _): &mut (C, V)) -> bool {
	c.is_zero()
}

pub struct DrainWeak<'a, K, C, V>(DrainFilter<'a, K, (C, V), fn(&K, &mut (C, V)) -> bool>);
impl<'a, K, C, V> Iterator for DrainWeak<'a, K, C, V> {
	type Item = (K, V);

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|(k, (_, v))| (k, v))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSaturatedError;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn weak_entries_drain_once() {
		let mut map = RcHashMap::<&str, u16, u32>::new();
		assert_eq!(*map.increment_or_insert_with("click", || 1).unwrap(), 1);
		assert_eq!(*map.increment_or_insert_with("click", || 2).unwrap(), 1);
		map.increment_or_insert_with("submit", || 3).unwrap();
		assert_eq!(map.count("click"), Some(&2));

		map.weak_decrement("click").unwrap();
		assert_eq!(map.drain_weak().count(), 0);

		map.weak_decrement("click").unwrap();
		map.weak_decrement("submit").unwrap();
		let mut drained = map.drain_weak().collect::<Vec<_>>();
		drained.sort_unstable();
		assert_eq!(drained, [("click", 1), ("submit", 3)]);
		assert!(map.is_empty());
	}

	#[test]
	fn revived_before_drain() {
		let mut map = RcHashMap::<&str, u16, u32>::new();
		map.increment_or_insert_with("click", || 1).unwrap();
		map.weak_decrement("click").unwrap();
		assert_eq!(*map.increment_or_insert_with("click", || 2).unwrap(), 1);
		assert_eq!(map.drain_weak().count(), 0);
		assert_eq!(map.len(), 1);
	}

	#[test]
	fn underflow_and_saturation() {
		let mut map = RcHashMap::<&str, u8, ()>::new();
		assert_eq!(map.weak_decrement("missing").unwrap(), None);
		map.increment_or_insert_with("click", || ()).unwrap();
		map.weak_decrement("click").unwrap();
		assert_eq!(map.weak_decrement("click"), Err(CountSaturatedError));
		for _ in 0..u8::MAX {
			map.increment_or_insert_with("click", || ()).unwrap();
		}
		assert_eq!(map.increment_or_insert_with("click", || ()), Err(CountSaturatedError));
	}
}

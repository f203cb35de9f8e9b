use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::clock::Clock;
use crate::clock::SystemClock;

/// A stored value together with the moment it was written and its lifetime.
#[derive(Debug, Clone)]
struct ExpiringEntry<V> {
	value: V,
	inserted_at: u64,
	ttl_millis: u64,
}

impl<V> ExpiringEntry<V> {
	fn new(value: V, now: u64, ttl: Duration) -> Self {
		Self {
			value,
			inserted_at: now,
			ttl_millis: ttl.as_millis().min(u64::MAX as u128) as u64,
		}
	}

	/// An entry is dead once `now - inserted_at >= ttl`.
	fn is_live_at(&self, now: u64) -> bool {
		now.saturating_sub(self.inserted_at) < self.ttl_millis
	}

	fn remaining_at(&self, now: u64) -> Duration {
		let elapsed = now.saturating_sub(self.inserted_at);
		Duration::from_millis(self.ttl_millis.saturating_sub(elapsed))
	}
}

/// Key/value store whose entries disappear once their time-to-live elapses.
///
/// Expiry is lazy: a dead entry may still occupy memory until the next read
/// of its key or a call to [`SelfExpiringMap::purge_expired`], but every read
/// treats it as absent. The compound operations run under the key's shard
/// lock, so a check followed by a refresh is atomic per key.
pub struct SelfExpiringMap<K, V> {
	inner: DashMap<K, ExpiringEntry<V>>,
	clock: Arc<dyn Clock>,
}

impl<K, V> SelfExpiringMap<K, V>
where
	K: Eq + Hash + Clone,
	V: Clone,
{
	pub fn new() -> Self {
		Self::with_clock(Arc::new(SystemClock))
	}

	pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
		Self {
			inner: DashMap::new(),
			clock,
		}
	}

	/// Store `value` under `key` for `ttl`, replacing any previous entry.
	///
	/// Returns the previous value if it was still live.
	pub fn put(&self, key: K, value: V, ttl: Duration) -> Option<V> {
		let now = self.clock.now_millis();
		self.inner
			.insert(key, ExpiringEntry::new(value, now, ttl))
			.filter(|old| old.is_live_at(now))
			.map(|old| old.value)
	}

	pub fn get(&self, key: &K) -> Option<V> {
		let now = self.clock.now_millis();
		match self.inner.get(key) {
			Some(entry) if entry.is_live_at(now) => return Some(entry.value.clone()),
			Some(_) => {}
			None => return None,
		}
		self.evict(key, now);
		None
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.get(key).is_some()
	}

	/// Time left before the entry under `key` expires.
	pub fn remaining(&self, key: &K) -> Option<Duration> {
		let now = self.clock.now_millis();
		self.inner
			.get(key)
			.filter(|entry| entry.is_live_at(now))
			.map(|entry| entry.remaining_at(now))
	}

	/// Remove `key` whatever its expiry state.
	pub fn remove(&self, key: &K) -> Option<V> {
		self.inner.remove(key).map(|(_, entry)| entry.value)
	}

	/// Insert `value` unless a live entry already exists.
	///
	/// Returns the live value that blocked the insertion, or `None` when the
	/// new value was stored.
	pub fn insert_if_vacant(&self, key: K, value: V, ttl: Duration) -> Option<V> {
		let now = self.clock.now_millis();
		match self.inner.entry(key) {
			Entry::Occupied(mut occupied) => {
				if occupied.get().is_live_at(now) {
					return Some(occupied.get().value.clone());
				}
				occupied.insert(ExpiringEntry::new(value, now, ttl));
				None
			}
			Entry::Vacant(vacant) => {
				vacant.insert(ExpiringEntry::new(value, now, ttl));
				None
			}
		}
	}

	/// Remove and return the live entry under `key` if `accept` agrees with
	/// its value; otherwise store `value` and return `None`.
	pub fn take_or_insert<F>(&self, key: K, value: V, ttl: Duration, accept: F) -> Option<V>
	where
		F: FnOnce(&V) -> bool,
	{
		let now = self.clock.now_millis();
		match self.inner.entry(key) {
			Entry::Occupied(mut occupied) => {
				let entry = occupied.get();
				if entry.is_live_at(now) && accept(&entry.value) {
					return Some(occupied.remove().value);
				}
				occupied.insert(ExpiringEntry::new(value, now, ttl));
				None
			}
			Entry::Vacant(vacant) => {
				vacant.insert(ExpiringEntry::new(value, now, ttl));
				None
			}
		}
	}

	/// Physically drop every dead entry. Returns how many were dropped.
	pub fn purge_expired(&self) -> usize {
		let now = self.clock.now_millis();
		let before = self.inner.len();
		self.inner.retain(|_, entry| entry.is_live_at(now));
		before.saturating_sub(self.inner.len())
	}

	/// Number of physically stored entries, dead ones included.
	pub fn stored_len(&self) -> usize {
		self.inner.len()
	}

	fn evict(&self, key: &K, now: u64) {
		self.inner.remove_if(key, |_, entry| !entry.is_live_at(now));
	}
}

impl<K, V> Default for SelfExpiringMap<K, V>
where
	K: Eq + Hash + Clone,
	V: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}

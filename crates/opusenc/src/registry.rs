// SPDX-License-Identifier: MPL-2.0
//! The indirection table between native callbacks and Rust sinks.
//!
//! libopusenc hands its callbacks a single `void *` of user data. Instead of
//! pointing that at session memory, each session registers its sink here and
//! passes the resulting [`WriterId`] through as the token. The callbacks
//! resolve the token back to the sink with [`WriterRegistry::get`].

use crate::sink::SharedSink;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::{collections::HashMap, ffi::c_void, fmt};

static REGISTRY: Lazy<WriterRegistry> = Lazy::new(WriterRegistry::new);

/// The process-wide registry used by every [`Encoder`](crate::Encoder).
pub fn registry() -> &'static WriterRegistry {
	&REGISTRY
}

/// Identifies a registered sink. Ids are handed out in increasing order and
/// are never reused by the same registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WriterId(usize);

impl WriterId {
	/// Encodes the id as the pointer-sized user token given to libopusenc.
	pub(crate) fn as_token(self) -> *mut c_void {
		self.0 as *mut c_void
	}

	pub(crate) fn from_token(token: *mut c_void) -> Self {
		Self(token as usize)
	}
}

impl fmt::Display for WriterId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Default)]
struct Entries {
	next_id: usize,
	writers: HashMap<WriterId, SharedSink>,
}

/// A locked map from [`WriterId`]s to sinks.
///
/// The lock covers map access only. Writing to a sink happens after the
/// lookup returns, under the sink's own lock, so a sink must belong to
/// exactly one session.
#[derive(Default)]
pub struct WriterRegistry {
	entries: Mutex<Entries>,
}

impl WriterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&self, sink: SharedSink) -> WriterId {
		let mut entries = self.entries.lock();
		let id = WriterId(entries.next_id);
		entries.next_id += 1;
		entries.writers.insert(id, sink);
		tracing::trace!(%id, "registered writer");
		id
	}

	pub fn get(&self, id: WriterId) -> Option<SharedSink> {
		self.entries.lock().writers.get(&id).cloned()
	}

	/// Removes the sink registered under `id`. Removing an absent id is a
	/// no-op.
	pub fn remove(&self, id: WriterId) -> Option<SharedSink> {
		let removed = self.entries.lock().writers.remove(&id);
		if removed.is_some() {
			tracing::trace!(%id, "deregistered writer");
		}
		removed
	}

	pub fn contains(&self, id: WriterId) -> bool {
		self.entries.lock().writers.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.entries.lock().writers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	fn sink() -> SharedSink {
		Arc::new(Mutex::new(Vec::<u8>::new()))
	}

	#[test]
	fn ids_are_distinct_and_increasing() {
		let registry = WriterRegistry::new();
		let ids: Vec<_> = (0..32).map(|_| registry.add(sink())).collect();
		assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
		assert_eq!(registry.len(), 32);
	}

	#[test]
	fn ids_are_not_reused_after_removal() {
		let registry = WriterRegistry::new();
		let first = registry.add(sink());
		registry.remove(first);
		let second = registry.add(sink());
		assert!(second > first);
	}

	#[test]
	fn get_returns_the_registered_sink() {
		let registry = WriterRegistry::new();
		let original = sink();
		let id = registry.add(original.clone());
		let found = registry.get(id).unwrap();
		assert!(Arc::ptr_eq(&original, &found));
	}

	#[test]
	fn get_after_remove_is_not_found() {
		let registry = WriterRegistry::new();
		let id = registry.add(sink());
		assert!(registry.remove(id).is_some());
		assert!(registry.get(id).is_none());
		assert!(!registry.contains(id));
		assert!(registry.remove(id).is_none());
		assert!(registry.is_empty());
	}

	#[test]
	fn tokens_round_trip() {
		let registry = WriterRegistry::new();
		registry.add(sink());
		let id = registry.add(sink());
		assert_eq!(WriterId::from_token(id.as_token()), id);
	}

	#[test]
	fn concurrent_adds_stay_unique() {
		let registry = Arc::new(WriterRegistry::new());
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let registry = registry.clone();
				std::thread::spawn(move || (0..64).map(|_| registry.add(sink())).collect::<Vec<_>>())
			})
			.collect();
		let mut ids: Vec<_> = handles
			.into_iter()
			.flat_map(|handle| handle.join().unwrap())
			.collect();
		ids.sort();
		ids.dedup();
		assert_eq!(ids.len(), 8 * 64);
		assert_eq!(registry.len(), 8 * 64);
	}
}

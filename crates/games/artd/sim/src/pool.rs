//! Tag-partitioned object pool.
//!
//! Instances live in a single slot map for their whole lifetime; the pool only
//! flips them between active and idle and keeps a FIFO queue of idle keys per
//! tag. Keys therefore stay valid across reuse, which is what lets the
//! registries hold them without re-hashing anything.

use crate::error::PoolError;
use crate::geometry::Pose;
use slotmap::{Key, SlotMap};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, warn};

/// One pooled instance.
#[derive(Clone, Debug)]
pub struct Pooled<T> {
    tag: String,
    active: bool,
    pub pose: Pose,
    pub value: T,
}

impl<T> Pooled<T> {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Clone, Debug)]
struct PoolEntry<K, T> {
    template: T,
    queue: VecDeque<K>,
    created: usize,
}

/// Active/idle counts for one tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub tag: String,
    pub active: usize,
    pub idle: usize,
}

#[derive(Clone, Debug)]
pub struct ObjectPool<K: Key, T: Clone> {
    slots: SlotMap<K, Pooled<T>>,
    entries: BTreeMap<String, PoolEntry<K, T>>,
}

impl<K: Key, T: Clone> Default for ObjectPool<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, T: Clone> ObjectPool<K, T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            entries: BTreeMap::new(),
        }
    }

    /// Registers `tag` and pre-creates `initial_size` idle instances.
    ///
    /// Configuring a tag twice keeps the first template and its instances.
    pub fn configure(&mut self, tag: &str, template: T, initial_size: usize) {
        if self.entries.contains_key(tag) {
            warn!(tag, "pool already configured, ignoring");
            return;
        }
        let mut queue = VecDeque::with_capacity(initial_size);
        for _ in 0..initial_size {
            queue.push_back(self.slots.insert(Pooled {
                tag: tag.to_string(),
                active: false,
                pose: Pose::IDENTITY,
                value: template.clone(),
            }));
        }
        self.entries.insert(
            tag.to_string(),
            PoolEntry {
                template,
                queue,
                created: initial_size,
            },
        );
    }

    pub fn is_configured(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Hands out an idle instance of `tag` placed at `pose`, its value reset
    /// to the template. Creates a new instance when the queue is empty.
    ///
    /// Returns `None` (and logs) when `tag` was never configured.
    pub fn acquire(&mut self, tag: &str, pose: Pose) -> Option<K> {
        let Some(entry) = self.entries.get_mut(tag) else {
            warn!(tag, "acquire from unknown pool tag");
            return None;
        };

        let key = match entry.queue.pop_front() {
            Some(key) => key,
            None => {
                entry.created += 1;
                debug!(tag, total = entry.created, "pool exhausted, growing");
                self.slots.insert(Pooled {
                    tag: tag.to_string(),
                    active: false,
                    pose: Pose::IDENTITY,
                    value: entry.template.clone(),
                })
            }
        };

        let slot = self.slots.get_mut(key)?;
        slot.active = true;
        slot.pose = pose;
        slot.value = entry.template.clone();
        Some(key)
    }

    /// Returns an active instance to the back of its tag's idle queue.
    ///
    /// Releasing an instance that is already idle is rejected and leaves the
    /// queue untouched.
    pub fn release(&mut self, tag: &str, key: K) -> Result<(), PoolError> {
        let Some(entry) = self.entries.get_mut(tag) else {
            warn!(tag, "release to unknown pool tag");
            return Err(PoolError::UnknownTag(tag.to_string()));
        };
        let Some(slot) = self.slots.get_mut(key) else {
            return Err(PoolError::UnknownInstance);
        };
        if slot.tag != tag {
            return Err(PoolError::ForeignInstance(slot.tag.clone()));
        }
        if !slot.active {
            warn!(tag, "duplicate release ignored");
            return Err(PoolError::NotActive);
        }
        slot.active = false;
        entry.queue.push_back(key);
        Ok(())
    }

    /// Releases every active instance of `tag`; returns how many were released.
    pub fn release_all(&mut self, tag: &str) -> usize {
        let active: Vec<K> = self
            .slots
            .iter()
            .filter(|(_, s)| s.active && s.tag == tag)
            .map(|(k, _)| k)
            .collect();
        active
            .into_iter()
            .filter(|&k| self.release(tag, k).is_ok())
            .count()
    }

    /// The value of an active instance.
    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key).filter(|s| s.active).map(|s| &s.value)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots
            .get_mut(key)
            .filter(|s| s.active)
            .map(|s| &mut s.value)
    }

    /// Full slot of an active instance, pose included.
    pub fn slot(&self, key: K) -> Option<&Pooled<T>> {
        self.slots.get(key).filter(|s| s.active)
    }

    pub fn slot_mut(&mut self, key: K) -> Option<&mut Pooled<T>> {
        self.slots.get_mut(key).filter(|s| s.active)
    }

    pub fn is_active(&self, key: K) -> bool {
        self.slots.get(key).is_some_and(|s| s.active)
    }

    /// Active instances in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (K, &Pooled<T>)> {
        self.slots.iter().filter(|(_, s)| s.active)
    }

    pub fn active_keys(&self) -> Vec<K> {
        self.iter_active().map(|(k, _)| k).collect()
    }

    pub fn active_count(&self, tag: &str) -> usize {
        self.slots
            .values()
            .filter(|s| s.active && s.tag == tag)
            .count()
    }

    pub fn idle_count(&self, tag: &str) -> usize {
        self.entries.get(tag).map_or(0, |e| e.queue.len())
    }

    /// Counts for every configured tag, ordered by tag.
    pub fn stats(&self) -> Vec<PoolStats> {
        self.entries
            .iter()
            .map(|(tag, entry)| PoolStats {
                tag: tag.clone(),
                active: self.active_count(tag),
                idle: entry.queue.len(),
            })
            .collect()
    }
}

//! Id-keyed, insertion-ordered collection of entities.

use std::collections::HashMap;

use tracing::trace;

use crate::error::{Error, Result};
use crate::traits::Resource;

/// Read-only view over an entity list: lookup by id plus ordered iteration.
///
/// A repeated id keeps the last entity under that key, and the key is
/// listed once per insertion, so ordered iteration yields the surviving
/// entity at every position the id appeared.
#[derive(Debug, Clone)]
pub struct KeyedItems<T> {
    keys: Vec<String>,
    items: HashMap<String, T>,
}

impl<T: Resource> KeyedItems<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        let mut keys = Vec::with_capacity(items.len());
        let mut map = HashMap::with_capacity(items.len());
        for item in items {
            let key = item.id().to_string();
            keys.push(key.clone());
            map.insert(key, item);
        }
        Self { keys, items: map }
    }

    /// Visit every entity in insertion order. The first visitor error stops
    /// the walk and is returned wrapped with the failing position and key.
    pub fn each<'a, F>(&'a self, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, &'a T) -> Result<()>,
    {
        for (index, key) in self.keys.iter().enumerate() {
            let Some(item) = self.items.get(key) else {
                continue;
            };
            trace!(index, key = %key, "Visiting keyed item");
            visit(index, item).map_err(|source| Error::Collection {
                index,
                key: key.clone(),
                source: Box::new(source),
            })?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.keys.iter().filter_map(|k| self.items.get(k))
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<T: Resource> FromIterator<T> for KeyedItems<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

//! Ordered record lists with case-insensitive keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record that is identified inside its section by one key field.
pub trait Keyed {
    /// Returns the key of this record.
    fn key(&self) -> &str;
}

/// A list of records kept in insertion order, addressed by key.
///
/// Keys compare case-insensitively, so `UART0` and `uart0` name the same
/// record. Serializes as a plain TOML array of tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section<T> {
    records: Vec<T>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Keyed> Section<T> {
    /// Creates an empty section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record with the given key.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.records.iter().find(|r| r.key().eq_ignore_ascii_case(key))
    }

    /// Returns the record with the given key, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.records
            .iter_mut()
            .find(|r| r.key().eq_ignore_ascii_case(key))
    }

    /// Returns `true` if a record with the given key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Appends a record. Returns it back if its key is already taken.
    pub fn insert(&mut self, record: T) -> Result<(), T> {
        if self.contains(record.key()) {
            return Err(record);
        }
        self.records.push(record);
        Ok(())
    }

    /// Inserts a record at `index` (clamped to the length), shifting the
    /// following records. Returns it back if its key is already taken.
    pub fn insert_at(&mut self, index: usize, record: T) -> Result<(), T> {
        if self.contains(record.key()) {
            return Err(record);
        }
        let index = index.min(self.records.len());
        self.records.insert(index, record);
        Ok(())
    }

    /// Removes and returns the record with the given key.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let pos = self
            .records
            .iter()
            .position(|r| r.key().eq_ignore_ascii_case(key))?;
        Some(self.records.remove(pos))
    }

    /// Returns the index of the record with the given key.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.key().eq_ignore_ascii_case(key))
    }

    /// Returns the first key that appears more than once, if any.
    pub fn duplicate_key(&self) -> Option<&str> {
        self.records.iter().enumerate().find_map(|(i, r)| {
            self.records[..i]
                .iter()
                .any(|p| p.key().eq_ignore_ascii_case(r.key()))
                .then(|| r.key())
        })
    }
}

impl<T> Section<T> {
    /// Iterates over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Iterates mutably over the records in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the section holds no record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<'a, T> IntoIterator for &'a Section<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<T> FromIterator<T> for Section<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<T: Serialize> Serialize for Section<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Section<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|records| Self { records })
    }
}

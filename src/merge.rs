//! Field merging and key normalization.
//!
//! Keys coming from call sites often carry formatting noise: `"user_id":`,
//! `'region'`, ` status `. [`normalize_key`] strips it, and [`merge`] folds
//! any number of field maps into one, later maps winning on collisions.
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::{merge, FieldMap, Value};
//!
//! let mut dst = FieldMap::from([("service", "payments")]);
//! let call = FieldMap::from([("\"amount\":", 42)]);
//!
//! merge(&mut dst, [&call]);
//!
//! assert_eq!(dst.get("amount"), Some(&Value::from(42)));
//! ```
//!
//! [`merge`] copies values into an owned map. The logging pipeline instead
//! builds a [`MergedFields`] view, which resolves the same overrides by
//! position and borrows every key and value from the caller's maps.

use crate::{FieldMap, Value};
use std::iter;

/// Returns `true` when `key` contains none of the characters normalization
/// looks at, so it can be used as-is.
#[inline]
#[must_use]
pub fn is_canonical_key(key: &str) -> bool {
    !key
        .bytes()
        .any(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b':' | b'\'' | b'"'))
}

/// Strips formatting noise from a key.
///
/// One pass trims surrounding whitespace, drops one trailing `:`, drops one
/// pair of surrounding quotes (`"` or `'`) and trims again. Passes repeat
/// until the key stops changing, so normalizing is idempotent. The result is
/// always a sub-slice of `key`.
///
/// # Examples
///
/// ```rust
/// use json_logger::normalize_key;
///
/// assert_eq!(normalize_key("  'region':  "), "region");
/// assert_eq!(normalize_key("\"user_id\":"), "user_id");
/// assert_eq!(normalize_key("plain"), "plain");
/// ```
#[must_use]
pub fn normalize_key(key: &str) -> &str {
    let mut current = key;
    loop {
        let next = normalize_once(current);
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

/// Canonical form of `key`, skipping the work for keys that are already
/// canonical.
#[inline]
pub(crate) fn output_key(key: &str) -> &str {
    if is_canonical_key(key) {
        key
    } else {
        normalize_key(key)
    }
}

fn normalize_once(key: &str) -> &str {
    let key = key.trim();
    let key = key.strip_suffix(':').unwrap_or(key);
    let key = strip_quote_pair(key);
    key.trim()
}

fn strip_quote_pair(key: &str) -> &str {
    let bytes = key.as_bytes();
    match bytes {
        [first, .., last] if is_quote(*first) && is_quote(*last) => &key[1..key.len() - 1],
        _ => key,
    }
}

#[inline]
fn is_quote(b: u8) -> bool {
    b == b'"' || b == b'\''
}

/// Copies every field of every source into `dst`.
///
/// Keys are normalized on the way in (canonical keys skip the work). Later
/// sources overwrite earlier ones and any field already in `dst`. Absent
/// sources (`None`) are skipped.
///
/// # Examples
///
/// ```rust
/// use json_logger::{merge, FieldMap, Value};
///
/// let mut dst = FieldMap::from([("a", 1)]);
/// let first = FieldMap::from([("b", 2), ("c:", 3)]);
/// let second = FieldMap::from([("b", "over")]);
///
/// merge(&mut dst, [Some(&first), None, Some(&second)]);
///
/// assert_eq!(dst.get("b"), Some(&Value::from("over")));
/// assert_eq!(dst.get("c"), Some(&Value::from(3)));
/// ```
pub fn merge<'a, I, S>(dst: &mut FieldMap, sources: I)
where
    I: IntoIterator<Item = S>,
    S: Into<Option<&'a FieldMap>>,
{
    for source in sources {
        let source: Option<&FieldMap> = source.into();
        let Some(source) = source else {
            continue;
        };
        for (key, value) in source {
            dst.insert(output_key(key), value.clone());
        }
    }
}

/// Names every entry writes itself. The pipeline drops user fields that
/// normalize to one of these so an entry never repeats a key.
pub const RESERVED_KEYS: [&str; 3] = ["timestamp", "level", "message"];

/// Position of a surviving field: which source map, which entry in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    source: usize,
    index: usize,
}

/// A borrowed view over a base map followed by any number of call maps.
///
/// A view built with [`MergedFields::chained`] yields every field of every
/// map in order, duplicates included. One built with
/// [`MergedFields::merged`] applies [`merge`] semantics without copying:
/// keys are normalized, a later map overrides an earlier one while the
/// field keeps its first position, and reserved names are dropped.
///
/// # Examples
///
/// ```rust
/// use json_logger::merge::MergedFields;
/// use json_logger::{FieldMap, Value};
///
/// let base = FieldMap::from([("service", "payments"), ("region", "eu")]);
/// let call = FieldMap::from([("'region':", "us")]);
/// let calls = [&call];
///
/// let mut slots = Vec::new();
/// let view = MergedFields::merged(&base, &calls, &mut slots);
/// let fields: Vec<_> = view.iter().collect();
///
/// assert_eq!(
///     fields,
///     vec![("service", &Value::from("payments")), ("region", &Value::from("us"))]
/// );
/// ```
#[derive(Clone, Copy, Debug)]
pub struct MergedFields<'a> {
    base: &'a FieldMap,
    rest: &'a [&'a FieldMap],
    slots: Option<&'a [Slot]>,
}

impl<'a> MergedFields<'a> {
    /// Every field of `base`, then of each map in `rest`, as given.
    #[must_use]
    pub fn chained(base: &'a FieldMap, rest: &'a [&'a FieldMap]) -> Self {
        MergedFields {
            base,
            rest,
            slots: None,
        }
    }

    /// Resolves overrides between `base` and `rest` into `slots`.
    ///
    /// `slots` is scratch space; it is cleared first and its capacity is
    /// reused, so a warm buffer makes this allocation-free.
    pub fn merged(
        base: &'a FieldMap,
        rest: &'a [&'a FieldMap],
        slots: &'a mut Vec<Slot>,
    ) -> Self {
        slots.clear();
        let sources = iter::once(base).chain(rest.iter().copied());
        for (source, map) in sources.enumerate() {
            for (index, key) in map.keys().enumerate() {
                let key = output_key(key);
                if RESERVED_KEYS.contains(&key) {
                    continue;
                }
                let slot = Slot { source, index };
                let existing = slots
                    .iter_mut()
                    .find(|seen| key_at(base, rest, **seen) == Some(key));
                match existing {
                    Some(seen) => *seen = slot,
                    None => slots.push(slot),
                }
            }
        }
        let slots: &'a [Slot] = slots;
        MergedFields {
            base,
            rest,
            slots: Some(slots),
        }
    }

    /// Iterates the fields with their keys in canonical form.
    pub fn iter(&self) -> Iter<'a> {
        Iter {
            view: *self,
            source: 0,
            index: 0,
        }
    }
}

fn source_map<'a>(
    base: &'a FieldMap,
    rest: &[&'a FieldMap],
    source: usize,
) -> Option<&'a FieldMap> {
    match source {
        0 => Some(base),
        n => rest.get(n - 1).copied(),
    }
}

fn entry_at<'a>(
    base: &'a FieldMap,
    rest: &[&'a FieldMap],
    slot: Slot,
) -> Option<(&'a str, &'a Value)> {
    source_map(base, rest, slot.source)?
        .get_index(slot.index)
        .map(|(key, value)| (output_key(key), value))
}

fn key_at<'a>(base: &'a FieldMap, rest: &[&'a FieldMap], slot: Slot) -> Option<&'a str> {
    entry_at(base, rest, slot).map(|(key, _)| key)
}

impl<'a> IntoIterator for &MergedFields<'a> {
    type Item = (&'a str, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over a [`MergedFields`] view.
#[derive(Debug)]
pub struct Iter<'a> {
    view: MergedFields<'a>,
    source: usize,
    index: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        let MergedFields { base, rest, slots } = self.view;
        if let Some(slots) = slots {
            let slot = *slots.get(self.index)?;
            self.index += 1;
            return entry_at(base, rest, slot);
        }
        loop {
            let map = source_map(base, rest, self.source)?;
            if let Some((key, value)) = map.get_index(self.index) {
                self.index += 1;
                return Some((output_key(key), value));
            }
            self.source += 1;
            self.index = 0;
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::HashMap;

use crate::models::uid::Uid;

/// A contiguous run of similarly named UIDs, e.g. `User1`…`User32` starting
/// at a base UID. The format string must contain a single `{}` placeholder
/// for the decimal number.
#[derive(Debug, Clone, Copy)]
pub struct NameSequence {
    base: Uid,
    start: u64,
    count: u64,
    format: &'static str,
}

impl NameSequence {
    pub const fn new(base: Uid, start: u64, count: u64, format: &'static str) -> Self {
        NameSequence {
            base,
            start,
            count,
            format,
        }
    }

    fn parts(&self) -> (&'static str, &'static str) {
        match self.format.split_once("{}") {
            Some(parts) => parts,
            None => (self.format, ""),
        }
    }

    pub fn find_name(&self, uid: Uid) -> Option<String> {
        let index = (uid.0 as i64).checked_sub(self.base.0 as i64)?;
        if index < 0 || index >= self.count as i64 {
            return None;
        }
        let number = index as u64 + self.start;
        let (prefix, suffix) = self.parts();
        Some(format!("{prefix}{number}{suffix}"))
    }

    pub fn find_uid(&self, name: &str) -> Option<Uid> {
        let (prefix, suffix) = self.parts();
        let middle = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
        let number: u64 = middle.parse().ok()?;
        let index = number.checked_sub(self.start)?;
        if index >= self.count {
            return None;
        }
        Some(Uid(self.base.0 + index))
    }
}

/// Bidirectional name ↔ UID lookup over explicit pairs plus sequences.
#[derive(Debug, Default, Clone)]
pub struct NameAndUidFinder {
    uid_to_name: HashMap<Uid, String>,
    name_to_uid: HashMap<String, Uid>,
    sequences: Vec<NameSequence>,
}

impl NameAndUidFinder {
    pub fn new<'a>(
        pair_groups: impl IntoIterator<Item = &'a [(Uid, &'a str)]>,
        sequences: impl IntoIterator<Item = NameSequence>,
    ) -> Self {
        let mut finder = NameAndUidFinder::default();
        for group in pair_groups {
            for &(uid, name) in group {
                finder.insert(uid, name);
            }
        }
        finder.sequences.extend(sequences);
        finder
    }

    pub fn insert(&mut self, uid: Uid, name: &str) {
        let previous_name = self.uid_to_name.insert(uid, name.to_string());
        let previous_uid = self.name_to_uid.insert(name.to_string(), uid);
        debug_assert!(previous_name.is_none(), "duplicate UID {uid}");
        debug_assert!(previous_uid.is_none(), "duplicate name {name}");
    }

    pub fn insert_owned(&mut self, uid: Uid, name: String) {
        self.name_to_uid.insert(name.clone(), uid);
        self.uid_to_name.insert(uid, name);
    }

    pub fn find_name(&self, uid: Uid) -> Option<String> {
        if let Some(name) = self.uid_to_name.get(&uid) {
            return Some(name.clone());
        }
        self.sequences
            .iter()
            .find_map(|sequence| sequence.find_name(uid))
    }

    pub fn find_uid(&self, name: &str) -> Option<Uid> {
        if let Some(&uid) = self.name_to_uid.get(name) {
            return Some(uid);
        }
        self.sequences
            .iter()
            .find_map(|sequence| sequence.find_uid(name))
    }
}

/// Finders keyed by security provider, so that `User1` resolves to the
/// Locking SP's authority only within that SP.
#[derive(Debug, Default, Clone)]
pub struct SpNameAndUidFinder {
    finders: HashMap<Uid, NameAndUidFinder>,
}

impl SpNameAndUidFinder {
    pub fn new(finders: impl IntoIterator<Item = (Uid, NameAndUidFinder)>) -> Self {
        SpNameAndUidFinder {
            finders: finders.into_iter().collect(),
        }
    }

    pub fn find_name(&self, uid: Uid, sp: Uid) -> Option<String> {
        self.finders.get(&sp)?.find_name(uid)
    }

    pub fn find_uid(&self, name: &str, sp: Uid) -> Option<Uid> {
        self.finders.get(&sp)?.find_uid(name)
    }
}

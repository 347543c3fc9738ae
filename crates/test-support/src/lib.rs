//! In-memory stand-in for the protection database used across the workspace
//! tests.
//!
//! The real database is a flat, id-keyed store reached over ptserver RPCs;
//! the double mirrors that shape. Entries are records keyed by [`PtsId`]
//! with membership stored as id lists, so fixtures can express nested,
//! shared, and cyclic group structures that a tree of owned values could
//! not. Groups may also be marked unreachable to simulate the server being
//! unavailable mid-traversal.

#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use pts::{DirectoryEntry, EntryKind, PtsId};
use thiserror::Error;

/// Error produced when the in-memory database cannot enumerate members.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum MemoryMembershipError {
    /// Members were requested from a user entry.
    #[error("entry {0} is not a group")]
    NotAGroup(PtsId),
    /// A membership list references an id with no record.
    #[error("membership list references unknown id {0}")]
    UnknownId(PtsId),
    /// The entry was marked unreachable, standing in for an RPC failure.
    #[error("protection database unavailable while listing members of {0}")]
    Unavailable(PtsId),
}

#[derive(Debug)]
struct Record {
    name: String,
    kind: EntryKind,
    members: Vec<PtsId>,
    reachable: bool,
}

/// Immutable in-memory protection database.
///
/// Built once with [`MemoryDatabase::builder`]; handed out entries share the
/// store, so membership lookups resolve against the same records the fixture
/// declared.
#[derive(Clone, Debug)]
pub struct MemoryDatabase {
    records: Arc<BTreeMap<PtsId, Record>>,
}

impl MemoryDatabase {
    /// Starts an empty database fixture.
    #[must_use]
    pub fn builder() -> MemoryDatabaseBuilder {
        MemoryDatabaseBuilder {
            records: BTreeMap::new(),
        }
    }

    /// Looks up the entry with the given raw id.
    #[must_use]
    pub fn entry(&self, id: i32) -> Option<MemoryEntry> {
        let id = PtsId::new(id);
        self.records.contains_key(&id).then(|| MemoryEntry {
            records: Arc::clone(&self.records),
            id,
        })
    }
}

/// Builder collecting fixture records before freezing them into a
/// [`MemoryDatabase`].
///
/// Ids are taken raw for brevity in tests. Membership lists may reference
/// ids declared later (or never); a dangling reference surfaces as
/// [`MemoryMembershipError::UnknownId`] at enumeration time, which is itself
/// a scenario worth testing.
#[derive(Debug)]
pub struct MemoryDatabaseBuilder {
    records: BTreeMap<PtsId, Record>,
}

impl MemoryDatabaseBuilder {
    /// Adds a user entry.
    #[must_use]
    pub fn user(mut self, id: i32, name: &str) -> Self {
        self.records.insert(
            PtsId::new(id),
            Record {
                name: name.to_owned(),
                kind: EntryKind::User,
                members: Vec::new(),
                reachable: true,
            },
        );
        self
    }

    /// Adds a group entry with the given direct members, in order.
    #[must_use]
    pub fn group<I>(mut self, id: i32, name: &str, members: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        self.records.insert(
            PtsId::new(id),
            Record {
                name: name.to_owned(),
                kind: EntryKind::Group,
                members: members.into_iter().map(PtsId::new).collect(),
                reachable: true,
            },
        );
        self
    }

    /// Adds a group whose member enumeration always fails with
    /// [`MemoryMembershipError::Unavailable`].
    #[must_use]
    pub fn unreachable_group(mut self, id: i32, name: &str) -> Self {
        self.records.insert(
            PtsId::new(id),
            Record {
                name: name.to_owned(),
                kind: EntryKind::Group,
                members: Vec::new(),
                reachable: false,
            },
        );
        self
    }

    /// Freezes the records into an immutable database.
    #[must_use]
    pub fn build(self) -> MemoryDatabase {
        MemoryDatabase {
            records: Arc::new(self.records),
        }
    }
}

/// A user or group entry resolved from a [`MemoryDatabase`].
#[derive(Clone)]
pub struct MemoryEntry {
    records: Arc<BTreeMap<PtsId, Record>>,
    id: PtsId,
}

impl MemoryEntry {
    fn record(&self) -> &Record {
        // Entries are only handed out for existing ids and the store is
        // immutable once built.
        &self.records[&self.id]
    }

    /// Returns the entry's name as declared by the fixture.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record().name
    }
}

impl fmt::Debug for MemoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEntry")
            .field("id", &self.id)
            .field("name", &self.record().name)
            .field("kind", &self.record().kind)
            .finish()
    }
}

impl PartialEq for MemoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.records, &other.records)
    }
}

impl Eq for MemoryEntry {}

impl DirectoryEntry for MemoryEntry {
    type MembershipError = MemoryMembershipError;

    fn id(&self) -> PtsId {
        self.id
    }

    fn kind(&self) -> EntryKind {
        self.record().kind
    }

    fn members(&self) -> Result<Vec<Self>, Self::MembershipError> {
        let record = self.record();
        match record.kind {
            EntryKind::User => Err(MemoryMembershipError::NotAGroup(self.id)),
            EntryKind::Group if !record.reachable => {
                Err(MemoryMembershipError::Unavailable(self.id))
            }
            EntryKind::Group => record
                .members
                .iter()
                .map(|&id| {
                    if self.records.contains_key(&id) {
                        Ok(Self {
                            records: Arc::clone(&self.records),
                            id,
                        })
                    } else {
                        Err(MemoryMembershipError::UnknownId(id))
                    }
                })
                .collect(),
        }
    }
}

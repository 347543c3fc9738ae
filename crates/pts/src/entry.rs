use std::error::Error;
use std::fmt;

/// Numeric identifier of a protection database entry.
///
/// The protection database keys every entry by a signed 32-bit id. By AFS
/// convention groups carry negative ids and users positive ids; the id `0`
/// (the anonymous user slot) is never a group. The convention is exposed as
/// [`PtsId::is_group_id`] for callers that only hold an id, but entry kind
/// is always authoritative on the entry itself (see [`DirectoryEntry::kind`]).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PtsId(i32);

impl PtsId {
    /// Wraps a raw protection database id.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw signed id.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Reports whether the id falls in the group range (negative ids).
    #[must_use]
    pub const fn is_group_id(self) -> bool {
        self.0 < 0
    }
}

impl From<i32> for PtsId {
    fn from(raw: i32) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for PtsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a protection database entry.
///
/// The membership-enumeration capability is tied to the kind: groups have
/// members, users do not. Checking the kind before enumerating replaces the
/// reflective "does it respond to members?" probe a dynamic binding would
/// use.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntryKind {
    /// A user entry; a leaf with no members of its own.
    User,
    /// A group entry; enumerates a sequence of member entries.
    Group,
}

/// A user or group entry served by an external protection database client.
///
/// The real database lives behind a ptserver RPC client; this trait is the
/// seam between that client and the expansion logic in this crate. An
/// implementation typically wraps a connection handle plus the entry's id
/// and resolves [`members`](Self::members) through a remote call, which is
/// why enumeration is fallible and why the error type is the
/// implementation's own.
pub trait DirectoryEntry: Sized {
    /// Error produced when membership enumeration fails.
    type MembershipError: Error + Send + Sync + 'static;

    /// Returns the entry's database id.
    fn id(&self) -> PtsId;

    /// Returns whether the entry is a user or a group.
    fn kind(&self) -> EntryKind;

    /// Reports whether the entry can enumerate members.
    fn is_group(&self) -> bool {
        matches!(self.kind(), EntryKind::Group)
    }

    /// Enumerates the entry's direct members, in database order.
    ///
    /// Only meaningful for groups. Implementations must fail the call for
    /// user entries rather than returning an empty sequence, so that misuse
    /// is visible instead of silently indistinguishable from an empty group.
    fn members(&self) -> Result<Vec<Self>, Self::MembershipError>;
}

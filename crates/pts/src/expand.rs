use std::error::Error;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::trace;

use crate::entry::{DirectoryEntry, PtsId};

/// Error returned when supergroup expansion fails.
///
/// The `E` parameter is the [`DirectoryEntry::MembershipError`] of the entry
/// type being expanded; enumeration failures from the external client are
/// carried through unchanged as the error source.
#[derive(Debug, Error)]
pub enum ExpandError<E>
where
    E: Error + 'static,
{
    /// Expansion was requested on a user entry, which has no members.
    #[error("entry {id} is not a group")]
    NotAGroup {
        /// Id of the entry the caller tried to expand.
        id: PtsId,
    },

    /// A group's membership reaches back to a group already being expanded.
    ///
    /// The database itself places no restriction on cyclic supergroup
    /// membership, so the traversal tracks the groups on the current
    /// recursion path and fails deterministically instead of recursing
    /// without bound.
    #[error("membership cycle through group {id}")]
    MembershipCycle {
        /// Id of the group encountered for the second time on one path.
        id: PtsId,
    },

    /// The external client failed while enumerating a group's members.
    #[error("failed to enumerate members of group {id}")]
    Enumerate {
        /// Id of the group whose enumeration failed.
        id: PtsId,
        /// The client's error, propagated unchanged.
        #[source]
        source: E,
    },
}

impl<E> ExpandError<E>
where
    E: Error + 'static,
{
    /// Returns the id of the entry associated with the failure.
    #[must_use]
    pub const fn id(&self) -> PtsId {
        match self {
            Self::NotAGroup { id }
            | Self::MembershipCycle { id }
            | Self::Enumerate { id, .. } => *id,
        }
    }
}

/// Recursive flattening of nested group membership.
///
/// Blanket-implemented for every [`DirectoryEntry`], mirroring how the
/// protection database exposes supergroups: any group's members may
/// themselves be groups, and the flat membership is what access checks
/// actually consume.
///
/// Both operations traverse depth-first, left-to-right, in the order the
/// database enumerates direct members, substituting each member group's
/// expansion in place. No deduplication is performed: a user reachable
/// through several group paths appears once per path.
pub trait SupergroupExpansion: DirectoryEntry {
    /// Collects the flattened leaf membership of this group.
    ///
    /// For a group with no nested groups this is exactly the direct member
    /// list. Fails with [`ExpandError::NotAGroup`] when invoked on a user
    /// entry.
    fn members_recursive(&self) -> Result<Vec<Self>, ExpandError<Self::MembershipError>> {
        let mut leaves = Vec::new();
        self.visit_members_recursive(|leaf| leaves.push(leaf))?;
        Ok(leaves)
    }

    /// Streams the flattened leaf membership through `visitor`.
    ///
    /// Visits leaves in the same order [`Self::members_recursive`] collects
    /// them; the collecting form is built on this one, so the two can never
    /// disagree. A failure partway through
    /// aborts the whole traversal; leaves already passed to the visitor are
    /// not retracted.
    fn visit_members_recursive<V>(
        &self,
        mut visitor: V,
    ) -> Result<(), ExpandError<Self::MembershipError>>
    where
        V: FnMut(Self),
    {
        if !self.is_group() {
            return Err(ExpandError::NotAGroup { id: self.id() });
        }
        // Tracks the groups on the current recursion path only, so shared
        // (diamond) membership still expands once per path while true cycles
        // fail the call.
        let mut ancestors = FxHashSet::default();
        expand(self, &mut ancestors, &mut visitor)
    }
}

impl<E: DirectoryEntry> SupergroupExpansion for E {}

fn expand<E, V>(
    group: &E,
    ancestors: &mut FxHashSet<PtsId>,
    visitor: &mut V,
) -> Result<(), ExpandError<E::MembershipError>>
where
    E: DirectoryEntry,
    V: FnMut(E),
{
    let id = group.id();
    if !ancestors.insert(id) {
        return Err(ExpandError::MembershipCycle { id });
    }
    trace!(group = %id, "expanding group membership");
    let members = group
        .members()
        .map_err(|source| ExpandError::Enumerate { id, source })?;
    for member in members {
        if member.is_group() {
            expand(&member, ancestors, visitor)?;
        } else {
            visitor(member);
        }
    }
    ancestors.remove(&id);
    Ok(())
}

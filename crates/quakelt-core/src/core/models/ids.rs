use std::fmt;

/// Identifier of a tectonic region group.
///
/// Assigned once, when the group is finalized (typically by a persistence layer or by
/// [`assign_group_ids`](crate::engine::composite::assign_group_ids)); defaults to `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrtGroupId(pub u32);

impl fmt::Display for TrtGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of the realization association: a tectonic region group and the GSIM chosen for it.
pub type AssocKey = (TrtGroupId, String);

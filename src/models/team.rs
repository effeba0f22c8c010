//! Team: an ordered roster plus its generated display name.

use serde::{Deserialize, Serialize};

/// One team produced by assignment.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Member names in assignment order (not sorted).
    pub members: Vec<String>,
    /// Generated display name; None until name generation succeeds.
    pub name: Option<String>,
    /// True while a name request for this team is in flight.
    pub name_loading: bool,
}

impl Team {
    pub fn with_members(members: Vec<String>) -> Self {
        Self {
            members,
            name: None,
            name_loading: false,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

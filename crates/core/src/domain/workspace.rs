// Workspace context

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one remote compute workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceContext {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
    pub location: String,
}

impl WorkspaceContext {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for WorkspaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{} ({})",
            self.subscription_id, self.resource_group, self.name, self.location
        )
    }
}

//! Protocol-service profile selection.
//!
//! Some vehicles run the full set of application services, others only
//! broadcast awareness messages.  The split is by identifier prefix, e.g.
//! `["platoon."]` gives full services to platoon members only.

use cs_core::EntityId;

/// Services a newly-included node should run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ServiceProfile {
    Full,
    BroadcastOnly,
}

/// Classifies vehicles by id prefix.  An empty prefix list gives every
/// vehicle [`ServiceProfile::Full`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceRule {
    full_prefixes: Vec<String>,
}

impl ServiceRule {
    pub fn all_full() -> Self {
        Self::default()
    }

    pub fn with_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { full_prefixes: prefixes.into_iter().map(Into::into).collect() }
    }

    pub fn classify(&self, id: &EntityId) -> ServiceProfile {
        if self.full_prefixes.is_empty()
            || self.full_prefixes.iter().any(|p| id.as_str().starts_with(p.as_str()))
        {
            ServiceProfile::Full
        } else {
            ServiceProfile::BroadcastOnly
        }
    }
}

use serde::{Deserialize, Serialize};

/// What happens to still-pending siblings when one task in a batch rejects.
///
/// Neither policy rolls back side effects of siblings that already settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BatchFailurePolicy {
    /// Siblings keep running on a detached task; their results are discarded.
    #[default]
    Detach,
    /// Siblings' cooperative cancel handles are invoked and their futures dropped.
    CancelSiblings,
}

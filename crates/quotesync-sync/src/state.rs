//! Sync state machine.

use derive_more::Display;

/// A state in the life of a single sync call.
///
/// Every call starts at [`SyncState::Unvalidated`]. The happy paths are
/// `Validating → ValidatedNoData → Downloading → Synced` for a symbol with no
/// stored data and `Validating → Updating → Synced` otherwise. A symbol the
/// source does not recognize ends at [`SyncState::Rejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SyncState {
    /// Requested but not yet checked.
    #[display("unvalidated")]
    Unvalidated,
    /// Being checked against the registry and remote source.
    #[display("validating")]
    Validating,
    /// The source does not recognize the symbol.
    #[display("rejected")]
    Rejected,
    /// Valid, with no stored series.
    #[display("validated-no-data")]
    ValidatedNoData,
    /// Downloading the full history.
    #[display("downloading")]
    Downloading,
    /// Fetching and merging bars since the last stored date.
    #[display("updating")]
    Updating,
    /// The stored series is current.
    #[display("synced")]
    Synced,
}

impl SyncState {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Synced)
    }

    /// Returns true if `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Unvalidated, Self::Validating)
                | (Self::Validating, Self::Rejected | Self::ValidatedNoData | Self::Updating)
                | (Self::ValidatedNoData, Self::Downloading)
                | (Self::Downloading | Self::Updating, Self::Synced)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(SyncState::Synced.is_terminal());
        assert!(SyncState::Rejected.is_terminal());
        assert!(!SyncState::Downloading.is_terminal());
    }

    #[test]
    fn test_transitions() {
        assert!(SyncState::Unvalidated.can_advance_to(SyncState::Validating));
        assert!(SyncState::Validating.can_advance_to(SyncState::Updating));
        assert!(!SyncState::Validating.can_advance_to(SyncState::Downloading));
        assert!(!SyncState::Rejected.can_advance_to(SyncState::Validating));
        assert!(!SyncState::Synced.can_advance_to(SyncState::Updating));
    }

    #[test]
    fn test_display() {
        assert_eq!(SyncState::ValidatedNoData.to_string(), "validated-no-data");
    }
}

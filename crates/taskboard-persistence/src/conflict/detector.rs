use taskboard_core::{ObjectId, TaskboardError, TaskboardResult};

use crate::unit_of_work::DocumentKind;

/// What a batch expects to find in the store for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// The id must not be taken yet.
    Absent,
    /// The stored document must carry exactly this version.
    Exactly(u64),
}

/// Compare the stored version of a document against what a batch expects.
/// `stored` is `None` when no document with that id exists.
pub fn check_version(
    kind: DocumentKind,
    id: ObjectId,
    expected: ExpectedVersion,
    stored: Option<u64>,
) -> TaskboardResult<()> {
    match (expected, stored) {
        (ExpectedVersion::Absent, None) => Ok(()),
        (ExpectedVersion::Absent, Some(_)) => Err(TaskboardError::Conflict(format!(
            "{} {} already exists",
            kind, id
        ))),
        (ExpectedVersion::Exactly(version), Some(current)) if version == current => Ok(()),
        (ExpectedVersion::Exactly(version), Some(current)) => {
            Err(TaskboardError::Conflict(format!(
                "{} {} was modified concurrently (expected version {}, found {})",
                kind, id, version, current
            )))
        }
        (ExpectedVersion::Exactly(_), None) => Err(TaskboardError::Conflict(format!(
            "{} {} disappeared before commit",
            kind, id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_versions_pass() {
        let id = ObjectId::new();
        assert!(check_version(DocumentKind::Card, id, ExpectedVersion::Exactly(3), Some(3)).is_ok());
        assert!(check_version(DocumentKind::Card, id, ExpectedVersion::Absent, None).is_ok());
    }

    #[test]
    fn test_stale_version_is_a_conflict() {
        let id = ObjectId::new();
        let err = check_version(DocumentKind::Column, id, ExpectedVersion::Exactly(3), Some(4))
            .unwrap_err();
        assert!(matches!(err, TaskboardError::Conflict(_)));
        assert!(err.to_string().contains("expected version 3, found 4"));
    }

    #[test]
    fn test_existing_id_on_insert_is_a_conflict() {
        let err = check_version(DocumentKind::Board, ObjectId::new(), ExpectedVersion::Absent, Some(1))
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_vanished_document_is_a_conflict() {
        let err = check_version(DocumentKind::Card, ObjectId::new(), ExpectedVersion::Exactly(1), None)
            .unwrap_err();
        assert!(matches!(err, TaskboardError::Conflict(_)));
    }
}

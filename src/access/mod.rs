use uuid::Uuid;

use crate::error::ApiError;

pub mod scope;

/// Operation kinds the engine decides over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Retrieve,
    List,
    Create,
    Update,
    Delete,
}

/// Outcome of an authorization decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn into_result(self) -> Result<(), ApiError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(ApiError::forbidden(reason)),
        }
    }
}

/// Decide whether `principal` may perform `action` on a project-scoped
/// resource whose stored author is `author`, given whether the principal is
/// a contributor of the owning project.
///
/// Stateless: every decision is recomputed per request from stored rows.
/// Reads are open to any contributor; updates and deletes belong to the
/// author alone, contributor standing notwithstanding. List visibility is
/// not decided here; filtering happens in the scope resolver.
pub fn evaluate(action: Action, principal: Uuid, author: Uuid, is_contributor: bool) -> Decision {
    match action {
        Action::Retrieve | Action::List | Action::Create => {
            if is_contributor {
                Decision::Allow
            } else {
                Decision::Deny("You must be a contributor of this project to access this resource.")
            }
        }
        Action::Update | Action::Delete => {
            if principal == author {
                Decision::Allow
            } else {
                Decision::Deny("Only the author may modify or delete this resource.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributors_may_read_but_not_write() {
        let author = Uuid::new_v4();
        let contributor = Uuid::new_v4();

        assert_eq!(evaluate(Action::Retrieve, contributor, author, true), Decision::Allow);
        assert_eq!(evaluate(Action::List, contributor, author, true), Decision::Allow);
        assert!(matches!(evaluate(Action::Update, contributor, author, true), Decision::Deny(_)));
        assert!(matches!(evaluate(Action::Delete, contributor, author, true), Decision::Deny(_)));
    }

    #[test]
    fn author_may_write_regardless_of_action() {
        let author = Uuid::new_v4();

        assert_eq!(evaluate(Action::Update, author, author, true), Decision::Allow);
        assert_eq!(evaluate(Action::Delete, author, author, true), Decision::Allow);
    }

    #[test]
    fn outsiders_may_not_read() {
        let author = Uuid::new_v4();
        let outsider = Uuid::new_v4();

        assert!(matches!(evaluate(Action::Retrieve, outsider, author, false), Decision::Deny(_)));
        assert!(matches!(evaluate(Action::Create, outsider, author, false), Decision::Deny(_)));
    }

    #[test]
    fn deny_converts_to_forbidden() {
        let err = Decision::Deny("nope").into_result().unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}

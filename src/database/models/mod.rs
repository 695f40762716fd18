pub mod comment;
pub mod contributor;
pub mod issue;
pub mod project;
pub mod user;

pub use comment::Comment;
pub use contributor::Contributor;
pub use issue::{Issue, IssuePriority, IssueStatus, IssueTag};
pub use project::{Project, ProjectType};
pub use user::User;

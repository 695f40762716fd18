pub mod comments;
pub mod contributors;
pub mod issues;
pub mod projects;
pub mod users;

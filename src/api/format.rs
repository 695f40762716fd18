use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::User;

/// Fixed collection page size; the API contract, not a tunable
pub const PAGE_SIZE: i64 = 10;

/// `?page=N` query, 1-based. Out-of-range pages return an empty result set.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        i64::from(self.page.unwrap_or(1)).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * PAGE_SIZE
    }
}

/// One page of a collection response
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<T>,
}

impl<T: Serialize> Page<T> {
    pub fn new(count: i64, page: i64, results: Vec<T>) -> Self {
        Self { count, page, page_size: PAGE_SIZE, results }
    }
}

/// Full view of a User, served only for the owner's own read/write.
/// The password is write-only and never appears here.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub id: Uuid,
    pub username: String,
    pub age: i16,
    pub email: String,
    pub date_joined: DateTime<Utc>,
    pub can_be_contacted: bool,
    pub can_data_be_shared: bool,
}

impl From<User> for UserDetail {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            age: user.age,
            email: user.email,
            date_joined: user.date_joined,
            can_be_contacted: user.can_be_contacted,
            can_data_be_shared: user.can_data_be_shared,
        }
    }
}

/// Privacy-redacted view used when listing or viewing other users: the email
/// is null unless the user consented to contact, and contributed project
/// names are hidden unless the user consented to data sharing.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub projects_contributed: Vec<String>,
}

impl UserSummary {
    pub fn new(user: &User, contributed_project_names: Vec<String>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.can_be_contacted.then(|| user.email.clone()),
            projects_contributed: if user.can_data_be_shared {
                contributed_project_names
            } else {
                Vec::new()
            },
        }
    }
}

/// Minimal project reference for the contact_info payload
#[derive(Debug, Serialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
}

/// Payload of `GET /users/{id}/contact_info`; each section is present only
/// when the respective privacy flag allows it
#[derive(Debug, Serialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectRef>>,
}

impl ContactInfo {
    pub fn new(user: &User, contributed: Vec<ProjectRef>) -> Self {
        Self {
            email: user.can_be_contacted.then(|| user.email.clone()),
            projects: user.can_data_be_shared.then_some(contributed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(can_be_contacted: bool, can_data_be_shared: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            age: 25,
            email: "bob@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            can_be_contacted,
            can_data_be_shared,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn page_query_defaults_to_first_page() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn page_query_offset_arithmetic() {
        let q = PageQuery { page: Some(3) };
        assert_eq!(q.offset(), 20);

        // page=0 is clamped rather than underflowing
        let q = PageQuery { page: Some(0) };
        assert_eq!(q.page(), 1);
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn summary_redacts_email_when_contact_refused() {
        let user = sample_user(false, true);
        let summary = UserSummary::new(&user, vec!["Alpha".to_string()]);
        assert!(summary.email.is_none());
        assert_eq!(summary.projects_contributed, vec!["Alpha".to_string()]);
    }

    #[test]
    fn summary_hides_projects_when_sharing_refused() {
        let user = sample_user(true, false);
        let summary = UserSummary::new(&user, vec!["Alpha".to_string()]);
        assert_eq!(summary.email.as_deref(), Some("bob@example.com"));
        assert!(summary.projects_contributed.is_empty());
    }

    #[test]
    fn contact_info_sections_follow_flags() {
        let user = sample_user(true, false);
        let info = ContactInfo::new(&user, vec![]);
        let body = serde_json::to_value(&info).unwrap();
        assert_eq!(body["email"], "bob@example.com");
        assert!(body.get("projects").is_none());
    }

    #[test]
    fn detail_never_contains_password_hash() {
        let user = sample_user(true, true);
        let body = serde_json::to_value(UserDetail::from(user)).unwrap();
        assert!(body.get("password_hash").is_none());
        assert!(body.get("password").is_none());
    }
}

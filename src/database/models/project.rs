use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_type")]
pub enum ProjectType {
    #[default]
    #[serde(rename = "back-end")]
    #[sqlx(rename = "back-end")]
    BackEnd,
    #[serde(rename = "front-end")]
    #[sqlx(rename = "front-end")]
    FrontEnd,
    #[serde(rename = "iOS")]
    #[sqlx(rename = "iOS")]
    Ios,
    #[serde(rename = "Android")]
    #[sqlx(rename = "Android")]
    Android,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    /// Immutable owner; only the author may update or delete the project
    pub author: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub project_type: ProjectType,
    pub created_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_type_wire_names() {
        assert_eq!(serde_json::to_value(ProjectType::BackEnd).unwrap(), "back-end");
        assert_eq!(serde_json::to_value(ProjectType::Ios).unwrap(), "iOS");
        assert_eq!(serde_json::to_value(ProjectType::Android).unwrap(), "Android");
        let parsed: ProjectType = serde_json::from_value(serde_json::json!("front-end")).unwrap();
        assert_eq!(parsed, ProjectType::FrontEnd);
    }
}

//! Courses (knowledge-base collections) and their domains.

use serde::{Deserialize, Serialize};

/// Relationship between a user and a course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Created the course; sees its activity log and may share it.
    RootUser,
    /// Was granted access by the owner.
    User,
    #[default]
    #[serde(other)]
    Unknown,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RootUser => "owner",
            Self::User => "shared",
            Self::Unknown => "-",
        }
    }
}

/// A course, one per knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub course_name: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default, alias = "username", skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Course {
    pub fn is_owner(&self) -> bool {
        self.user_type == UserType::RootUser
    }
}

/// A domain (category) grouping files inside a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    #[serde(alias = "domain_name")]
    pub domain: String,
    #[serde(default)]
    pub usertype: UserType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_decodes_backend_record() {
        let json = r#"{
            "_id": "65f0c1",
            "course_name": "cs1003",
            "user": "alice@example.com",
            "user_type": "root_user"
        }"#;
        let course: Course = serde_json::from_str(json).unwrap();
        assert_eq!(course.course_name, "cs1003");
        assert_eq!(course.user.as_deref(), Some("alice@example.com"));
        assert!(course.is_owner());
    }

    #[test]
    fn test_unknown_user_type_is_tolerated() {
        let course: Course =
            serde_json::from_str(r#"{"course_name": "cs1003", "user_type": "guest"}"#).unwrap();
        assert_eq!(course.user_type, UserType::Unknown);
        assert!(!course.is_owner());
    }

    #[test]
    fn test_domain_decodes_listing_entry() {
        let domain: Domain =
            serde_json::from_str(r#"{"domain": "week1", "usertype": "user"}"#).unwrap();
        assert_eq!(domain.domain, "week1");
        assert_eq!(domain.usertype, UserType::User);
    }
}

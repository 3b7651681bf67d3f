//! Terms-of-service data models.

use serde::{Deserialize, Serialize};

/// A published terms-of-service revision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermsOfService {
    /// Revision ID.
    pub id: String,
    /// Publishing admin user ID.
    pub user_id: String,
    /// Terms text (markdown).
    pub text: String,
    /// Publication time (epoch millis).
    pub create_at: i64,
}

impl TermsOfService {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: String::new(),
            text: text.into(),
            create_at: super::now_millis(),
        }
    }
}

/// A user's acceptance of one terms-of-service revision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserTermsOfService {
    /// Accepting user ID.
    pub user_id: String,
    /// Accepted revision ID.
    pub terms_of_service_id: String,
    /// Acceptance time (epoch millis).
    pub create_at: i64,
}

impl UserTermsOfService {
    pub fn new(user_id: impl Into<String>, terms_of_service_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            terms_of_service_id: terms_of_service_id.into(),
            create_at: super::now_millis(),
        }
    }
}

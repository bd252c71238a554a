use std::fmt::{Display, Formatter};

use galley_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const SUBJECT_MAX_LENGTH: usize = 255;

/// Authenticated subject (user) identifier used as the access-control key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Parses and validates a subject identifier.
    ///
    /// Surrounding whitespace is trimmed. Empty values, values longer than 255
    /// characters and values containing control characters are rejected.
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "subject identifier must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().count() > SUBJECT_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "subject identifier must be at most {SUBJECT_MAX_LENGTH} characters"
            )));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(AppError::Validation(
                "subject identifier must not contain control characters".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for SubjectId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

impl Display for SubjectId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

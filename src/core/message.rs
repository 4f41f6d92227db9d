use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Who authored a conversation turn.
///
/// Only the two roles a chat provider understands exist; anything else is
/// rejected when a role is parsed from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when text names a role other than `user` or `assistant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedRoleError {
    role: String,
}

impl UnsupportedRoleError {
    pub fn role(&self) -> &str {
        &self.role
    }
}

impl fmt::Display for UnsupportedRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported role: {}", self.role)
    }
}

impl Error for UnsupportedRoleError {}

impl TryFrom<&str> for Role {
    type Error = UnsupportedRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(UnsupportedRoleError {
                role: value.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnsupportedRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

/// One turn in the conversation. Never mutated after it is appended to a
/// history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Build a message from a textual role, rejecting unknown roles.
    pub fn from_parts(
        role: &str,
        content: impl Into<String>,
    ) -> Result<Self, UnsupportedRoleError> {
        Ok(Self::new(Role::try_from(role)?, content))
    }
}

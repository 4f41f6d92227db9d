pub(super) mod conversation;
pub(super) mod core;

use crate::commands::CommandError;

pub(super) fn invalid_arguments(usage: impl Into<String>) -> CommandError {
    CommandError::InvalidArguments(usage.into())
}

//! # Input Controller
//!
//! Owns the staged draft. Length is deliberately *not* enforced while
//! editing: the view shows the over-limit draft next to a red counter, and
//! the limit only bites at submission.

use std::fmt;

use crate::core::state::Status;

/// Maximum draft length, in characters.
pub const MAX_INPUT_CHARS: usize = 1000;

/// Why a submission was refused locally. No network call is made and no
/// message is appended when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Draft is empty or whitespace only.
    Empty,
    /// Draft exceeds `MAX_INPUT_CHARS`.
    TooLong { chars: usize },
    /// A response is still outstanding.
    Busy,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "message is empty"),
            ValidationError::TooLong { chars } => {
                write!(f, "message is {chars} characters (limit {MAX_INPUT_CHARS})")
            }
            ValidationError::Busy => write!(f, "still waiting for the previous response"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct InputController {
    draft: String,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replaces the draft, whatever its length.
    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn clear(&mut self) {
        self.draft.clear();
    }

    /// Character count shown in the live counter.
    pub fn char_count(&self) -> usize {
        self.draft.chars().count()
    }

    pub fn is_over_limit(&self) -> bool {
        self.char_count() > MAX_INPUT_CHARS
    }

    pub fn validate(draft: &str, status: Status) -> Result<(), ValidationError> {
        if status != Status::Idle {
            return Err(ValidationError::Busy);
        }
        if draft.trim().is_empty() {
            return Err(ValidationError::Empty);
        }
        let chars = draft.chars().count();
        if chars > MAX_INPUT_CHARS {
            return Err(ValidationError::TooLong { chars });
        }
        Ok(())
    }

    pub fn is_submittable(draft: &str, status: Status) -> bool {
        Self::validate(draft, status).is_ok()
    }
}

use crate::error::ApiError;
use std::fmt;

pub const MAX_NAME_CHARS: usize = 100;

/// Characters rejected in profile names, beyond control characters.
pub const RESERVED_CHARS: [char; 9] = ['<', '>', ':', '"', '|', '?', '*', '/', '\\'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileNameError {
    Empty,
    TooLong { len: usize, max: usize },
    ReservedCharacter(char),
}

impl fmt::Display for ProfileNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Profile name cannot be empty"),
            Self::TooLong { len, max } => {
                write!(f, "Profile name too long: {} chars (max {})", len, max)
            }
            Self::ReservedCharacter(c) if c.is_control() => {
                write!(f, "Profile name cannot contain control character {:?}", c)
            }
            Self::ReservedCharacter(c) => {
                write!(f, "Profile name cannot contain '{}'", c)
            }
        }
    }
}

impl std::error::Error for ProfileNameError {}

impl From<ProfileNameError> for ApiError {
    fn from(err: ProfileNameError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// A validated, trimmed profile name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileName(String);

impl ProfileName {
    pub fn new(name: impl AsRef<str>) -> Result<Self, ProfileNameError> {
        let trimmed = name.as_ref().trim();

        if trimmed.is_empty() {
            return Err(ProfileNameError::Empty);
        }

        let char_count = trimmed.chars().count();
        if char_count > MAX_NAME_CHARS {
            return Err(ProfileNameError::TooLong {
                len: char_count,
                max: MAX_NAME_CHARS,
            });
        }

        if let Some(c) = trimmed
            .chars()
            .find(|c| c.is_control() || RESERVED_CHARS.contains(c))
        {
            return Err(ProfileNameError::ReservedCharacter(c));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// For case-insensitive uniqueness comparison.
    pub fn normalized(&self) -> String {
        normalize(&self.0)
    }
}

/// Comparison key for raw names.
pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

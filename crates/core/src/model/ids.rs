use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

// Backend ids are opaque strings (document ids); the only rule enforced here is
// that they are non-empty once trimmed.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an id received from a trusted source (backend response, storage row).
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        kind: stringify!($name),
                    });
                }
                Ok(Self(trimmed.to_owned()))
            }
        }
    };
}

string_id!(
    /// Unique identifier for a quiz.
    QuizId
);
string_id!(
    /// Unique identifier for a study material.
    MaterialId
);
string_id!(
    /// Unique identifier for a recorded quiz attempt.
    AttemptId
);
string_id!(
    /// Unique identifier for a user account.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_id_display_is_raw_value() {
        let id = QuizId::new("65f0c0ffee");
        assert_eq!(id.to_string(), "65f0c0ffee");
        assert_eq!(format!("{id:?}"), "QuizId(65f0c0ffee)");
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: MaterialId = "  abc  ".parse().unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn parse_rejects_blank() {
        let err = "   ".parse::<UserId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse UserId from string");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&AttemptId::new("a1")).unwrap();
        assert_eq!(json, "\"a1\"");
    }
}

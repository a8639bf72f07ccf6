//! URL-safe vendor slugs.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The input (or its slugified form) is empty.
    #[error("slug cannot be empty")]
    Empty,
    /// The input exceeds the maximum length.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacter,
    /// The input starts or ends with a hyphen.
    #[error("slug cannot start or end with a hyphen")]
    EdgeHyphen,
}

/// A URL-safe slug identifying a vendor.
///
/// Globally unique (enforced by the database) and restricted to
/// `[a-z0-9-]`, so it can appear in a path segment without escaping.
///
/// ```
/// use plateful_core::Slug;
///
/// let slug = Slug::slugify("Mama's Tandoori Kitchen").unwrap();
/// assert_eq!(slug.as_str(), "mamas-tandoori-kitchen");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `Slug` from an already-slugified string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains a
    /// character outside `[a-z0-9-]`, or starts/ends with a hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(SlugError::InvalidCharacter);
        }

        if s.starts_with('-') || s.ends_with('-') {
            return Err(SlugError::EdgeHyphen);
        }

        Ok(Self(s.to_owned()))
    }

    /// Build a `Slug` from free-form text.
    ///
    /// Lowercases, maps runs of non-alphanumeric characters to single
    /// hyphens, and trims edge hyphens.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::Empty` if nothing slug-worthy remains, or
    /// `SlugError::TooLong` if the result exceeds the maximum length.
    pub fn slugify(text: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(text.len());
        let mut pending_hyphen = false;

        for c in text.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !out.is_empty() {
                    out.push('-');
                }
                pending_hyphen = false;
                out.push(c.to_ascii_lowercase());
            } else if c.is_whitespace() || c == '-' || c == '_' {
                pending_hyphen = true;
            }
            // Everything else (punctuation, non-ASCII) is dropped
        }

        Self::parse(&out)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("tandoori-kitchen").is_ok());
        assert!(Slug::parse("cafe-42").is_ok());
    }

    #[test]
    fn test_parse_rejections() {
        assert!(matches!(Slug::parse(""), Err(SlugError::Empty)));
        assert!(matches!(
            Slug::parse("Tandoori"),
            Err(SlugError::InvalidCharacter)
        ));
        assert!(matches!(
            Slug::parse("caf\u{e9}"),
            Err(SlugError::InvalidCharacter)
        ));
        assert!(matches!(Slug::parse("-edge"), Err(SlugError::EdgeHyphen)));
        assert!(matches!(Slug::parse("edge-"), Err(SlugError::EdgeHyphen)));

        let long = "a".repeat(101);
        assert!(matches!(Slug::parse(&long), Err(SlugError::TooLong { .. })));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(
            Slug::slugify("Mama's Tandoori Kitchen").unwrap().as_str(),
            "mamas-tandoori-kitchen"
        );
        assert_eq!(Slug::slugify("  Wok & Roll  ").unwrap().as_str(), "wok-roll");
        assert_eq!(Slug::slugify("Cafe_42").unwrap().as_str(), "cafe-42");
    }

    #[test]
    fn test_slugify_empty_result() {
        assert!(matches!(Slug::slugify("!!!"), Err(SlugError::Empty)));
    }
}

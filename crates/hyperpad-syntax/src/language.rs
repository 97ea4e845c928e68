//! Supported document languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::SyntaxError;

/// The language of a document. Selects the token rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Html,
    Css,
    Js,
}

impl Language {
    /// Maps a file extension (without the dot) to a language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Language::Html),
            "css" => Some(Language::Css),
            "js" | "mjs" => Some(Language::Js),
            _ => None,
        }
    }

    /// Detects the language from a file path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Markers used to wrap a selection into a comment.
    pub fn comment_markers(self) -> (&'static str, &'static str) {
        match self {
            Language::Html => ("<!-- ", " -->"),
            Language::Css => ("/* ", " */"),
            Language::Js => ("/** ", " */"),
        }
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Language::Html => "html",
            Language::Css => "css",
            Language::Js => "js",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Language::Html),
            "css" => Ok(Language::Css),
            "js" | "javascript" => Ok(Language::Js),
            other => Err(SyntaxError::UnknownLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("HTML".parse::<Language>().unwrap(), Language::Html);
        assert_eq!("javascript".parse::<Language>().unwrap(), Language::Js);
        assert!("php".parse::<Language>().is_err());
    }

    #[test]
    fn test_comment_markers() {
        assert_eq!(Language::Html.comment_markers(), ("<!-- ", " -->"));
        assert_eq!(Language::Js.comment_markers().0, "/** ");
    }
}

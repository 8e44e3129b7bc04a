use std::fmt;

/// Machine-readable error codes surfaced by the CLI and any UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BookNotFound,
    BookParseError,
    ConfigParseError,
    ChapterNotFound,
    ChoiceNotFound,
    PublishBlocked,
    NoRoute,
    SnapshotTampered,
    InternalUnexpected,
}

impl ErrorCode {
    pub const ALL: [Self; 9] = [
        Self::BookNotFound,
        Self::BookParseError,
        Self::ConfigParseError,
        Self::ChapterNotFound,
        Self::ChoiceNotFound,
        Self::PublishBlocked,
        Self::NoRoute,
        Self::SnapshotTampered,
        Self::InternalUnexpected,
    ];

    /// `E####`. The first digit groups by area: 1 files, 2 lookups,
    /// 3 publishing and routing, 9 internal.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BookNotFound => "E1001",
            Self::BookParseError => "E1002",
            Self::ConfigParseError => "E1003",
            Self::ChapterNotFound => "E2001",
            Self::ChoiceNotFound => "E2002",
            Self::PublishBlocked => "E3001",
            Self::NoRoute => "E3002",
            Self::SnapshotTampered => "E3003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Prefix of the rendered error message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BookNotFound => "Book file not found",
            Self::BookParseError => "Book file parse error",
            Self::ConfigParseError => "Config file parse error",
            Self::ChapterNotFound => "Chapter not found",
            Self::ChoiceNotFound => "Choice not found",
            Self::PublishBlocked => "Book is not ready to publish",
            Self::NoRoute => "No ending is reachable",
            Self::SnapshotTampered => "Published snapshot failed verification",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Next step to suggest, when there is an obvious one.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::BookNotFound => Some("Run `bb init --title <title>` to create a book file."),
            Self::BookParseError => Some("Fix the JSON in the book file and retry."),
            Self::ConfigParseError => Some("Fix syntax in .branchbook/config.toml and retry."),
            Self::ChapterNotFound => Some("Run `bb chapter list` to see valid chapter ids."),
            Self::ChoiceNotFound => None,
            Self::PublishBlocked => Some("Run `bb validate` and resolve every listed problem."),
            Self::NoRoute => {
                Some("Mark at least one chapter as an ending and connect it to the start.")
            }
            Self::SnapshotTampered => {
                Some("Run `bb publish` again instead of editing snapshot files.")
            }
            Self::InternalUnexpected => {
                Some("This is a bug; rerun with BRANCHBOOK_LOG=debug and report it.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::BTreeSet;

    #[test]
    fn codes_are_distinct_and_well_formed() {
        let codes: BTreeSet<&str> = ErrorCode::ALL.iter().map(|c| c.code()).collect();
        assert_eq!(codes.len(), ErrorCode::ALL.len());
        for code in codes {
            assert!(code.len() == 5 && code.starts_with('E'), "{code}");
            assert!(code[1..].bytes().all(|b| b.is_ascii_digit()), "{code}");
        }
    }

    #[test]
    fn display_is_the_bare_code() {
        assert_eq!(ErrorCode::NoRoute.to_string(), "E3002");
    }

    #[test]
    fn lookups_point_at_listing_commands() {
        let hint = ErrorCode::ChapterNotFound.hint().unwrap_or_default();
        assert!(hint.contains("bb chapter list"));
    }
}

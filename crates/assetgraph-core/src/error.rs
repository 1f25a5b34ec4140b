use std::fmt;

/// Machine-readable error codes surfaced by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    DefinitionsUnreadable,
    DefinitionsInvalid,
    LiveFeedUnreadable,
    LiveFeedInvalid,
    AssetNotFound,
    AmbiguousAssetKey,
    CycleDetected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::DefinitionsUnreadable => "E1101",
            Self::DefinitionsInvalid => "E1102",
            Self::LiveFeedUnreadable => "E1201",
            Self::LiveFeedInvalid => "E1202",
            Self::AssetNotFound => "E2001",
            Self::AmbiguousAssetKey => "E2002",
            Self::CycleDetected => "E2003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::DefinitionsUnreadable => "Definitions file unreadable",
            Self::DefinitionsInvalid => "Definitions file invalid",
            Self::LiveFeedUnreadable => "Live feed file unreadable",
            Self::LiveFeedInvalid => "Live feed file invalid",
            Self::AssetNotFound => "Asset not found",
            Self::AmbiguousAssetKey => "Ambiguous asset key",
            Self::CycleDetected => "Dependency cycle detected",
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .assetgraph/config.toml and retry."),
            Self::DefinitionsUnreadable | Self::LiveFeedUnreadable => {
                Some("Check the path and file permissions, or pass `-` to read stdin.")
            }
            Self::DefinitionsInvalid => {
                Some("Expected a JSON object with an `assetNodes` array of definitions.")
            }
            Self::LiveFeedInvalid => {
                Some("Expected a JSON object with `assetNodes` and `assetsLatestInfo` arrays.")
            }
            Self::AssetNotFound => Some("Run `ag graph` to list known asset keys."),
            Self::AmbiguousAssetKey => {
                Some("Pass the key as a JSON array, e.g. '[\"a\",\"b/c\"]'.")
            }
            Self::CycleDetected => {
                Some("Remove one dependency in each reported group to make the graph acyclic.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

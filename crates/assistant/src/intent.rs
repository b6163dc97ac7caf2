use serde::{Deserialize, Serialize};
use std::fmt;

/// What the assistant decided a message was asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    AddExpense,
    ViewExpenses,
    Analytics,
    DownloadCsv,
    Profile,
    Help,
    Thanks,
    Farewell,
    /// No keyword rule fired, but a catalog entry scored above the threshold
    Suggestion,
    /// Nothing matched confidently; the default response was returned
    Unrecognized,
}

impl Intent {
    /// Stable tag used on the wire and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::AddExpense => "add_expense",
            Self::ViewExpenses => "view_expenses",
            Self::Analytics => "analytics",
            Self::DownloadCsv => "download_csv",
            Self::Profile => "profile",
            Self::Help => "help",
            Self::Thanks => "thanks",
            Self::Farewell => "farewell",
            Self::Suggestion => "suggestion",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// True for intents produced by an exact keyword rule.
    #[must_use]
    pub const fn is_rule(self) -> bool {
        !matches!(self, Self::Suggestion | Self::Unrecognized)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

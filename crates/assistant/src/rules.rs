//! Exact keyword rules, evaluated before any fuzzy scoring.
//!
//! Rules are plain substring tests against the normalized message. Order matters: the first rule
//! whose trigger fires wins, so an early category shadows every later one (a message that both
//! greets and asks to add an expense is a greeting).

use crate::intent::Intent;

/// How a rule decides whether it fires.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// Any listed needle occurs as a substring
    Any(&'static [&'static str]),
    /// Any of `any` occurs and `with` also occurs, in either order
    Paired {
        any: &'static [&'static str],
        with: &'static str,
    },
}

impl Trigger {
    #[must_use]
    pub fn fires(&self, normalized: &str) -> bool {
        match self {
            Self::Any(needles) => needles.iter().any(|needle| normalized.contains(needle)),
            Self::Paired { any, with } => {
                any.iter().any(|needle| normalized.contains(needle)) && normalized.contains(with)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub intent: Intent,
    pub trigger: Trigger,
    pub response: &'static str,
}

/// The rule table in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Greeting,
        trigger: Trigger::Any(&["hello", "hi", "hey", "good morning", "good evening"]),
        response: "👋 Hello there! How can I help you today? You can ask me about adding, viewing, or analyzing your expenses.",
    },
    Rule {
        intent: Intent::AddExpense,
        trigger: Trigger::Paired {
            any: &["add"],
            with: "expense",
        },
        response: "💰 To add a new expense, <a href=\"/add_expense\">click here</a>.",
    },
    Rule {
        intent: Intent::ViewExpenses,
        trigger: Trigger::Paired {
            any: &["view", "show", "see"],
            with: "expense",
        },
        response: "📂 You can view your expenses on your <a href=\"/dashboard\" class=\"text-blue-600 hover:underline\">Dashboard</a>.",
    },
    Rule {
        intent: Intent::Analytics,
        trigger: Trigger::Any(&["report", "analytics", "chart", "insight", "analysis"]),
        response: "📊 You can explore detailed insights on your <a href=\"/analytics\" class=\"text-blue-600 hover:underline\">Analytics</a> page.",
    },
    Rule {
        intent: Intent::DownloadCsv,
        trigger: Trigger::Paired {
            any: &["download"],
            with: "csv",
        },
        response: "📥 You can download all your expense records from <a href=\"/download_csv\" class=\"text-blue-600 hover:underline\">here</a>.",
    },
    Rule {
        intent: Intent::Profile,
        trigger: Trigger::Any(&["profile", "account", "settings"]),
        response: "👤 You can view or update your profile <a href=\"/profile\" class=\"text-blue-600 hover:underline\">here</a>.",
    },
    Rule {
        intent: Intent::Help,
        trigger: Trigger::Any(&["help", "what can you do"]),
        response: "🤖 I can help you with these tasks:<br>💰 Add or view expenses<br>📈 Show analytics and reports<br>📥 Download expense CSV<br>👤 Manage your profile<br>Just tell me what you'd like to do!",
    },
    Rule {
        intent: Intent::Thanks,
        // "thank" already covers the other two.
        trigger: Trigger::Any(&["thank", "thanks", "thank you"]),
        response: "You're very welcome! 😊 Anything else you'd like help with?",
    },
    Rule {
        intent: Intent::Farewell,
        trigger: Trigger::Any(&["bye", "goodbye", "see you"]),
        response: "Goodbye! 👋 Remember to track your expenses regularly to stay financially smart!",
    },
];

/// First rule that fires for an already-normalized message.
#[must_use]
pub fn classify(normalized: &str) -> Option<&'static Rule> {
    let hit = RULES.iter().find(|rule| rule.trigger.fires(normalized));
    if hit.is_none() {
        log::trace!("no keyword rule fired for {normalized:?}");
    }
    hit
}

/// Canned response for a rule intent, `None` for fallback outcomes.
#[must_use]
pub fn response_for(intent: Intent) -> Option<&'static str> {
    RULES
        .iter()
        .find(|rule| rule.intent == intent)
        .map(|rule| rule.response)
}

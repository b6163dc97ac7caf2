use serde::Serialize;
use std::sync::Arc;

use crate::catalog::IntentCatalog;
use crate::config::AssistantConfig;
use crate::context::{ContextStore, UserId};
use crate::error::Result;
use crate::intent::Intent;
use crate::normalize::normalize;
use crate::rules;

/// Best fallback candidate for a message, whether or not it cleared the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub keyword: String,
    pub score: u8,
    pub accepted: bool,
}

/// Outcome of resolving one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub text: String,
    pub intent: Intent,
    /// Present whenever the fallback scorer ran and some entry scored above zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordScore {
    pub keyword: String,
    pub score: u8,
}

/// Read-only trace of how a message would be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub normalized: String,
    /// Keyword rule that fired, if any; when set the fallback is skipped
    pub rule: Option<Intent>,
    pub threshold: u8,
    /// Fallback score per catalog entry, empty when a rule fired
    pub scores: Vec<KeywordScore>,
    pub resolution: Resolution,
}

/// Resolves chat messages to canned responses and remembers each user's last message.
///
/// Keyword rules run first in fixed order. When none fires, every catalog keyword is scored with
/// [`partial_ratio`](crate::similarity::partial_ratio) and the best entry is accepted only if its
/// score is strictly greater than the threshold.
#[derive(Debug)]
pub struct IntentEngine {
    config: AssistantConfig,
    context: Arc<ContextStore>,
}

impl IntentEngine {
    pub fn new(config: AssistantConfig, context: Arc<ContextStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, context })
    }

    /// Builtin catalog, default threshold, private context store.
    pub fn with_defaults() -> Self {
        Self {
            config: AssistantConfig::default(),
            context: Arc::new(ContextStore::new()),
        }
    }

    /// Resolve one turn for `user`.
    ///
    /// The user's context is overwritten with the normalized message after the response has been
    /// chosen, on every call.
    pub fn resolve(&self, message: &str, user: &UserId) -> Resolution {
        let normalized = normalize(message);
        let resolution = self.decide(&normalized);

        match &resolution.suggestion {
            Some(suggestion) => log::debug!(
                "resolved user={user} intent={} keyword={} score={} threshold={}",
                resolution.intent,
                suggestion.keyword,
                suggestion.score,
                self.config.threshold
            ),
            None => log::debug!(
                "resolved user={user} intent={} via={}",
                resolution.intent,
                if resolution.intent.is_rule() { "rule" } else { "default" }
            ),
        }

        self.context.set(user, normalized);
        resolution
    }

    /// Same decision as [`resolve`](Self::resolve), with per-entry scores, and no context write.
    #[must_use]
    pub fn explain(&self, message: &str) -> Explanation {
        let normalized = normalize(message);
        let rule = rules::classify(&normalized).map(|rule| rule.intent);
        let scores = if rule.is_some() {
            Vec::new()
        } else {
            self.config
                .catalog
                .scores(&normalized)
                .map(|(idx, score)| KeywordScore {
                    keyword: self.config.catalog.entries()[idx].keyword.clone(),
                    score,
                })
                .collect()
        };
        let resolution = self.decide(&normalized);

        Explanation {
            normalized,
            rule,
            threshold: self.config.threshold,
            scores,
            resolution,
        }
    }

    fn decide(&self, normalized: &str) -> Resolution {
        if let Some(rule) = rules::classify(normalized) {
            return Resolution {
                text: rule.response.to_string(),
                intent: rule.intent,
                suggestion: None,
            };
        }

        let Some(best) = self.config.catalog.best_match(normalized) else {
            return self.unrecognized(None);
        };

        let accepted = best.score > self.config.threshold;
        let suggestion = Suggestion {
            keyword: best.entry.keyword.clone(),
            score: best.score,
            accepted,
        };
        if accepted {
            Resolution {
                text: best.entry.response.clone(),
                intent: Intent::Suggestion,
                suggestion: Some(suggestion),
            }
        } else {
            self.unrecognized(Some(suggestion))
        }
    }

    fn unrecognized(&self, suggestion: Option<Suggestion>) -> Resolution {
        Resolution {
            text: self.config.default_response.clone(),
            intent: Intent::Unrecognized,
            suggestion,
        }
    }

    /// Last normalized message recorded for `user`.
    #[must_use]
    pub fn last_message(&self, user: &UserId) -> Option<String> {
        self.context.get(user)
    }

    #[must_use]
    pub fn threshold(&self) -> u8 {
        self.config.threshold
    }

    #[must_use]
    pub fn catalog(&self) -> &IntentCatalog {
        &self.config.catalog
    }

    #[must_use]
    pub fn context(&self) -> &Arc<ContextStore> {
        &self.context
    }
}

impl Default for IntentEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::config::DEFAULT_RESPONSE;
    use pretty_assertions::assert_eq;

    fn engine_with(threshold: u8, entries: Vec<CatalogEntry>) -> IntentEngine {
        let config = AssistantConfig {
            threshold,
            catalog: IntentCatalog::new(entries),
            ..Default::default()
        };
        IntentEngine::new(config, Arc::new(ContextStore::new())).unwrap()
    }

    #[test]
    fn rule_hit_skips_fallback() {
        let engine = IntentEngine::with_defaults();
        let resolution = engine.resolve("show my expenses", &UserId::from("u"));
        assert_eq!(resolution.intent, Intent::ViewExpenses);
        assert_eq!(resolution.suggestion, None);
        assert_eq!(
            Some(resolution.text.as_str()),
            rules::response_for(Intent::ViewExpenses)
        );
    }

    #[test]
    fn fallback_accepts_above_threshold() {
        let engine = IntentEngine::with_defaults();
        let resolution = engine.resolve("prfile please", &UserId::from("u"));
        assert_eq!(resolution.intent, Intent::Suggestion);
        assert_eq!(
            resolution.suggestion,
            Some(Suggestion {
                keyword: "profile".to_string(),
                score: 86,
                accepted: true,
            })
        );
        assert_eq!(resolution.text, IntentCatalog::builtin().entries()[4].response);
    }

    #[test]
    fn score_equal_to_threshold_is_rejected() {
        let engine = IntentEngine::with_defaults();
        let resolution = engine.resolve("anaxx", &UserId::from("u"));
        assert_eq!(resolution.intent, Intent::Unrecognized);
        assert_eq!(resolution.text, DEFAULT_RESPONSE);
        assert_eq!(
            resolution.suggestion,
            Some(Suggestion {
                keyword: "analytics".to_string(),
                score: 60,
                accepted: false,
            })
        );
    }

    #[test]
    fn score_one_above_threshold_is_accepted() {
        // 11 of 18 chars align: 2 * 11 / 36 rounds to 61.
        let engine = engine_with(60, vec![CatalogEntry::new("0123456789klmnopqr", "digits")]);
        let resolution = engine.resolve("0123456789kzzzzzzz", &UserId::from("u"));
        assert_eq!(resolution.suggestion.as_ref().map(|s| s.score), Some(61));
        assert_eq!(resolution.intent, Intent::Suggestion);
        assert_eq!(resolution.text, "digits");
    }

    #[test]
    fn threshold_is_tunable() {
        let strict = engine_with(90, IntentCatalog::builtin().entries().to_vec());
        let resolution = strict.resolve("prfile please", &UserId::from("u"));
        assert_eq!(resolution.intent, Intent::Unrecognized);

        let lenient = engine_with(59, IntentCatalog::builtin().entries().to_vec());
        let resolution = lenient.resolve("anaxx", &UserId::from("u"));
        assert_eq!(resolution.intent, Intent::Suggestion);
        assert_eq!(resolution.suggestion.unwrap().keyword, "analytics");
    }

    #[test]
    fn fallback_tie_prefers_first_entry() {
        let engine = engine_with(
            60,
            vec![
                CatalogEntry::new("rent", "rent first"),
                CatalogEntry::new("food", "food second"),
            ],
        );
        let resolution = engine.resolve("rent and food", &UserId::from("u"));
        assert_eq!(resolution.text, "rent first");

        let swapped = engine_with(
            60,
            vec![
                CatalogEntry::new("food", "food first"),
                CatalogEntry::new("rent", "rent second"),
            ],
        );
        let resolution = swapped.resolve("rent and food", &UserId::from("u"));
        assert_eq!(resolution.text, "food first");
    }

    #[test]
    fn all_zero_scores_give_default_without_suggestion() {
        let engine = IntentEngine::with_defaults();
        let resolution = engine.resolve("qqq", &UserId::from("u"));
        assert_eq!(resolution.intent, Intent::Unrecognized);
        assert_eq!(resolution.suggestion, None);
    }

    #[test]
    fn custom_default_response_is_used() {
        let config = AssistantConfig {
            default_response: "Try again.".to_string(),
            ..Default::default()
        };
        let engine = IntentEngine::new(config, Arc::new(ContextStore::new())).unwrap();
        assert_eq!(engine.resolve("qqq", &UserId::from("u")).text, "Try again.");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AssistantConfig {
            catalog: IntentCatalog::new(Vec::new()),
            ..Default::default()
        };
        assert!(IntentEngine::new(config, Arc::new(ContextStore::new())).is_err());
    }

    #[test]
    fn explain_reports_scores_without_touching_context() {
        let engine = IntentEngine::with_defaults();
        let explanation = engine.explain("  ANAXX ");
        assert_eq!(explanation.normalized, "anaxx");
        assert_eq!(explanation.rule, None);
        assert_eq!(explanation.threshold, 60);
        let scores: Vec<(&str, u8)> = explanation
            .scores
            .iter()
            .map(|s| (s.keyword.as_str(), s.score))
            .collect();
        assert_eq!(
            scores,
            [("add", 33), ("view", 0), ("analytics", 60), ("csv", 0), ("profile", 0)]
        );
        assert_eq!(explanation.resolution.intent, Intent::Unrecognized);
        assert!(engine.context().is_empty());
    }

    #[test]
    fn explain_with_rule_hit_has_no_scores() {
        let engine = IntentEngine::with_defaults();
        let explanation = engine.explain("goodbye");
        assert_eq!(explanation.rule, Some(Intent::Farewell));
        assert!(explanation.scores.is_empty());
        assert_eq!(explanation.resolution.intent, Intent::Farewell);
    }

    #[test]
    fn explain_matches_resolve() {
        let engine = IntentEngine::with_defaults();
        for message in ["hello", "add food", "vew", "", "what is the weather"] {
            let explained = engine.explain(message).resolution;
            let resolved = engine.resolve(message, &UserId::from("u"));
            assert_eq!(explained, resolved, "message {message:?}");
        }
    }
}

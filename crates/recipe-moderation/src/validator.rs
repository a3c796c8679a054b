//! Content validation gate
//!
//! Screens submitted recipe text against a phrase denylist and a link
//! pattern before the submission reaches human moderators. Pure and
//! deterministic: the consumer may re-run it on the same input after a
//! crash and must get the same answer.

use recipe_core::{Recipe, RecipeStep};

/// Built-in denylisted phrases, matched case-insensitively as substrings.
/// Operators extend this list through configuration.
const DEFAULT_DENYLIST: &[&str] = &[
    // Advertisement / solicitation
    "add me on wechat",
    "add me on qq",
    "free giveaway",
    "click the link",
    "dm me to buy",
];

/// Outcome of screening one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub passed: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    /// The submission is clean
    #[must_use]
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    /// The submission violates policy
    #[must_use]
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Screens recipe content against policy rules
#[derive(Debug, Clone)]
pub struct ContentValidator {
    denylist: Vec<String>,
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl ContentValidator {
    /// Create a validator with the built-in denylist plus extra phrases
    #[must_use]
    pub fn new(extra_denylist: &[String]) -> Self {
        let denylist = DEFAULT_DENYLIST
            .iter()
            .map(|s| (*s).to_lowercase())
            .chain(extra_denylist.iter().map(|s| s.to_lowercase()))
            .collect();
        Self { denylist }
    }

    /// Screen a recipe and its steps.
    ///
    /// Checks the title, the description, and each step description in
    /// order; the first violating field short-circuits with a failure
    /// naming that field.
    #[must_use]
    pub fn validate(&self, recipe: &Recipe, steps: &[RecipeStep]) -> ValidationResult {
        let result = self.validate_text(&recipe.title, "Title");
        if !result.passed {
            return result;
        }

        if let Some(description) = &recipe.description {
            let result = self.validate_text(description, "Description");
            if !result.passed {
                return result;
            }
        }

        for (index, step) in steps.iter().enumerate() {
            if let Some(description) = &step.description {
                let label = format!("Step {}", index + 1);
                let result = self.validate_text(description, &label);
                if !result.passed {
                    return result;
                }
            }
        }

        tracing::debug!(recipe_id = recipe.id, "Recipe content passed validation");
        ValidationResult::pass()
    }

    /// Screen a single text field
    fn validate_text(&self, text: &str, field: &str) -> ValidationResult {
        if text.trim().is_empty() {
            return ValidationResult::pass();
        }

        let lower = text.to_lowercase();

        for phrase in &self.denylist {
            if lower.contains(phrase) {
                tracing::warn!(field, phrase = %phrase, "Denylisted phrase detected");
                return ValidationResult::fail(format!(
                    "{field} contains prohibited content, please revise and resubmit"
                ));
            }
        }

        if contains_link(&lower) {
            tracing::warn!(field, "External link detected");
            return ValidationResult::fail(format!("{field} must not contain external links"));
        }

        ValidationResult::pass()
    }
}

/// Detect URL-like tokens: a scheme prefix anywhere, or a token starting
/// with `www.`
fn contains_link(lower_text: &str) -> bool {
    if lower_text.contains("http://") || lower_text.contains("https://") {
        return true;
    }
    lower_text
        .split_whitespace()
        .any(|token| token.starts_with("www."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(title: &str, description: Option<&str>) -> Recipe {
        let mut recipe = Recipe::new(1, 7, title.to_string());
        recipe.description = description.map(String::from);
        recipe
    }

    fn step(order: i32, description: &str) -> RecipeStep {
        RecipeStep::new(i64::from(order), 1, order, Some(description.to_string()))
    }

    #[test]
    fn test_clean_recipe_passes() {
        let validator = ContentValidator::default();
        let steps = vec![step(1, "Dice the tofu"), step(2, "Simmer for ten minutes")];

        let result = validator.validate(&recipe("Mapo tofu", Some("A Sichuan classic")), &steps);
        assert!(result.passed);
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_denylisted_title_fails() {
        let validator = ContentValidator::default();

        let result = validator.validate(&recipe("Free giveaway inside!", None), &[]);
        assert!(!result.passed);
        assert!(result.reason.unwrap().starts_with("Title"));
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        let validator = ContentValidator::default();

        let result = validator.validate(&recipe("ADD ME ON WECHAT for more", None), &[]);
        assert!(!result.passed);
    }

    #[test]
    fn test_link_in_description_fails() {
        let validator = ContentValidator::default();

        let result = validator.validate(
            &recipe("Mapo tofu", Some("Full video at https://example.com/v/1")),
            &[],
        );
        assert!(!result.passed);
        assert_eq!(
            result.reason.as_deref(),
            Some("Description must not contain external links")
        );
    }

    #[test]
    fn test_www_token_fails() {
        let validator = ContentValidator::default();

        let result = validator.validate(&recipe("See www.example.com", None), &[]);
        assert!(!result.passed);
    }

    #[test]
    fn test_first_violating_step_named() {
        let validator = ContentValidator::default();
        let steps = vec![
            step(1, "Dice the tofu"),
            step(2, "Click the link for the sauce"),
            step(3, "Also click the link here"),
        ];

        let result = validator.validate(&recipe("Mapo tofu", None), &steps);
        assert!(!result.passed);
        assert!(result.reason.unwrap().starts_with("Step 2"));
    }

    #[test]
    fn test_blank_fields_are_skipped() {
        let validator = ContentValidator::default();
        let steps = vec![RecipeStep::new(1, 1, 1, None), step(2, "   ")];

        let result = validator.validate(&recipe("Mapo tofu", Some("  ")), &steps);
        assert!(result.passed);
    }

    #[test]
    fn test_extra_denylist_phrases() {
        let validator = ContentValidator::new(&["secret sauce club".to_string()]);

        let result = validator.validate(&recipe("Join the Secret Sauce Club", None), &[]);
        assert!(!result.passed);
    }

    #[test]
    fn test_deterministic_on_repeat() {
        let validator = ContentValidator::default();
        let r = recipe("Visit www.spam.example now", None);

        let first = validator.validate(&r, &[]);
        let second = validator.validate(&r, &[]);
        assert_eq!(first, second);
    }
}

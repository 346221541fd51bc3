//! Action-name grammar and dispatch-target derivation.
//!
//! An action string is the client-supplied dispatch key. The grammar admits
//! one or two dot-separated segments, each a lowercase letter followed by up
//! to 19 lowercase alphanumerics. The empty string is the distinguished
//! default and is accepted without matching the grammar.

use std::sync::LazyLock;

use regex::Regex;

/// Segment substituted for any absent or empty part of an action string.
pub const DEFAULT_SEGMENT: &str = "index";

/// Separator between the module and method segments of an action string.
pub const ACTION_SEPARATOR: char = '.';

static ACTION_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9]{0,19}(?:\.[a-z][a-z0-9]{0,19})?$")
        .expect("action-name grammar is a valid regex")
});

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A non-empty action string that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid action name: {0:?}")]
pub struct InvalidActionName(pub String);

/// Checks an action string against the grammar.
///
/// The empty string is accepted as the default action. The caller decides
/// how a rejection surfaces; the dispatcher deliberately reports it as
/// "not found" rather than "bad request" so probes learn nothing about the
/// grammar itself.
///
/// # Errors
///
/// Returns [`InvalidActionName`] for any non-empty string outside the grammar.
pub fn validate(action: &str) -> Result<(), InvalidActionName> {
    if action.is_empty() || ACTION_NAME.is_match(action) {
        Ok(())
    } else {
        Err(InvalidActionName(action.to_string()))
    }
}

// ---------------------------------------------------------------------------
// DispatchTarget
// ---------------------------------------------------------------------------

/// The `(module, method)` pair derived from an action string.
///
/// Parsing is total: any string produces a target, with absent or empty
/// parts defaulting to [`DEFAULT_SEGMENT`]. Validation is a separate,
/// earlier step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    pub module: String,
    pub method: String,
}

impl DispatchTarget {
    /// Splits an action string on the first separator into module and method.
    #[must_use]
    pub fn parse(action: &str) -> Self {
        let mut parts = action.splitn(2, ACTION_SEPARATOR);
        let module = match parts.next() {
            Some(part) if !part.is_empty() => part,
            _ => DEFAULT_SEGMENT,
        };
        let method = match parts.next() {
            Some(part) if !part.is_empty() => part,
            _ => DEFAULT_SEGMENT,
        };
        Self {
            module: module.to_lowercase(),
            method: method.to_lowercase(),
        }
    }

    /// The key under which the executable unit for this target is located.
    ///
    /// The method is elided when it is the default, so `user`, `user.index`,
    /// and an empty action all collapse onto the same unit.
    #[must_use]
    pub fn unit_id(&self) -> String {
        if self.method == DEFAULT_SEGMENT {
            self.module.clone()
        } else {
            format!("{}{ACTION_SEPARATOR}{}", self.module, self.method)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_action_is_accepted_as_default() {
        assert!(validate("").is_ok());
        let target = DispatchTarget::parse("");
        assert_eq!(target.module, "index");
        assert_eq!(target.method, "index");
        assert_eq!(target.unit_id(), "index");
    }

    #[test]
    fn default_forms_collapse_onto_the_same_unit() {
        assert_eq!(DispatchTarget::parse("").unit_id(), "index");
        assert_eq!(DispatchTarget::parse("index").unit_id(), "index");
        assert_eq!(DispatchTarget::parse("index.index").unit_id(), "index");
    }

    #[test]
    fn two_segment_action_keeps_both_parts() {
        let target = DispatchTarget::parse("user.show");
        assert_eq!(target.module, "user");
        assert_eq!(target.method, "show");
        assert_eq!(target.unit_id(), "user.show");
    }

    #[test]
    fn single_segment_action_elides_the_default_method() {
        assert_eq!(DispatchTarget::parse("user").unit_id(), "user");
    }

    #[test]
    fn valid_names_pass_validation() {
        for action in ["a", "a.b", "user", "user.show", "a1b2.c3d4", "x9999999999999999999"] {
            assert!(validate(action).is_ok(), "expected {action:?} to be valid");
        }
    }

    #[test]
    fn uppercase_is_rejected() {
        assert!(validate("User.show").is_err());
        assert!(validate("user.Show").is_err());
    }

    #[test]
    fn leading_digit_is_rejected() {
        assert!(validate("1user").is_err());
        assert!(validate("user.9show").is_err());
    }

    #[test]
    fn overlong_segment_is_rejected() {
        // 21 characters: one over the limit.
        let long = "a".repeat(21);
        assert!(validate(&long).is_err());
        assert!(validate(&format!("user.{long}")).is_err());
        // 20 characters is still in the grammar.
        assert!(validate(&"a".repeat(20)).is_ok());
    }

    #[test]
    fn third_segment_is_rejected() {
        assert!(validate("a.b.c").is_err());
    }

    #[test]
    fn punctuation_and_whitespace_are_rejected() {
        for action in ["bad name!", "user-show", "user_show", ".show", "user.", " user", "user/show"] {
            assert!(validate(action).is_err(), "expected {action:?} to be rejected");
        }
    }

    #[test]
    fn rejection_carries_the_offending_name() {
        let err = validate("Nope").unwrap_err();
        assert_eq!(err, InvalidActionName("Nope".to_string()));
    }

    proptest! {
        /// Parsing and unit-id derivation never panic and are deterministic,
        /// whatever the input.
        #[test]
        fn parse_is_total(action in ".{0,64}") {
            let first = DispatchTarget::parse(&action);
            let second = DispatchTarget::parse(&action);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.unit_id(), second.unit_id());
        }

        /// Every grammar-conforming action validates and yields a lowercase
        /// unit id made of the same segments.
        #[test]
        fn grammar_conforming_actions_dispatch(
            action in "[a-z][a-z0-9]{0,19}(\\.[a-z][a-z0-9]{0,19})?"
        ) {
            prop_assert!(validate(&action).is_ok());
            let target = DispatchTarget::parse(&action);
            let unit_id = target.unit_id();
            prop_assert_eq!(unit_id.to_lowercase(), unit_id.clone());
            prop_assert!(unit_id.starts_with(&target.module));
        }

        /// Validation never accepts a string with more than one separator.
        #[test]
        fn extra_separators_never_validate(
            head in "[a-z][a-z0-9]{0,5}",
            mid in "[a-z][a-z0-9]{0,5}",
            tail in "[a-z][a-z0-9]{0,5}"
        ) {
            let action = format!("{head}.{mid}.{tail}");
            prop_assert!(validate(&action).is_err());
        }
    }
}

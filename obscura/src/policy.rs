//! Mask policies for string-like values.
//!
//! A policy only describes *how* one string is masked. It does not traverse
//! structures or decide which fields are sensitive; field declarations and
//! the walker do that.

use regex::Regex;
use thiserror::Error;

use crate::engine;

/// Character substituted for masked characters unless a policy overrides it.
pub const DEFAULT_BLUR_CHAR: char = '*';

/// Masking algorithm variant.
///
/// See [`engine`] for the exact boundary arithmetic of every style.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MaskStyle {
    /// Ratio-based masking: 20% visible prefix, blurred run, 20% visible suffix.
    #[default]
    Default,
    /// Masks everything except an optional visible tail.
    Full,
    /// Keeps `visible_count` leading characters, masks the next `blur_count`.
    Prefix,
    /// Keeps `visible_count` trailing characters, masks the `blur_count` before them.
    Suffix,
    /// Keeps `visible_count` characters at both ends, masks a centered run.
    Middle,
    /// Masks the local part of an email address with the prefix algorithm.
    Email,
    /// Collapses every match of a pattern into a single blur character.
    Regex,
}

/// Errors raised while constructing a [`MaskPolicy`].
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A `Regex` style policy was declared without a usable pattern.
    #[error("the `Regex` mask style requires a non-blank pattern")]
    MissingPattern,
    /// The pattern of a `Regex` style policy does not compile.
    #[error("invalid mask pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why the regex engine rejected it.
        #[source]
        source: regex::Error,
    },
}

/// Immutable description of one masking operation.
///
/// Counts are measured in Unicode scalar values. A `blur_count` of `0` means
/// "derive the count from the input length" (`ceil(len * 0.6)`); the derived
/// value is computed per call and never stored back into the policy.
///
/// `Regex` policies can only be obtained through [`MaskPolicy::regex`] or
/// [`MaskPolicyBuilder::build`], which reject missing or invalid patterns.
#[derive(Clone, Debug)]
pub struct MaskPolicy {
    style: MaskStyle,
    blur_count: usize,
    visible_count: usize,
    blur_char: char,
    pattern: Option<Regex>,
}

impl MaskPolicy {
    /// Starts a builder for a policy of the given style.
    #[must_use]
    pub fn builder(style: MaskStyle) -> MaskPolicyBuilder {
        MaskPolicyBuilder::new(style)
    }

    fn plain(style: MaskStyle, visible_count: usize, blur_count: usize) -> Self {
        Self {
            style,
            blur_count,
            visible_count,
            blur_char: DEFAULT_BLUR_CHAR,
            pattern: None,
        }
    }

    /// Ratio-based masking with a blur count derived from the input length.
    #[must_use]
    pub fn ratio() -> Self {
        Self::plain(MaskStyle::Default, 0, 0)
    }

    /// Masks everything but the last `visible_count` characters.
    #[must_use]
    pub fn full(visible_count: usize) -> Self {
        Self::plain(MaskStyle::Full, visible_count, 0)
    }

    /// Keeps `visible_count` leading characters and masks the next `blur_count`.
    #[must_use]
    pub fn prefix(visible_count: usize, blur_count: usize) -> Self {
        Self::plain(MaskStyle::Prefix, visible_count, blur_count)
    }

    /// Keeps `visible_count` trailing characters and masks the `blur_count` before them.
    #[must_use]
    pub fn suffix(visible_count: usize, blur_count: usize) -> Self {
        Self::plain(MaskStyle::Suffix, visible_count, blur_count)
    }

    /// Keeps `visible_count` characters at each end and masks a centered run.
    #[must_use]
    pub fn middle(visible_count: usize, blur_count: usize) -> Self {
        Self::plain(MaskStyle::Middle, visible_count, blur_count)
    }

    /// Masks the local part of an email address, leaving the domain intact.
    #[must_use]
    pub fn email(visible_count: usize, blur_count: usize) -> Self {
        Self::plain(MaskStyle::Email, visible_count, blur_count)
    }

    /// Collapses every match of `pattern` into one blur character.
    pub fn regex(pattern: &str) -> Result<Self, PolicyError> {
        Self::builder(MaskStyle::Regex).pattern(pattern).build()
    }

    /// Uses a specific blur character.
    #[must_use]
    pub fn with_blur_char(mut self, blur_char: char) -> Self {
        self.blur_char = blur_char;
        self
    }

    /// The masking algorithm.
    pub fn style(&self) -> MaskStyle {
        self.style
    }

    /// Declared blur count; `0` means derived from input length.
    pub fn blur_count(&self) -> usize {
        self.blur_count
    }

    /// Characters kept visible, interpreted per style.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Substitution character.
    pub fn blur_char(&self) -> char {
        self.blur_char
    }

    /// Compiled pattern of a `Regex` policy.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Applies the policy to `value`.
    ///
    /// This method is total: it never panics and never fails, whatever the
    /// combination of counts and input length.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        engine::apply(value, Some(self))
    }
}

impl Default for MaskPolicy {
    fn default() -> Self {
        Self::ratio()
    }
}

/// Validating builder for [`MaskPolicy`].
#[derive(Clone, Debug)]
#[must_use]
pub struct MaskPolicyBuilder {
    style: MaskStyle,
    blur_count: usize,
    visible_count: usize,
    blur_char: char,
    pattern: Option<String>,
}

impl MaskPolicyBuilder {
    fn new(style: MaskStyle) -> Self {
        Self {
            style,
            blur_count: 0,
            visible_count: 0,
            blur_char: DEFAULT_BLUR_CHAR,
            pattern: None,
        }
    }

    /// Number of characters to replace; `0` derives it from the input length.
    pub fn blur_count(mut self, blur_count: usize) -> Self {
        self.blur_count = blur_count;
        self
    }

    /// Number of characters kept visible.
    pub fn visible_count(mut self, visible_count: usize) -> Self {
        self.visible_count = visible_count;
        self
    }

    /// Substitution character.
    pub fn blur_char(mut self, blur_char: char) -> Self {
        self.blur_char = blur_char;
        self
    }

    /// Pattern for the `Regex` style. Ignored by every other style.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Validates and builds the policy.
    ///
    /// Fails when the style is `Regex` and the pattern is missing, blank, or
    /// does not compile.
    pub fn build(self) -> Result<MaskPolicy, PolicyError> {
        let pattern = match self.style {
            MaskStyle::Regex => {
                let source = self
                    .pattern
                    .filter(|pattern| !pattern.trim().is_empty())
                    .ok_or(PolicyError::MissingPattern)?;
                let compiled = Regex::new(&source)
                    .map_err(|source_err| PolicyError::InvalidPattern {
                        pattern: source,
                        source: source_err,
                    })?;
                Some(compiled)
            }
            _ => None,
        };

        Ok(MaskPolicy {
            style: self.style,
            blur_count: self.blur_count,
            visible_count: self.visible_count,
            blur_char: self.blur_char,
            pattern,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MaskPolicy, MaskStyle, PolicyError, DEFAULT_BLUR_CHAR};

    #[test]
    fn shortcuts_use_default_blur_char() {
        let policy = MaskPolicy::prefix(2, 3);
        assert_eq!(policy.style(), MaskStyle::Prefix);
        assert_eq!(policy.visible_count(), 2);
        assert_eq!(policy.blur_count(), 3);
        assert_eq!(policy.blur_char(), DEFAULT_BLUR_CHAR);
        assert!(policy.pattern().is_none());
    }

    #[test]
    fn with_blur_char_overrides_character() {
        let policy = MaskPolicy::full(0).with_blur_char('#');
        assert_eq!(policy.apply_to("abc"), "###");
    }

    #[test]
    fn default_policy_is_ratio_style() {
        let policy = MaskPolicy::default();
        assert_eq!(policy.style(), MaskStyle::Default);
        assert_eq!(policy.blur_count(), 0);
    }

    #[test]
    fn regex_without_pattern_is_rejected() {
        let result = MaskPolicy::builder(MaskStyle::Regex).build();
        assert!(matches!(result, Err(PolicyError::MissingPattern)));
    }

    #[test]
    fn regex_with_blank_pattern_is_rejected() {
        let result = MaskPolicy::regex("   ");
        assert!(matches!(result, Err(PolicyError::MissingPattern)));
    }

    #[test]
    fn regex_with_invalid_pattern_is_rejected() {
        let err = MaskPolicy::regex("(unclosed").unwrap_err();
        match &err {
            PolicyError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            PolicyError::MissingPattern => panic!("expected InvalidPattern"),
        }
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn pattern_is_ignored_for_other_styles() {
        let policy = MaskPolicy::builder(MaskStyle::Prefix)
            .pattern("(unclosed")
            .visible_count(1)
            .blur_count(2)
            .build()
            .unwrap();
        assert!(policy.pattern().is_none());
        assert_eq!(policy.apply_to("abcd"), "a**d");
    }

    #[test]
    fn applying_does_not_back_fill_blur_count() {
        let policy = MaskPolicy::prefix(0, 0);
        let _ = policy.apply_to("abcdefghij");
        assert_eq!(policy.blur_count(), 0);
        // A shorter input gets its own derived count, not the previous one.
        assert_eq!(policy.apply_to("abcde"), "***de");
    }
}

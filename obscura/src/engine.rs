//! The masking algorithms.
//!
//! Every function here is a pure string transformation over Unicode scalar
//! values. Spans are clamped against the input length before any slicing, so
//! no combination of counts and input length can index out of range.

use regex::{NoExpand, Regex};

use crate::policy::{MaskPolicy, MaskStyle};

/// Share of the input kept visible at each end by ratio masking.
const VISIBLE_END_PERCENT: usize = 20;

/// `min(n, max)`: a count never exceeds the span it applies to.
///
/// Counts are unsigned, so the lower bound of zero holds by construction.
#[must_use]
pub const fn clamp(n: usize, max: usize) -> usize {
    if n < max {
        n
    } else {
        max
    }
}

/// Blur count used when a policy leaves it at zero: `ceil(len * 0.6)`.
const fn default_blur_count(len: usize) -> usize {
    (len * 3 + 4) / 5
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Applies `policy` to `value`.
///
/// Blank input (empty or whitespace only) and an absent policy return the
/// input unchanged.
#[must_use]
pub fn apply(value: &str, policy: Option<&MaskPolicy>) -> String {
    let Some(policy) = policy else {
        return value.to_owned();
    };
    if is_blank(value) {
        return value.to_owned();
    }

    let chars: Vec<char> = value.chars().collect();
    let blur = match policy.blur_count() {
        0 => default_blur_count(chars.len()),
        declared => declared,
    };
    let visible = policy.visible_count();
    let blur_char = policy.blur_char();

    match policy.style() {
        MaskStyle::Prefix => mask_prefix(&chars, visible, blur, blur_char),
        MaskStyle::Suffix => mask_suffix(&chars, visible, blur, blur_char),
        MaskStyle::Middle => mask_middle(&chars, visible, blur, blur_char),
        MaskStyle::Full => mask_full(&chars, visible, blur_char),
        MaskStyle::Email => mask_email(value, visible, blur, blur_char),
        MaskStyle::Regex => match policy.pattern() {
            Some(pattern) => mask_matches(value, pattern, blur_char),
            None => mask_leading(&chars, blur, blur_char),
        },
        MaskStyle::Default => {
            // The blur count acts as a ratio of the length, so any non-zero
            // count covers the whole span between the reserved ends.
            let reserved = chars.len() * VISIBLE_END_PERCENT / 100;
            let blur = chars.len().saturating_mul(blur);
            mask_span(&chars, reserved, blur, reserved, blur_char)
        }
    }
}

/// Ratio masking without a policy object.
///
/// Each count is `floor(len * ratio)`; negative or NaN ratios count as zero
/// and ratios above one are capped at the input length. The blur run starts
/// right after the visible prefix and is clamped to the span between the two
/// visible ends. Characters between the blur run and the visible suffix are
/// left untouched.
#[must_use]
pub fn mask_by_ratio(
    value: &str,
    prefix_visible_ratio: f64,
    blur_ratio: f64,
    suffix_visible_ratio: f64,
    blur_char: char,
) -> String {
    if is_blank(value) {
        return value.to_owned();
    }

    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    mask_span(
        &chars,
        ratio_count(len, prefix_visible_ratio),
        ratio_count(len, blur_ratio),
        ratio_count(len, suffix_visible_ratio),
        blur_char,
    )
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn ratio_count(len: usize, ratio: f64) -> usize {
    // Float-to-int `as` saturates, and maps NaN to zero.
    clamp((len as f64 * ratio).floor() as usize, len)
}

fn blur_run(blur_char: char, count: usize) -> impl Iterator<Item = char> {
    std::iter::repeat(blur_char).take(count)
}

/// Keeps `prefix` leading and `suffix` trailing characters reserved and masks
/// up to `blur` characters starting right after the prefix.
fn mask_span(chars: &[char], prefix: usize, blur: usize, suffix: usize, blur_char: char) -> String {
    let len = chars.len();
    let prefix = clamp(prefix, len);
    let suffix = clamp(suffix, len - prefix);
    let blur = clamp(blur, len - prefix - suffix);

    chars[..prefix]
        .iter()
        .copied()
        .chain(blur_run(blur_char, blur))
        .chain(chars[prefix + blur..].iter().copied())
        .collect()
}

fn mask_prefix(chars: &[char], visible: usize, blur: usize, blur_char: char) -> String {
    let len = chars.len();
    let visible = clamp(visible, len);
    let blur = clamp(blur, len - visible);

    chars[..visible]
        .iter()
        .copied()
        .chain(blur_run(blur_char, blur))
        .chain(chars[visible + blur..].iter().copied())
        .collect()
}

fn mask_suffix(chars: &[char], visible: usize, blur: usize, blur_char: char) -> String {
    let len = chars.len();
    let visible = clamp(visible, len);
    let blur = clamp(blur, len - visible);
    let start = len - visible - blur;

    chars[..start]
        .iter()
        .copied()
        .chain(blur_run(blur_char, blur))
        .chain(chars[len - visible..].iter().copied())
        .collect()
}

fn mask_middle(chars: &[char], visible: usize, blur: usize, blur_char: char) -> String {
    let len = chars.len();
    let visible = clamp(visible, len / 2);
    let available = len - visible * 2;
    let blur = clamp(blur, available);
    // Center the run; leftover middle characters stay on both sides of it.
    let start = visible + (available - blur) / 2;

    chars[..start]
        .iter()
        .copied()
        .chain(blur_run(blur_char, blur))
        .chain(chars[start + blur..].iter().copied())
        .collect()
}

fn mask_full(chars: &[char], visible: usize, blur_char: char) -> String {
    let len = chars.len();
    let visible = clamp(visible, len);

    blur_run(blur_char, len - visible)
        .chain(chars[len - visible..].iter().copied())
        .collect()
}

fn mask_email(value: &str, visible: usize, blur: usize, blur_char: char) -> String {
    let Some((local, domain)) = value.split_once('@') else {
        let chars: Vec<char> = value.chars().collect();
        return mask_full(&chars, visible, blur_char);
    };

    let local: Vec<char> = local.chars().collect();
    let mut masked = mask_prefix(&local, visible, blur, blur_char);
    masked.push('@');
    masked.push_str(domain);
    masked
}

fn mask_matches(value: &str, pattern: &Regex, blur_char: char) -> String {
    let mut replacement = [0_u8; 4];
    let replacement: &str = blur_char.encode_utf8(&mut replacement);
    pattern.replace_all(value, NoExpand(replacement)).into_owned()
}

fn mask_leading(chars: &[char], blur: usize, blur_char: char) -> String {
    let blur = clamp(blur, chars.len());

    blur_run(blur_char, blur)
        .chain(chars[blur..].iter().copied())
        .collect()
}

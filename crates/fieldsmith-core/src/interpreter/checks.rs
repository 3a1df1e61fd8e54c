//! Value-level checks run by scalar and collection schemas
//!
//! Checks run in declaration order and keep running after a failure, so one
//! value can collect several issues. String transforms (`trim` and the case
//! folds) replace the value seen by every later check.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use super::issues::{IssueCode, ParseContext, ValidationIssues};
use crate::expr::eval::parse_int;
use crate::ir::{Message, StringFormat};
use crate::model::IpVersion;
use crate::value::{format_date_iso, format_number, js_trim};
use regex::{Regex, RegexBuilder};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub enum StringCheck {
    Min(f64, Message),
    Max(f64, Message),
    Length(f64, Message),
    Regex(Regex, Message),
    Format(StringFormat, Message),
    Includes(String, Message),
    StartsWith(String, Message),
    EndsWith(String, Message),
    Trim,
    ToLowerCase,
    ToUpperCase,
    Datetime(Regex, Message),
    Ip(Option<IpVersion>, Message),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumberCheck {
    Min {
        value: f64,
        inclusive: bool,
        message: Message,
    },
    Max {
        value: f64,
        inclusive: bool,
        message: Message,
    },
    Int(Message),
    MultipleOf(f64, Message),
    Finite(Message),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BigIntCheck {
    Min {
        value: i128,
        inclusive: bool,
        message: Message,
    },
    Max {
        value: i128,
        inclusive: bool,
        message: Message,
    },
    MultipleOf(i128, Message),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DateCheck {
    Min(f64, Message),
    Max(f64, Message),
}

/// Size limits of an array or set; each setter replaces the previous limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeBounds {
    pub min: Option<(f64, Message)>,
    pub max: Option<(f64, Message)>,
    pub exact: Option<(f64, Message)>,
}

fn or_default(message: &Message, fallback: impl FnOnce() -> String) -> String {
    message.clone().unwrap_or_else(fallback)
}

fn utf16_len(s: &str) -> f64 {
    s.encode_utf16().count() as f64
}

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("static pattern compiles")
}

fn sensitive(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern compiles")
}

macro_rules! static_regex {
    ($name:ident, $build:expr) => {
        fn $name() -> &'static Regex {
            static CELL: OnceLock<Regex> = OnceLock::new();
            CELL.get_or_init(|| $build)
        }
    };
}

static_regex!(email_regex, case_insensitive(r"^([A-Z0-9_'+\-\.]*)[A-Z0-9_+-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$"));
static_regex!(uuid_regex, case_insensitive(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"));
static_regex!(cuid_regex, case_insensitive(r"^c[^\s-]{8,}$"));
static_regex!(cuid2_regex, sensitive(r"^[0-9a-z]+$"));
static_regex!(ulid_regex, case_insensitive(r"^[0-9A-HJKMNP-TV-Z]{26}$"));
static_regex!(emoji_regex, sensitive(r"^(\p{Extended_Pictographic}|\p{Emoji_Component})+$"));
static_regex!(base64_regex, sensitive(r"^([0-9a-zA-Z+/]{4})*(([0-9a-zA-Z+/]{2}==)|([0-9a-zA-Z+/]{3}=))?$"));

const DATE_PATTERN: &str = "(([0-9][0-9][2468][048]|[0-9][0-9][13579][26]|[0-9][0-9]0[48]|[02468][048]00|[13579][26]00)-02-29|[0-9]{4}-((0[13578]|1[02])-(0[1-9]|[12][0-9]|3[01])|(0[469]|11)-(0[1-9]|[12][0-9]|30)|(02)-(0[1-9]|1[0-9]|2[0-8])))";

/// Pattern accepted by `datetime`; `None` precision allows any fraction
pub fn datetime_pattern(precision: Option<u8>, offset: bool) -> String {
    let fraction = match precision {
        None => r"(\.[0-9]+)?".to_string(),
        Some(0) => String::new(),
        Some(digits) => format!(r"\.[0-9]{{{}}}", digits),
    };
    let zone = if offset { "(Z|([+-][0-9]{2}:?[0-9]{2}))" } else { "(Z)" };
    format!(
        "^{}T([01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]{}{}$",
        DATE_PATTERN, fraction, zone
    )
}

pub fn datetime_regex(precision: Option<u8>, offset: bool) -> Regex {
    sensitive(&datetime_pattern(precision, offset))
}

pub fn matches_format(format: StringFormat, input: &str) -> bool {
    match format {
        StringFormat::Email => {
            !input.starts_with('.') && !input.contains("..") && email_regex().is_match(input)
        }
        StringFormat::Url => url::Url::parse(input).is_ok(),
        StringFormat::Uuid => uuid_regex().is_match(input),
        StringFormat::Cuid => cuid_regex().is_match(input),
        StringFormat::Cuid2 => cuid2_regex().is_match(input),
        StringFormat::Ulid => ulid_regex().is_match(input),
        StringFormat::Emoji => emoji_regex().is_match(input),
        StringFormat::Base64 => base64_regex().is_match(input),
    }
}

fn matches_ip(version: Option<IpVersion>, input: &str) -> bool {
    let v4 = || input.parse::<Ipv4Addr>().is_ok();
    let v6 = || input.parse::<Ipv6Addr>().is_ok();
    match version {
        Some(IpVersion::V4) => v4(),
        Some(IpVersion::V6) => v6(),
        None => v4() || v6(),
    }
}

/// Run string checks in order; returns the final value and whether any failed
pub fn run_string(
    checks: &[StringCheck],
    mut input: String,
    ctx: &ParseContext,
    issues: &mut ValidationIssues,
) -> (String, bool) {
    let mut failed = false;
    let mut fail = |code: IssueCode, message: String| {
        issues.add(ctx.issue(code, message));
        failed = true;
    };
    for check in checks {
        match check {
            StringCheck::Min(min, message) => {
                if utf16_len(&input) < *min {
                    fail(
                        IssueCode::TooSmall,
                        or_default(message, || {
                            format!("String must contain at least {} character(s)", format_number(*min))
                        }),
                    );
                }
            }
            StringCheck::Max(max, message) => {
                if utf16_len(&input) > *max {
                    fail(
                        IssueCode::TooBig,
                        or_default(message, || {
                            format!("String must contain at most {} character(s)", format_number(*max))
                        }),
                    );
                }
            }
            StringCheck::Length(length, message) => {
                let len = utf16_len(&input);
                if len != *length {
                    let code = if len > *length { IssueCode::TooBig } else { IssueCode::TooSmall };
                    fail(
                        code,
                        or_default(message, || {
                            format!("String must contain exactly {} character(s)", format_number(*length))
                        }),
                    );
                }
            }
            StringCheck::Regex(regex, message) => {
                if !regex.is_match(&input) {
                    fail(IssueCode::InvalidString, or_default(message, || "Invalid".to_string()));
                }
            }
            StringCheck::Format(format, message) => {
                if !matches_format(*format, &input) {
                    fail(
                        IssueCode::InvalidString,
                        or_default(message, || format!("Invalid {}", format.method())),
                    );
                }
            }
            StringCheck::Includes(needle, message) => {
                if !input.contains(needle.as_str()) {
                    fail(
                        IssueCode::InvalidString,
                        or_default(message, || format!("Invalid input: must include \"{}\"", needle)),
                    );
                }
            }
            StringCheck::StartsWith(prefix, message) => {
                if !input.starts_with(prefix.as_str()) {
                    fail(
                        IssueCode::InvalidString,
                        or_default(message, || format!("Invalid input: must start with \"{}\"", prefix)),
                    );
                }
            }
            StringCheck::EndsWith(suffix, message) => {
                if !input.ends_with(suffix.as_str()) {
                    fail(
                        IssueCode::InvalidString,
                        or_default(message, || format!("Invalid input: must end with \"{}\"", suffix)),
                    );
                }
            }
            StringCheck::Trim => input = js_trim(&input).to_string(),
            StringCheck::ToLowerCase => input = input.to_lowercase(),
            StringCheck::ToUpperCase => input = input.to_uppercase(),
            StringCheck::Datetime(regex, message) => {
                if !regex.is_match(&input) {
                    fail(IssueCode::InvalidString, or_default(message, || "Invalid datetime".to_string()));
                }
            }
            StringCheck::Ip(version, message) => {
                if !matches_ip(*version, &input) {
                    fail(IssueCode::InvalidString, or_default(message, || "Invalid ip".to_string()));
                }
            }
        }
    }
    (input, failed)
}

/// `value % step` computed on decimal digits so `0.3 % 0.1` is zero
///
/// A zero step yields NaN, which never counts as a multiple.
pub fn float_safe_remainder(value: f64, step: f64) -> f64 {
    fn decimals(n: f64) -> usize {
        format_number(n)
            .split_once('.')
            .map(|(_, fraction)| fraction.len())
            .unwrap_or(0)
    }
    let places = decimals(value).max(decimals(step));
    let scaled = |n: f64| parse_int(&format!("{:.*}", places, n).replace('.', ""), 10);
    (scaled(value) % scaled(step)) / 10f64.powi(places as i32)
}

pub fn run_number(checks: &[NumberCheck], input: f64, ctx: &ParseContext, issues: &mut ValidationIssues) -> bool {
    let mut failed = false;
    for check in checks {
        let issue = match check {
            NumberCheck::Min {
                value,
                inclusive,
                message,
            } => {
                let too_small = if *inclusive { input < *value } else { input <= *value };
                too_small.then(|| {
                    ctx.issue(
                        IssueCode::TooSmall,
                        or_default(message, || {
                            format!(
                                "Number must be greater than {}{}",
                                if *inclusive { "or equal to " } else { "" },
                                format_number(*value)
                            )
                        }),
                    )
                })
            }
            NumberCheck::Max {
                value,
                inclusive,
                message,
            } => {
                let too_big = if *inclusive { input > *value } else { input >= *value };
                too_big.then(|| {
                    ctx.issue(
                        IssueCode::TooBig,
                        or_default(message, || {
                            format!(
                                "Number must be less than {}{}",
                                if *inclusive { "or equal to " } else { "" },
                                format_number(*value)
                            )
                        }),
                    )
                })
            }
            NumberCheck::Int(message) => (!input.is_finite() || input.fract() != 0.0).then(|| {
                let mut issue = ctx.issue(
                    IssueCode::InvalidType,
                    or_default(message, || "Expected integer, received float".to_string()),
                );
                issue.expected = Some("integer".to_string());
                issue.received = Some("float".to_string());
                issue
            }),
            NumberCheck::MultipleOf(step, message) => (float_safe_remainder(input, *step) != 0.0).then(|| {
                ctx.issue(
                    IssueCode::NotMultipleOf,
                    or_default(message, || format!("Number must be a multiple of {}", format_number(*step))),
                )
            }),
            NumberCheck::Finite(message) => (!input.is_finite()).then(|| {
                ctx.issue(
                    IssueCode::NotFinite,
                    or_default(message, || "Number must be finite".to_string()),
                )
            }),
        };
        if let Some(issue) = issue {
            issues.add(issue);
            failed = true;
        }
    }
    failed
}

pub fn run_bigint(checks: &[BigIntCheck], input: i128, ctx: &ParseContext, issues: &mut ValidationIssues) -> bool {
    let mut failed = false;
    for check in checks {
        let issue = match check {
            BigIntCheck::Min {
                value,
                inclusive,
                message,
            } => {
                let too_small = if *inclusive { input < *value } else { input <= *value };
                too_small.then(|| {
                    ctx.issue(
                        IssueCode::TooSmall,
                        or_default(message, || {
                            format!(
                                "BigInt must be greater than {}{}",
                                if *inclusive { "or equal to " } else { "" },
                                value
                            )
                        }),
                    )
                })
            }
            BigIntCheck::Max {
                value,
                inclusive,
                message,
            } => {
                let too_big = if *inclusive { input > *value } else { input >= *value };
                too_big.then(|| {
                    ctx.issue(
                        IssueCode::TooBig,
                        or_default(message, || {
                            format!(
                                "BigInt must be less than {}{}",
                                if *inclusive { "or equal to " } else { "" },
                                value
                            )
                        }),
                    )
                })
            }
            BigIntCheck::MultipleOf(step, message) => {
                // wrapping: i128::MIN % -1 is 0, not an overflow panic
                let multiple = *step != 0 && input.wrapping_rem(*step) == 0;
                (!multiple).then(|| {
                    ctx.issue(
                        IssueCode::NotMultipleOf,
                        or_default(message, || format!("Number must be a multiple of {}", step)),
                    )
                })
            }
        };
        if let Some(issue) = issue {
            issues.add(issue);
            failed = true;
        }
    }
    failed
}

pub fn run_date(checks: &[DateCheck], input: f64, ctx: &ParseContext, issues: &mut ValidationIssues) -> bool {
    let render = |ms: f64| format_date_iso(ms).unwrap_or_else(|| "Invalid Date".to_string());
    let mut failed = false;
    for check in checks {
        let issue = match check {
            DateCheck::Min(min, message) => (input < *min).then(|| {
                ctx.issue(
                    IssueCode::TooSmall,
                    or_default(message, || format!("Date must be greater than or equal to {}", render(*min))),
                )
            }),
            DateCheck::Max(max, message) => (input > *max).then(|| {
                ctx.issue(
                    IssueCode::TooBig,
                    or_default(message, || format!("Date must be smaller than or equal to {}", render(*max))),
                )
            }),
        };
        if let Some(issue) = issue {
            issues.add(issue);
            failed = true;
        }
    }
    failed
}

impl SizeBounds {
    /// Check a collection of `len` items; `noun` is "Array" or "Set"
    pub fn check(&self, len: usize, noun: &str, ctx: &ParseContext, issues: &mut ValidationIssues) -> bool {
        let len = len as f64;
        let mut failed = false;
        if let Some((exact, message)) = &self.exact {
            if len != *exact {
                let code = if len > *exact { IssueCode::TooBig } else { IssueCode::TooSmall };
                issues.add(ctx.issue(
                    code,
                    or_default(message, || {
                        format!("{} must contain exactly {} element(s)", noun, format_number(*exact))
                    }),
                ));
                failed = true;
            }
        }
        if let Some((min, message)) = &self.min {
            if len < *min {
                issues.add(ctx.issue(
                    IssueCode::TooSmall,
                    or_default(message, || {
                        format!("{} must contain at least {} element(s)", noun, format_number(*min))
                    }),
                ));
                failed = true;
            }
        }
        if let Some((max, message)) = &self.max {
            if len > *max {
                issues.add(ctx.issue(
                    IssueCode::TooBig,
                    or_default(message, || {
                        format!("{} must contain at most {} element(s)", noun, format_number(*max))
                    }),
                ));
                failed = true;
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(checks: &[StringCheck], input: &str) -> (String, ValidationIssues) {
        let mut issues = ValidationIssues::new();
        let (out, _) = run_string(checks, input.to_string(), &ParseContext::root(), &mut issues);
        (out, issues)
    }

    #[test]
    fn test_trim_applies_to_later_checks() {
        let checks = [StringCheck::Trim, StringCheck::Min(3.0, None)];
        let (out, issues) = run(&checks, "  ab  ");
        assert_eq!(out, "ab");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues.issues[0].code, IssueCode::TooSmall);

        let checks = [StringCheck::Min(3.0, None), StringCheck::Trim];
        let (_, issues) = run(&checks, "  ab  ");
        assert!(issues.is_empty());
    }

    #[test]
    fn test_length_counts_utf16_units() {
        let (_, issues) = run(&[StringCheck::Max(1.0, None)], "😀");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_formats() {
        assert!(matches_format(StringFormat::Email, "a.b+c@example.com"));
        assert!(!matches_format(StringFormat::Email, ".a@example.com"));
        assert!(!matches_format(StringFormat::Email, "a..b@example.com"));
        assert!(!matches_format(StringFormat::Email, "a@b"));
        assert!(matches_format(StringFormat::Uuid, "123e4567-e89b-12d3-a456-426614174000"));
        assert!(matches_format(StringFormat::Url, "https://example.com/x"));
        assert!(!matches_format(StringFormat::Url, "not a url"));
        assert!(matches_format(StringFormat::Ulid, "01ARZ3NDEKTSV4RRFFQ69G5FAV"));
        assert!(matches_format(StringFormat::Base64, "aGVsbG8="));
        assert!(!matches_format(StringFormat::Base64, "aGVsbG8"));
        assert!(matches_format(StringFormat::Cuid2, "tz4a98xxat96iws9zmbrgj3a"));
        assert!(matches_format(StringFormat::Emoji, "🙂"));
    }

    #[test]
    fn test_datetime_pattern() {
        let plain = datetime_regex(None, false);
        assert!(plain.is_match("2024-02-29T10:00:00Z"));
        assert!(plain.is_match("2024-01-01T10:00:00.123456Z"));
        assert!(!plain.is_match("2023-02-29T10:00:00Z"));
        assert!(!plain.is_match("2024-01-01T10:00:00+02:00"));
        assert!(datetime_regex(None, true).is_match("2024-01-01T10:00:00+02:00"));
        let millis = datetime_regex(Some(3), false);
        assert!(millis.is_match("2024-01-01T10:00:00.123Z"));
        assert!(!millis.is_match("2024-01-01T10:00:00Z"));
        assert!(!datetime_regex(Some(0), false).is_match("2024-01-01T10:00:00.1Z"));
    }

    #[test]
    fn test_float_safe_remainder() {
        assert_eq!(float_safe_remainder(0.3, 0.1), 0.0);
        assert_eq!(float_safe_remainder(10.0, 5.0), 0.0);
        assert_ne!(float_safe_remainder(7.0, 5.0), 0.0);
        assert!(float_safe_remainder(4.0, 0.0).is_nan());
    }

    #[test]
    fn test_number_bounds() {
        let checks = [
            NumberCheck::Min {
                value: 0.0,
                inclusive: false,
                message: None,
            },
            NumberCheck::Int(Some("whole numbers only".into())),
        ];
        let mut issues = ValidationIssues::new();
        assert!(run_number(&checks, -1.5, &ParseContext::root(), &mut issues));
        assert_eq!(issues.len(), 2);
        assert_eq!(issues.issues[0].message, "Number must be greater than 0");
        assert_eq!(issues.issues[1].message, "whole numbers only");
    }

    #[test]
    fn test_size_bounds() {
        let bounds = SizeBounds {
            min: Some((2.0, None)),
            ..SizeBounds::default()
        };
        let mut issues = ValidationIssues::new();
        assert!(bounds.check(1, "Set", &ParseContext::root(), &mut issues));
        assert_eq!(issues.issues[0].message, "Set must contain at least 2 element(s)");
    }
}

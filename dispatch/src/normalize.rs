//! Argument list normalization.
//!
//! Schema fields are `snake_case` but their flags are hyphenated, so
//! `--max_retries` and `--max-retries` should mean the same thing on the
//! command line. [`normalize_args`] rewrites underscores to hyphens in the
//! name portion of long-flag tokens, working on an owned copy of the
//! argument list. Nothing global is touched, and the same normalized list is
//! fed to both parse passes so they agree on every token.

/// Normalizes long-flag spellings in an argument list.
///
/// Only the name portion of `--name` and `--name=value` tokens is rewritten;
/// values, short flags, positionals, and the leading program name are left
/// alone. A bare `--` stops all rewriting, since everything after it is
/// positional by convention.
///
/// # Examples
///
/// ```
/// use argspec_dispatch::normalize_args;
///
/// let args = normalize_args(["ingest", "--max_retries", "5", "--tag=a_b"]);
/// assert_eq!(args, vec!["ingest", "--max-retries", "5", "--tag=a_b"]);
///
/// let args = normalize_args(["ingest", "--", "--not_a_flag"]);
/// assert_eq!(args, vec!["ingest", "--", "--not_a_flag"]);
/// ```
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut normalized = Vec::new();
    let mut past_separator = false;

    for arg in args {
        let arg = arg.as_ref();
        if past_separator {
            normalized.push(arg.to_string());
            continue;
        }
        if arg == "--" {
            past_separator = true;
            normalized.push(arg.to_string());
            continue;
        }
        normalized.push(normalize_token(arg));
    }

    normalized
}

fn normalize_token(token: &str) -> String {
    let Some(body) = token.strip_prefix("--") else {
        return token.to_string();
    };

    match body.split_once('=') {
        Some((name, value)) => format!("--{}={}", name.replace('_', "-"), value),
        None => format!("--{}", body.replace('_', "-")),
    }
}

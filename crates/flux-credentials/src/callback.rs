//! Callback URL composition.
//!
//! The webhook URL handed to a recipient is the configured base URL with
//! `/api/v1/webhook/{recipient}/{secret}` appended to its path. Joining
//! follows reverse-proxy semantics: exactly one `/` at the seam, whichever
//! side carries it. The URL is recomputed from the stored record each time
//! and never persisted.

use url::Url;

use crate::recipient::RecipientId;
use crate::secret::WebhookSecret;

/// Path prefix under which webhook endpoints are served.
pub const WEBHOOK_ENDPOINT: &str = "/api/v1/webhook";

/// Joins two path fragments with exactly one slash between them.
///
/// - both sides have the slash: one is dropped
/// - neither side has it: one is inserted
/// - otherwise they are concatenated unchanged
#[must_use]
pub fn single_joining_slash(a: &str, b: &str) -> String {
    let a_slash = a.ends_with('/');
    let b_slash = b.starts_with('/');
    match (a_slash, b_slash) {
        (true, true) => format!("{a}{}", &b[1..]),
        (false, false) => format!("{a}/{b}"),
        _ => format!("{a}{b}"),
    }
}

/// Appends `suffix` to the path of `base`.
///
/// The base path is taken in its percent-encoded form, so existing escapes
/// such as `%2F` survive the join. Characters in `suffix` that are not valid
/// in a path are percent-encoded. Scheme, authority, query and fragment of
/// `base` are kept.
#[must_use]
pub fn join_url_path(base: &Url, suffix: &str) -> Url {
    let mut joined = base.clone();
    let path = single_joining_slash(base.path(), suffix);
    joined.set_path(&path);
    joined
}

/// Returns the path suffix for a recipient's webhook, without the base URL.
#[must_use]
pub fn webhook_path(recipient: RecipientId, secret: &WebhookSecret) -> String {
    format!("{WEBHOOK_ENDPOINT}/{}/{}", recipient.as_key(), secret.as_str())
}

/// Builds the full callback URL for a recipient.
#[must_use]
pub fn webhook_url(base: &Url, recipient: RecipientId, secret: &WebhookSecret) -> Url {
    join_url_path(base, &webhook_path(recipient, secret))
}

/// Escapes `.` and `-` with a backslash for the chat markup dialect.
///
/// Only apply this to text that is displayed; a hyperlink target must use
/// the unescaped URL.
#[must_use]
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if matches!(c, '.' | '-') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test_case("a/", "/b", "a/b" ; "both slashes")]
    #[test_case("a", "b", "a/b" ; "no slashes")]
    #[test_case("a/", "b", "a/b" ; "base slash only")]
    #[test_case("a", "/b", "a/b" ; "suffix slash only")]
    #[test_case("", "b", "/b" ; "empty base")]
    #[test_case("a", "", "a/" ; "empty suffix")]
    #[test_case("/", "/", "/" ; "two bare slashes")]
    fn joining_slash_cases(a: &str, b: &str, expected: &str) {
        assert_eq!(single_joining_slash(a, b), expected);
    }

    #[test_case("http://host", "/a/b", "http://host/a/b" ; "host only")]
    #[test_case("http://host/", "/a/b", "http://host/a/b" ; "host with slash")]
    #[test_case("http://host/x", "y", "http://host/x/y" ; "path without slashes")]
    #[test_case("http://host/x/", "/y", "http://host/x/y" ; "path with both slashes")]
    #[test_case("https://h:8443/p", "/hook/1/s", "https://h:8443/p/hook/1/s" ; "port and prefix")]
    fn join_url_path_cases(base: &str, suffix: &str, expected: &str) {
        assert_eq!(join_url_path(&url(base), suffix).as_str(), expected);
    }

    #[test]
    fn join_preserves_percent_encoding_in_base() {
        let joined = join_url_path(&url("http://host/a%2Fb/"), "/c");
        assert_eq!(joined.as_str(), "http://host/a%2Fb/c");
        assert_eq!(joined.path(), "/a%2Fb/c");
    }

    #[test]
    fn join_escapes_unsafe_suffix_characters() {
        let joined = join_url_path(&url("http://host"), "/a b");
        assert_eq!(joined.as_str(), "http://host/a%20b");
    }

    #[test]
    fn join_keeps_query_and_fragment() {
        let joined = join_url_path(&url("http://host/base?x=1#frag"), "tail");
        assert_eq!(joined.as_str(), "http://host/base/tail?x=1#frag");
    }

    #[test]
    fn webhook_url_layout() {
        let secret = WebhookSecret::from_string("0f4c6a3e-2b1d-4e59-9a7f-1c2d3e4f5a6b");
        let recipient = RecipientId::from_chat_id(42);

        assert_eq!(
            webhook_url(&url("http://127.0.0.1:8080"), recipient, &secret).as_str(),
            "http://127.0.0.1:8080/api/v1/webhook/42/0f4c6a3e-2b1d-4e59-9a7f-1c2d3e4f5a6b"
        );
        assert_eq!(
            webhook_url(&url("https://example.com/bot/"), RecipientId::from_chat_id(-5), &secret)
                .as_str(),
            "https://example.com/bot/api/v1/webhook/-5/0f4c6a3e-2b1d-4e59-9a7f-1c2d3e4f5a6b"
        );
    }

    #[test]
    fn escape_markdown_only_touches_dots_and_dashes() {
        assert_eq!(
            escape_markdown("https://a-b.example.com/x_y"),
            r"https://a\-b\.example\.com/x_y"
        );
        assert_eq!(escape_markdown("*bold*"), "*bold*");
        assert_eq!(escape_markdown(""), "");
    }

    #[test]
    fn escaping_does_not_change_link_target() {
        let secret = WebhookSecret::from_string("ab-cd");
        let target = webhook_url(&url("http://h.example"), RecipientId::from_chat_id(1), &secret);
        let display = escape_markdown(target.as_str());

        assert_eq!(target.as_str(), "http://h.example/api/v1/webhook/1/ab-cd");
        assert_eq!(display, r"http://h\.example/api/v1/webhook/1/ab\-cd");
    }

    proptest! {
        #[test]
        fn seam_has_exactly_one_slash(
            a in "[a-z0-9]{1,8}",
            b in "[a-z0-9]{1,8}",
            a_slash in any::<bool>(),
            b_slash in any::<bool>(),
        ) {
            let left = if a_slash { format!("{a}/") } else { a.clone() };
            let right = if b_slash { format!("/{b}") } else { b.clone() };

            prop_assert_eq!(single_joining_slash(&left, &right), format!("{a}/{b}"));
        }

        #[test]
        fn joined_url_path_has_one_seam_slash(
            base_path in "(/[a-z]{1,6}){0,3}",
            trailing in any::<bool>(),
            suffix in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
            leading in any::<bool>(),
        ) {
            let base = format!("http://host{base_path}{}", if trailing { "/" } else { "" });
            let suffix_in = if leading { format!("/{suffix}") } else { suffix.clone() };

            let joined = join_url_path(&url(&base), &suffix_in);

            prop_assert_eq!(joined.path(), format!("{base_path}/{suffix}"));
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionToken(String);

impl CompletionToken {
    /// Returns an instance of `CompletionToken` if the input looks like a token
    /// we could have issued, an error message otherwise.
    ///
    /// Issued tokens are url-safe (alphanumerics plus `-` and `_`) and well
    /// under 128 characters, so anything outside that shape can be rejected
    /// before it ever reaches the store.
    pub fn parse(s: String) -> Result<CompletionToken, String> {
        let is_empty_or_whitespace = s.trim().is_empty();
        let is_too_long = s.len() > 128;
        let contains_forbidden_characters = !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if is_empty_or_whitespace || is_too_long || contains_forbidden_characters {
            Err(format!("{} is not a valid completion token.", s))
        } else {
            Ok(Self(s))
        }
    }
}

impl AsRef<str> for CompletionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::CompletionToken;
    use claims::{assert_err, assert_ok};
    use quickcheck::{Arbitrary, Gen};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOKEN_CHARSET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    #[derive(Debug, Clone)]
    struct ValidTokenFixture(pub String);

    impl Arbitrary for ValidTokenFixture {
        fn arbitrary(g: &mut Gen) -> Self {
            // `Gen` no longer exposes an RNG directly, so seed one from it
            let mut rng = StdRng::seed_from_u64(u64::arbitrary(g));
            let length = rng.gen_range(1..=128);
            let token = (0..length)
                .map(|_| TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())] as char)
                .collect();
            Self(token)
        }
    }

    #[quickcheck_macros::quickcheck]
    fn urlsafe_tokens_are_parsed_successfully(valid_token: ValidTokenFixture) -> bool {
        CompletionToken::parse(valid_token.0).is_ok()
    }

    #[test]
    fn the_urlsafe_base64_shape_our_mailer_issues_is_accepted() {
        let token = "wXg-38fKpZ0Qy7uT5vR2mN4cD6bE8aH1jL3sU9iO0kP".to_string();
        assert_ok!(CompletionToken::parse(token));
    }

    #[test]
    fn a_64_char_hex_token_is_accepted() {
        let token = "4f".repeat(32);
        assert_ok!(CompletionToken::parse(token));
    }

    #[test]
    fn empty_string_is_rejected() {
        let token = "".to_string();
        assert_err!(CompletionToken::parse(token));
    }

    #[test]
    fn whitespace_only_is_rejected() {
        let token = "   ".to_string();
        assert_err!(CompletionToken::parse(token));
    }

    #[test]
    fn a_token_longer_than_128_chars_is_rejected() {
        let token = "a".repeat(129);
        assert_err!(CompletionToken::parse(token));
    }

    #[test]
    fn a_128_char_token_is_accepted() {
        let token = "a".repeat(128);
        assert_ok!(CompletionToken::parse(token));
    }

    #[test]
    fn tokens_with_filter_metacharacters_are_rejected() {
        for token in ["abc def", "abc;def", "eq.done", "abc%3B", "ab\ncd", "abc'--"] {
            assert_err!(CompletionToken::parse(token.to_string()));
        }
    }
}

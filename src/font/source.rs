//! Where a font is downloaded from.

use crate::error::{FontpressError, FontpressResult};

/// A font given either as a direct URL or as a family name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// An absolute `http` or `https` URL.
    Url(String),
    /// A font family, looked up through a URL template.
    Family(String),
}

impl FontSource {
    /// Interpret a user-supplied font name.
    ///
    /// Anything containing a scheme separator must be a well-formed `http(s)`
    /// URL, everything else is treated as a family name.
    pub fn parse(name: &str) -> FontpressResult<Self> {
        let name = name.trim();
        let invalid = || FontpressError::InvalidUrl(name.to_string());

        if let Some((scheme, rest)) = name.split_once("://") {
            if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
                return Err(invalid());
            }

            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            if host.is_empty() || host.chars().any(char::is_whitespace) {
                return Err(invalid());
            }

            return Ok(FontSource::Url(name.to_string()));
        }

        if name.is_empty() || name.chars().any(|c| c.is_control() || "/\\?#&=".contains(c)) {
            return Err(invalid());
        }

        Ok(FontSource::Family(name.to_string()))
    }

    /// The URL the font is downloaded from.
    ///
    /// `template` must contain `{family}`, which is replaced by the
    /// form-encoded family name.
    pub fn url(&self, template: &str) -> String {
        match self {
            FontSource::Url(url) => url.clone(),
            FontSource::Family(family) => template.replace("{family}", &encode_family(family)),
        }
    }
}

fn encode_family(family: &str) -> String {
    let mut encoded = String::with_capacity(family.len());

    for byte in family.bytes() {
        match byte {
            b' ' => encoded.push('+'),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "https://fonts.google.com/download?family={family}";

    #[test]
    fn urls_are_kept() {
        let source = FontSource::parse("https://example.com/fonts/pugnomincho_mini.zip").unwrap();
        assert_eq!(
            source.url(TEMPLATE),
            "https://example.com/fonts/pugnomincho_mini.zip"
        );
    }

    #[test]
    fn families_use_the_template() {
        let source = FontSource::parse("Noto Sans JP").unwrap();
        assert_eq!(source, FontSource::Family("Noto Sans JP".to_string()));
        assert_eq!(
            source.url(TEMPLATE),
            "https://fonts.google.com/download?family=Noto+Sans+JP"
        );
    }

    #[test]
    fn non_ascii_families_are_escaped() {
        let source = FontSource::parse("Zen Maru Gothic é").unwrap();
        assert!(source.url(TEMPLATE).ends_with("Zen+Maru+Gothic+%C3%A9"));
    }

    #[test]
    fn invalid_sources() {
        for name in ["", "   ", "ftp://example.com/a.zip", "https://", "https:///a.zip", "a/b"] {
            assert!(
                matches!(FontSource::parse(name), Err(FontpressError::InvalidUrl(_))),
                "{name:?} should be invalid"
            );
        }
    }
}

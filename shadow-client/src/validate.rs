//! Pre-flight validation of user input sent to the backend.
//!
//! These checks mirror what the backend enforces, so a bad domain or query is
//! rejected without a round trip.

use crate::error::{ClientError, DomainError};

pub const SHADOW_SUFFIX: &str = ".shadow";

const MAX_LABEL: usize = 63;
const MAX_DOMAIN: usize = 253;
const MAX_QUERY: usize = 200;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Validate and normalize (trim, lowercase) a domain.
///
/// `<name>.shadow` requires a single valid label before the suffix; anything
/// else is treated as a custom domain of two or more labels.
pub fn validate_domain(domain: &str) -> Result<String, DomainError> {
    let domain = domain.trim().to_ascii_lowercase();
    if domain.is_empty() {
        return Err(DomainError::Empty);
    }

    if let Some(name) = domain.strip_suffix(SHADOW_SUFFIX) {
        if name.is_empty() {
            return Err(DomainError::Empty);
        }
        check_label(name)?;
        return Ok(domain);
    }

    if domain.len() > MAX_DOMAIN {
        return Err(DomainError::TooLong {
            len: domain.len(),
            max: MAX_DOMAIN,
        });
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(DomainError::MissingTld);
    }
    for label in labels {
        check_label(label)?;
    }
    Ok(domain)
}

fn check_label(label: &str) -> Result<(), DomainError> {
    if label.is_empty() {
        return Err(DomainError::EmptyLabel);
    }
    if label.len() > MAX_LABEL {
        return Err(DomainError::LabelTooLong(label.to_string()));
    }
    if let Some(c) = label
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(DomainError::InvalidChar(c));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(DomainError::Hyphen(label.to_string()));
    }
    Ok(())
}

/// Search limit clamped to `1..=100`, defaulting to 10.
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Search queries must be 1 to 200 characters.
pub fn validate_query(query: &str) -> Result<&str, ClientError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ClientError::InvalidInput("search query cannot be empty".into()));
    }
    if query.chars().count() > MAX_QUERY {
        return Err(ClientError::InvalidInput(format!(
            "search query is longer than {MAX_QUERY} characters"
        )));
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mysite.shadow", "mysite.shadow")]
    #[case("  MySite.SHADOW ", "mysite.shadow")]
    #[case("a.shadow", "a.shadow")]
    #[case("my-site-2.shadow", "my-site-2.shadow")]
    #[case("example.com", "example.com")]
    #[case("www.example.co.uk", "www.example.co.uk")]
    fn accepts(#[case] input: &str, #[case] normalized: &str) {
        assert_eq!(validate_domain(input).unwrap(), normalized);
    }

    #[rstest]
    #[case("", DomainError::Empty)]
    #[case(".shadow", DomainError::Empty)]
    #[case("-site.shadow", DomainError::Hyphen("-site".into()))]
    #[case("site-.shadow", DomainError::Hyphen("site-".into()))]
    #[case("my_site.shadow", DomainError::InvalidChar('_'))]
    #[case("my site.shadow", DomainError::InvalidChar(' '))]
    #[case("sub.site.shadow", DomainError::InvalidChar('.'))]
    #[case("localhost", DomainError::MissingTld)]
    #[case("example..com", DomainError::EmptyLabel)]
    #[case("example.com.", DomainError::EmptyLabel)]
    fn rejects(#[case] input: &str, #[case] expected: DomainError) {
        assert_eq!(validate_domain(input).unwrap_err(), expected);
    }

    #[test]
    fn label_length_limits() {
        let ok = format!("{}.shadow", "a".repeat(63));
        assert!(validate_domain(&ok).is_ok());
        let long = format!("{}.shadow", "a".repeat(64));
        assert!(matches!(validate_domain(&long), Err(DomainError::LabelTooLong(_))));
    }

    #[test]
    fn custom_domain_total_length() {
        let label = "a".repeat(60);
        let domain = format!("{label}.{label}.{label}.{label}.{label}");
        assert!(matches!(validate_domain(&domain), Err(DomainError::TooLong { .. })));
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some(0), 1)]
    #[case(Some(50), 50)]
    #[case(Some(1000), 100)]
    fn limit_is_clamped(#[case] input: Option<u32>, #[case] expected: u32) {
        assert_eq!(clamp_limit(input), expected);
    }

    #[test]
    fn query_bounds() {
        assert!(validate_query("   ").is_err());
        assert_eq!(validate_query(" shadow ").unwrap(), "shadow");
        assert!(validate_query(&"q".repeat(201)).is_err());
    }
}

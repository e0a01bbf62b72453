use crate::error::SeoQueryError;

pub const MAX_KEYWORD_LENGTH: usize = 80;
pub const MAX_SEED_KEYWORDS: usize = 200;
pub const MAX_TARGET_LENGTH: usize = 2048;
pub const MAX_PATTERN_LENGTH: usize = 200;
pub const MAX_LIST_NAME_LENGTH: usize = 100;
pub const MAX_PAGE: i64 = seoquery_api::MAX_PAGE as i64;

/// Strip ASCII control characters (0x00-0x1F except space 0x20), trim whitespace,
/// and enforce a byte-length limit.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, SeoQueryError> {
    if input.len() > max_len {
        return Err(SeoQueryError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_ascii_control() || *c == ' ')
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(SeoQueryError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Normalize a domain or URL target: strips the scheme, a leading `www.`,
/// and trailing slashes, and lowercases the host. A path is kept.
///
/// `https://www.Example.com/blog/` becomes `example.com/blog`.
pub fn normalize_target(input: &str) -> Result<String, SeoQueryError> {
    let trimmed = sanitize_text(input, MAX_TARGET_LENGTH)?;
    let lower_prefix = trimmed.to_ascii_lowercase();
    let without_scheme = if lower_prefix.starts_with("https://") {
        &trimmed[8..]
    } else if lower_prefix.starts_with("http://") {
        &trimmed[7..]
    } else {
        trimmed.as_str()
    };

    let (host, path) = match without_scheme.find('/') {
        Some(idx) => without_scheme.split_at(idx),
        None => (without_scheme, ""),
    };
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let path = path.trim_end_matches('/');

    if host.is_empty() {
        return Err(SeoQueryError::InvalidInput(format!(
            "'{}' does not contain a domain",
            input
        )));
    }
    if host.chars().any(|c| c.is_whitespace()) || !host.contains('.') {
        return Err(SeoQueryError::InvalidInput(format!(
            "'{}' is not a valid domain",
            input
        )));
    }
    Ok(format!("{}{}", host, path))
}

/// Validate one seed keyword: enforce length, strip control chars, trim,
/// collapse inner whitespace, and lowercase.
pub fn validate_keyword(input: &str) -> Result<String, SeoQueryError> {
    let sanitized = sanitize_text(input, MAX_KEYWORD_LENGTH)?;
    Ok(sanitized
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase())
}

/// Validate a list of seed keywords. Duplicates are removed, first
/// occurrence wins.
pub fn validate_keywords(inputs: &[String]) -> Result<Vec<String>, SeoQueryError> {
    if inputs.is_empty() {
        return Err(SeoQueryError::InvalidInput(
            "at least one keyword is required".to_string(),
        ));
    }
    if inputs.len() > MAX_SEED_KEYWORDS {
        return Err(SeoQueryError::InvalidInput(format!(
            "{} keywords given, maximum is {}",
            inputs.len(),
            MAX_SEED_KEYWORDS
        )));
    }
    let mut out: Vec<String> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let keyword = validate_keyword(input)?;
        if !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    Ok(out)
}

/// Validate a `like` pattern. Text without a `%` wildcard becomes a
/// contains-match (`%text%`).
pub fn validate_pattern(input: &str) -> Result<String, SeoQueryError> {
    let sanitized = sanitize_text(input, MAX_PATTERN_LENGTH)?;
    if sanitized.contains('%') {
        Ok(sanitized)
    } else {
        Ok(format!("%{}%", sanitized))
    }
}

/// Validate a page number (1-based).
pub fn validate_page(page: i64) -> Result<u32, SeoQueryError> {
    if !(1..=MAX_PAGE).contains(&page) {
        return Err(SeoQueryError::InvalidInput(format!(
            "page must be between 1 and {}",
            MAX_PAGE
        )));
    }
    Ok(page as u32)
}

/// Validate a numeric location code (e.g. 2840 for the United States).
pub fn validate_location_code(code: i64) -> Result<u32, SeoQueryError> {
    if !(1000..=9_999_999).contains(&code) {
        return Err(SeoQueryError::InvalidInput(format!(
            "unknown location code {}",
            code
        )));
    }
    Ok(code as u32)
}

/// Validate a language code: two ASCII letters, optionally followed by a
/// region suffix (`en`, `pt-br`, `zh-tw`).
pub fn validate_language_code(input: &str) -> Result<String, SeoQueryError> {
    let lower = input.trim().to_ascii_lowercase();
    let valid = match lower.split_once('-') {
        Some((lang, region)) => {
            lang.len() == 2
                && lang.chars().all(|c| c.is_ascii_alphabetic())
                && (2..=4).contains(&region.len())
                && region.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => lower.len() == 2 && lower.chars().all(|c| c.is_ascii_alphabetic()),
    };
    if valid {
        Ok(lower)
    } else {
        Err(SeoQueryError::InvalidInput(format!(
            "invalid language code '{}'. Expected e.g. en, de, pt-br",
            input
        )))
    }
}

/// Validate a keyword list name.
pub fn validate_list_name(input: &str) -> Result<String, SeoQueryError> {
    sanitize_text(input, MAX_LIST_NAME_LENGTH)
}

/// Validate an email address for billing lookups: trims and lowercases,
/// and requires one `@` with a dotted domain.
pub fn validate_email(input: &str) -> Result<String, SeoQueryError> {
    let email = input.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(SeoQueryError::InvalidInput(format!(
            "invalid email address '{}'",
            input
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_scheme_www_and_slash() {
        assert_eq!(
            normalize_target("https://www.Example.com/").unwrap(),
            "example.com"
        );
        assert_eq!(normalize_target("http://example.com").unwrap(), "example.com");
        assert_eq!(normalize_target("WWW.example.com").unwrap(), "example.com");
        assert_eq!(normalize_target("  example.com//  ").unwrap(), "example.com");
    }

    #[test]
    fn normalize_keeps_path_case() {
        assert_eq!(
            normalize_target("https://www.example.com/Blog/Post/").unwrap(),
            "example.com/Blog/Post"
        );
    }

    #[test]
    fn normalize_keeps_non_www_subdomain() {
        assert_eq!(
            normalize_target("https://blog.example.co.uk").unwrap(),
            "blog.example.co.uk"
        );
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_target("").is_err());
        assert!(normalize_target("https://").is_err());
        assert!(normalize_target("localhost").is_err());
        assert!(normalize_target("exa mple.com").is_err());
    }

    #[test]
    fn keyword_is_collapsed_and_lowercased() {
        assert_eq!(
            validate_keyword("  Running   SHOES\t").unwrap(),
            "running shoes"
        );
    }

    #[test]
    fn keyword_too_long() {
        assert!(validate_keyword(&"a".repeat(MAX_KEYWORD_LENGTH + 1)).is_err());
    }

    #[test]
    fn keywords_deduplicated() {
        let input = vec!["Coffee".to_string(), "coffee ".to_string(), "tea".to_string()];
        assert_eq!(validate_keywords(&input).unwrap(), vec!["coffee", "tea"]);
    }

    #[test]
    fn keywords_empty_or_too_many() {
        assert!(validate_keywords(&[]).is_err());
        let many: Vec<String> = (0..=MAX_SEED_KEYWORDS).map(|i| format!("kw{}", i)).collect();
        assert!(validate_keywords(&many).is_err());
    }

    #[test]
    fn pattern_wraps_plain_text() {
        assert_eq!(validate_pattern("blog").unwrap(), "%blog%");
        assert_eq!(validate_pattern("/blog/%").unwrap(), "/blog/%");
        assert!(validate_pattern("   ").is_err());
    }

    #[test]
    fn page_bounds() {
        assert_eq!(validate_page(1).unwrap(), 1);
        assert!(validate_page(0).is_err());
        assert!(validate_page(MAX_PAGE + 1).is_err());
    }

    #[test]
    fn location_code_bounds() {
        assert_eq!(validate_location_code(2840).unwrap(), 2840);
        assert!(validate_location_code(12).is_err());
    }

    #[test]
    fn language_codes() {
        assert_eq!(validate_language_code("EN").unwrap(), "en");
        assert_eq!(validate_language_code("pt-BR").unwrap(), "pt-br");
        assert!(validate_language_code("english").is_err());
        assert!(validate_language_code("e1").is_err());
    }

    #[test]
    fn emails() {
        assert_eq!(
            validate_email(" Jane@Example.com ").unwrap(),
            "jane@example.com"
        );
        assert!(validate_email("jane").is_err());
        assert!(validate_email("jane@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
    }
}

/// Transliterate characters that commonly show up in page titles.
fn transliterate(c: char) -> Option<&'static str> {
    let mapped = match c {
        'ä' | 'Ä' => "ae",
        'ö' | 'Ö' => "oe",
        'ü' | 'Ü' => "ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Å' => "a",
        'ç' | 'Ç' => "c",
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => "e",
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => "i",
        'ñ' | 'Ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => "o",
        'ù' | 'ú' | 'û' | 'Ù' | 'Ú' | 'Û' => "u",
        'ý' | 'ÿ' | 'Ý' => "y",
        _ => return None,
    };
    Some(mapped)
}

/// Generate a URL alias from a title.
///
/// Letters and digits are kept (lower-cased, with common accented letters
/// transliterated), every other run of characters collapses into one hyphen.
/// An empty result falls back to `untitled`.
pub fn generate_alias(title: &str) -> String {
    let mut alias = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        let chunk: Option<String> = if c.is_ascii_alphanumeric() {
            Some(c.to_ascii_lowercase().to_string())
        } else {
            transliterate(c).map(str::to_string)
        };

        match chunk {
            Some(chunk) => {
                if pending_dash && !alias.is_empty() {
                    alias.push('-');
                }
                pending_dash = false;
                alias.push_str(&chunk);
            }
            None => pending_dash = true,
        }
    }

    if alias.is_empty() {
        return "untitled".to_string();
    }

    if alias.len() > 128 {
        alias = alias
            .chars()
            .take(128)
            .collect::<String>()
            .trim_end_matches('-')
            .to_string();
    }

    alias
}

/// Check whether an alias only uses characters that are safe in a page URL.
pub fn is_valid_alias(alias: &str) -> bool {
    if alias.is_empty() || alias.len() > 255 {
        return false;
    }
    if alias.starts_with('/') || alias.ends_with('/') || alias.contains("//") {
        return false;
    }
    alias
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_alias_basic() {
        assert_eq!(generate_alias("Hello World"), "hello-world");
        assert_eq!(generate_alias("About Us"), "about-us");
        assert_eq!(generate_alias("Contact"), "contact");
    }

    #[test]
    fn test_generate_alias_transliterates() {
        assert_eq!(generate_alias("Über uns"), "ueber-uns");
        assert_eq!(generate_alias("Straße"), "strasse");
        assert_eq!(generate_alias("Café René"), "cafe-rene");
    }

    #[test]
    fn test_generate_alias_collapses_separators() {
        assert_eq!(generate_alias("  Hello  World  "), "hello-world");
        assert_eq!(generate_alias("Price: $99.99"), "price-99-99");
        assert_eq!(generate_alias("Hello---World"), "hello-world");
    }

    #[test]
    fn test_generate_alias_empty() {
        assert_eq!(generate_alias(""), "untitled");
        assert_eq!(generate_alias("!!!"), "untitled");
        assert_eq!(generate_alias("世界"), "untitled");
    }

    #[test]
    fn test_generate_alias_truncates() {
        let title = "word ".repeat(60);
        let alias = generate_alias(&title);
        assert!(alias.len() <= 128);
        assert!(!alias.ends_with('-'));
    }

    #[test]
    fn test_is_valid_alias() {
        assert!(is_valid_alias("about-us"));
        assert!(is_valid_alias("team/members"));
        assert!(is_valid_alias("index"));
        assert!(!is_valid_alias(""));
        assert!(!is_valid_alias("/leading"));
        assert!(!is_valid_alias("trailing/"));
        assert!(!is_valid_alias("double//slash"));
        assert!(!is_valid_alias("with space"));
        assert!(!is_valid_alias("query?x=1"));
    }
}

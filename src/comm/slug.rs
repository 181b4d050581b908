use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_SLUG: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// 由名称生成 URL slug：小写、西语字符转写、非字母数字折叠为连字符
/// Slugify a name: lowercase, Spanish transliteration, non-alphanumerics folded to hyphens
pub fn slugify(nombre: &str) -> String {
    let lowered: String = nombre
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect();

    NON_SLUG
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Postres"), "postres");
    }

    #[test]
    fn test_slugify_spaces_and_accents() {
        assert_eq!(slugify("Cocina Española"), "cocina-espanola");
        assert_eq!(slugify("Café con Leche"), "cafe-con-leche");
    }

    #[test]
    fn test_slugify_collapses_symbols() {
        assert_eq!(slugify("  Sopas & Cremas!!  "), "sopas-cremas");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("---"), "");
    }
}

//! Text cleaning helpers for scraped page fragments.

use scraper::Html;

/// Currency marker on all Tokopedia price labels.
pub const CURRENCY: &str = "Rp";

/// Cleans a price label like "Rp1.250.000" into an integer rupiah amount.
///
/// Strips the currency marker and thousands separators. Returns `None` for
/// strings without the marker or with leftover garbage, so a malformed
/// selector hit is skipped rather than misread.
pub fn clean_price(text: &str) -> Option<u64> {
    if !text.contains(CURRENCY) {
        return None;
    }

    let cleaned: String = text
        .replace(CURRENCY, "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.' && *c != ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse().ok()
}

/// True if a price label shows a range ("Rp10.000 - Rp25.000") instead of a
/// single value.
pub fn is_price_range(text: &str) -> bool {
    text.contains('-')
}

/// Extracts the first run of ASCII digits, e.g. "Sisa 12 buah" -> 12.
pub fn first_integer(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}

/// Parses a rating label, accepting the comma decimal separator Tokopedia
/// renders ("4,9" -> 4.9).
pub fn clean_rating(text: &str) -> f64 {
    text.trim().replace(',', ".").parse().unwrap_or(0.0)
}

/// Strips the "terjual" suffix wording from a sold-count label.
pub fn clean_sold_count(text: &str) -> Option<String> {
    let cleaned = text.replace("terjual", "").replace("Terjual", "").trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Extracts the axis name from a variant header label.
///
/// Headers read "Pilih warna: Hitam" - the axis identifier is the normalized
/// lowercase word(s) between "pilih" and the colon.
pub fn parse_axis_label(label: &str) -> Option<String> {
    let lower = label.trim().to_lowercase();
    let rest = lower.strip_prefix("pilih")?.trim_start();
    let name = rest.split(':').next()?.trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Pulls a star count out of an aria-label like "bintang 5".
pub fn rating_from_aria(aria_label: &str) -> Option<f64> {
    let lower = aria_label.to_lowercase();
    let idx = lower.find("bintang")?;
    first_integer(&lower[idx..]).map(f64::from)
}

/// Converts an innerHTML fragment to plain text, turning `<br>` variants into
/// newlines before stripping the remaining markup.
pub fn html_to_text(html: &str) -> String {
    let with_breaks =
        html.replace("<br>", "\n").replace("<br/>", "\n").replace("<br />", "\n");

    let fragment = Html::parse_fragment(&with_breaks);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}

/// Validates that a string is an absolute http(s) URL with a host.
pub fn is_valid_url(candidate: &str) -> bool {
    match url::Url::parse(candidate) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// Resolves a possibly-relative link against the marketplace origin.
pub fn ensure_absolute(href: &str, base_url: &str) -> String {
    match url::Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(joined) => joined.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Reduces arbitrary text to a filename-safe slug.
pub fn filename_safe(text: &str, max_length: usize) -> String {
    let mut safe = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => safe.push('_'),
            c if c.is_whitespace() => safe.push('_'),
            c => safe.push(c),
        }
    }

    let trimmed: String = safe.trim_matches('_').chars().take(max_length).collect();
    let trimmed = trimmed.trim_end_matches('_').to_string();

    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_price() {
        assert_eq!(clean_price("Rp1.250.000"), Some(1_250_000));
        assert_eq!(clean_price("Rp 99.900"), Some(99_900));
        assert_eq!(clean_price("Rp80,000"), Some(80_000));
        assert_eq!(clean_price("Rp5000"), Some(5000));
    }

    #[test]
    fn test_clean_price_rejects_missing_marker() {
        assert_eq!(clean_price("1.250.000"), None);
        assert_eq!(clean_price(""), None);
        assert_eq!(clean_price("Gratis"), None);
    }

    #[test]
    fn test_clean_price_rejects_garbage() {
        assert_eq!(clean_price("Rp"), None);
        assert_eq!(clean_price("Rpabc"), None);
    }

    #[test]
    fn test_is_price_range() {
        assert!(is_price_range("Rp10.000 - Rp25.000"));
        assert!(!is_price_range("Rp10.000"));
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("Sisa 12 buah"), Some(12));
        assert_eq!(first_integer("Stok: 3"), Some(3));
        assert_eq!(first_integer("Stok habis"), None);
        assert_eq!(first_integer(""), None);
    }

    #[test]
    fn test_clean_rating() {
        assert_eq!(clean_rating("4,9"), 4.9);
        assert_eq!(clean_rating("4.5"), 4.5);
        assert_eq!(clean_rating(" 5 "), 5.0);
        assert_eq!(clean_rating("bagus"), 0.0);
    }

    #[test]
    fn test_clean_sold_count() {
        assert_eq!(clean_sold_count("100+ terjual"), Some("100+".to_string()));
        assert_eq!(clean_sold_count("Terjual 50"), Some("50".to_string()));
        assert_eq!(clean_sold_count("terjual"), None);
    }

    #[test]
    fn test_parse_axis_label() {
        assert_eq!(parse_axis_label("Pilih warna: Hitam"), Some("warna".to_string()));
        assert_eq!(parse_axis_label("Pilih Ukuran: XL"), Some("ukuran".to_string()));
        assert_eq!(parse_axis_label("pilih varian rasa:"), Some("varian rasa".to_string()));
        assert_eq!(parse_axis_label("Warna: Hitam"), None);
        assert_eq!(parse_axis_label(""), None);
    }

    #[test]
    fn test_rating_from_aria() {
        assert_eq!(rating_from_aria("bintang 5"), Some(5.0));
        assert_eq!(rating_from_aria("Bintang 4 dari 5"), Some(4.0));
        assert_eq!(rating_from_aria("no stars here"), None);
    }

    #[test]
    fn test_html_to_text() {
        assert_eq!(html_to_text("baris satu<br>baris dua"), "baris satu\nbaris dua");
        assert_eq!(html_to_text("<b>tebal</b> dan <i>miring</i>"), "tebal dan miring");
        assert_eq!(html_to_text("  <p>isi</p>  "), "isi");
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://www.tokopedia.com/search?q=polo"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("tokopedia.com/search"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_ensure_absolute() {
        assert_eq!(
            ensure_absolute("/baju-polo", "https://www.tokopedia.com"),
            "https://www.tokopedia.com/baju-polo"
        );
        assert_eq!(
            ensure_absolute("https://www.tokopedia.com/x", "https://www.tokopedia.com"),
            "https://www.tokopedia.com/x"
        );
    }

    #[test]
    fn test_ensure_absolute_without_leading_slash() {
        assert_eq!(
            ensure_absolute("baju-polo", "https://www.tokopedia.com"),
            "https://www.tokopedia.com/baju-polo"
        );
        assert_eq!(
            ensure_absolute("toko/etalase", "https://www.tokopedia.com/"),
            "https://www.tokopedia.com/toko/etalase"
        );
    }

    #[test]
    fn test_filename_safe() {
        assert_eq!(filename_safe("Polo Pria: Murah/Bagus", 50), "Polo_Pria__Murah_Bagus");
        assert_eq!(filename_safe("", 50), "unnamed");
        assert_eq!(filename_safe("abcdef", 3), "abc");
    }
}

//! Brand keyword matching.

use bnt_core::BrandProfile;

/// Case-insensitive substring match of any brand keyword against `text`.
#[must_use]
pub fn keyword_match(brand: &BrandProfile, text: &str) -> bool {
    let haystack = text.to_lowercase();
    brand.keywords.iter().any(|keyword| {
        let needle = keyword.trim().to_lowercase();
        !needle.is_empty() && haystack.contains(&needle)
    })
}

/// All brands whose keywords match `text`. A multi-brand match fans out:
/// the caller emits one candidate per returned brand.
#[must_use]
pub fn matching_brands<'a>(brands: &'a [BrandProfile], text: &str) -> Vec<&'a BrandProfile> {
    brands
        .iter()
        .filter(|brand| keyword_match(brand, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str, keywords: &[&str]) -> BrandProfile {
        BrandProfile {
            name: name.to_string(),
            keywords: keywords.iter().map(ToString::to_string).collect(),
            domains: None,
            notes: None,
        }
    }

    #[test]
    fn matches_case_insensitively() {
        let acme = brand("Acme", &["acme"]);
        assert!(keyword_match(&acme, "ACME announces record earnings"));
        assert!(!keyword_match(&acme, "Globex announces record earnings"));
    }

    #[test]
    fn any_keyword_matches() {
        let acme = brand("Acme", &["acme corp", "acme inc"]);
        assert!(keyword_match(&acme, "Profile of Acme Inc leadership"));
    }

    #[test]
    fn blank_keywords_never_match() {
        let odd = brand("Odd", &["  "]);
        assert!(!keyword_match(&odd, "anything at all"));
    }

    #[test]
    fn multi_brand_match_fans_out() {
        let brands = vec![brand("Acme", &["acme"]), brand("Globex", &["globex"])];
        let matched = matching_brands(&brands, "Acme and Globex announce a merger");
        assert_eq!(matched.len(), 2);
    }
}

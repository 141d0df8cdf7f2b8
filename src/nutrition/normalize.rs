//! Substance name normalization
//!
//! Every substance name is reduced to a single canonical key before any
//! aggregation or reference lookup, so two spellings of the same substance
//! can never land in two aggregate buckets. Synonyms live in one explicit
//! table rather than chained regex rewrites, keeping the mapping auditable.

/// Synonym table: canonical key followed by its aliases.
///
/// Aliases are written in slug form (lowercase, hyphen-separated) because
/// lookup happens after slugification of the raw name.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("calories", &["calorie", "energy", "kcal"]),
    ("protein", &["proteins"]),
    (
        "carbs",
        &[
            "carb",
            "carbohydrate",
            "carbohydrates",
            "total-carbohydrate",
            "total-carbohydrates",
        ],
    ),
    ("fat", &["fats", "total-fat", "lipids"]),
    ("saturated-fat", &["sat-fat", "saturated-fats"]),
    ("trans-fat", &["trans-fats"]),
    ("fiber", &["fibre", "dietary-fiber", "dietary-fibre"]),
    ("sugar", &["sugars", "total-sugar", "total-sugars"]),
    ("sodium", &["salt"]),
    ("cholesterol", &["dietary-cholesterol"]),
    ("vitamin-c", &["ascorbic-acid"]),
    ("vitamin-d", &["cholecalciferol"]),
    ("vitamin-b12", &["cobalamin"]),
    ("vitamin-b9", &["folate", "folic-acid"]),
];

/// Reduce a raw name to slug form: trimmed, lowercased, whitespace and
/// underscores collapsed to single hyphens.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.trim().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_hyphen = !slug.is_empty();
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        }
    }

    slug
}

/// Normalize a raw substance name to its canonical key.
///
/// Unknown names pass through in slug form; they are never dropped.
pub fn normalize(name: &str) -> String {
    let key = slugify(name);

    for (canonical, aliases) in SYNONYMS {
        if *canonical == key {
            return key;
        }
        if aliases.contains(&key.as_str()) {
            return (*canonical).to_string();
        }
    }

    key
}

/// Human-readable display form of a canonical key: "vitamin-c" -> "Vitamin C"
pub fn display_name(key: &str) -> String {
    key.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_basics() {
        assert_eq!(normalize("Protein"), "protein");
        assert_eq!(normalize("  Vitamin   C  "), "vitamin-c");
        assert_eq!(normalize("omega_3"), "omega-3");
    }

    #[test]
    fn test_documented_synonyms() {
        assert_eq!(normalize("Vitamin C"), "vitamin-c");
        assert_eq!(normalize("Total Fat"), "fat");
        assert_eq!(normalize("Dietary Fiber"), "fiber");
    }

    /// Exhaustive walk of the synonym table: every alias must be in slug
    /// form already and must map to its canonical key.
    #[test]
    fn test_synonym_table_is_exhaustive_and_slugged() {
        for (canonical, aliases) in SYNONYMS {
            assert_eq!(
                slugify(canonical),
                *canonical,
                "canonical key {canonical:?} is not in slug form"
            );
            for alias in *aliases {
                assert_eq!(
                    slugify(alias),
                    *alias,
                    "alias {alias:?} is not in slug form"
                );
                assert_eq!(normalize(alias), *canonical);
            }
        }
    }

    #[test]
    fn test_no_alias_collides_across_canonicals() {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        for (canonical, aliases) in SYNONYMS {
            assert!(seen.insert(*canonical), "duplicate canonical {canonical}");
            for alias in *aliases {
                assert!(seen.insert(*alias), "alias {alias} appears twice");
            }
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["Total Fat", "Ascorbic Acid", "protein", "Something New"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_unknown_names_pass_through() {
        assert_eq!(normalize("Obscure Compound X"), "obscure-compound-x");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("vitamin-c"), "Vitamin C");
        assert_eq!(display_name("protein"), "Protein");
        assert_eq!(display_name("saturated-fat"), "Saturated Fat");
    }
}

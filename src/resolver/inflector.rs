//! Noun inflection for the naming-convention resolver.
//!
//! Rule-based English only. Irregular nouns outside the small table below
//! are a known source of false negatives.

/// Converts nouns between singular and plural forms.
pub trait Inflector {
    fn singularize(&self, word: &str) -> String;
    fn pluralize(&self, word: &str) -> String;
}

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("index", "indices"),
    ("status", "statuses"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "metadata",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

// Only the last `_` segment is inflected: `blog_post` -> `blog_posts`.
fn split_last(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(i) => (&word[..=i], &word[i + 1..]),
        None => ("", word),
    }
}

impl EnglishInflector {
    fn plural_of(noun: &str) -> String {
        let lower = noun.to_ascii_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return noun.to_string();
        }
        if let Some((_, p)) = IRREGULAR.iter().find(|(s, p)| *s == lower || *p == lower) {
            return (*p).to_string();
        }
        let mut chars = lower.chars().rev();
        let last = chars.next();
        let before = chars.next();
        match (before, last) {
            (Some(b), Some('y')) if !is_vowel(b) => format!("{}ies", &noun[..noun.len() - 1]),
            (_, Some('s' | 'x' | 'z')) => format!("{noun}es"),
            (Some('c' | 's'), Some('h')) => format!("{noun}es"),
            _ => format!("{noun}s"),
        }
    }

    fn singular_of(noun: &str) -> String {
        let lower = noun.to_ascii_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return noun.to_string();
        }
        if let Some((s, _)) = IRREGULAR.iter().find(|(s, p)| *p == lower || *s == lower) {
            return (*s).to_string();
        }
        if let Some(stem) = lower.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{}y", &noun[..stem.len()]);
            }
        }
        for suffix in ["sses", "shes", "ches", "xes", "zes"] {
            if lower.ends_with(suffix) {
                return noun[..noun.len() - 2].to_string();
            }
        }
        if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
            return noun.to_string();
        }
        match lower.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => noun[..stem.len()].to_string(),
            _ => noun.to_string(),
        }
    }
}

impl Inflector for EnglishInflector {
    fn singularize(&self, word: &str) -> String {
        let (head, last) = split_last(word);
        format!("{head}{}", Self::singular_of(last))
    }

    fn pluralize(&self, word: &str) -> String {
        let (head, last) = split_last(word);
        format!("{head}{}", Self::plural_of(last))
    }
}

const UNCOUNTABLE: &[&str] = &[
    "data",
    "deer",
    "equipment",
    "fish",
    "information",
    "media",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("man", "men"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("tooth", "teeth"),
];

/// English plural of the last word of `word`.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let last_word = lower.rsplit(['-', '_']).next().unwrap_or(&lower);

    if UNCOUNTABLE.contains(&last_word) {
        return word.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if last_word == *singular {
            let stem = &word[..word.len() - singular.len()];
            return format!("{stem}{plural}");
        }
    }

    let bytes = lower.as_bytes();
    let before_last = bytes.len().checked_sub(2).map(|i| bytes[i]);
    if lower.ends_with('y') && before_last.is_some_and(|b| !b"aeiou".contains(&b)) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// `PostComment` → `post-comment`.
pub fn camel_to_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_alpha = false;
    for ch in name.chars() {
        if ch.is_uppercase() && prev_alpha {
            out.push('-');
        }
        out.extend(ch.to_lowercase());
        prev_alpha = ch.is_alphabetic();
    }
    out
}

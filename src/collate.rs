//! Case-insensitive text ordering that places accented Latin letters next to
//! their base letter ("Ábaco" sorts before "Banana", "ação" next to "acao").
//! Ligatures and letters without a single base expand: "æ" as "ae", "ß" as "ss".

use std::cmp::Ordering;

fn fold_accent(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' | 'ð' => 'd',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì'..='ï' | 'ī' | 'į' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' => 's',
        'ť' => 't',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// Letters that collate as two base letters.
fn expand(c: char) -> Option<&'static str> {
    match c {
        'æ' => Some("ae"),
        'œ' => Some("oe"),
        'ß' => Some("ss"),
        'þ' => Some("th"),
        'ĳ' => Some("ij"),
        _ => None,
    }
}

fn lowered(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars().flat_map(char::to_lowercase)
}

/// Lowercased base letters of `s`, the primary sort key.
fn folded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in lowered(s) {
        match expand(c) {
            Some(letters) => out.push_str(letters),
            None => out.push(fold_accent(c)),
        }
    }
    out
}

/// Compares base letters first, then accents. Case never breaks a tie, so
/// "maria" and "MARIA" are `Equal`.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    folded(a)
        .cmp(&folded(b))
        .then_with(|| lowered(a).cmp(lowered(b)))
}

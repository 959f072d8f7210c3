//! Porter stemming algorithm
//!
//! Reduces inflected English words to a common stem so the lexical features
//! are robust to inflection ("suspended", "suspension" and "suspend" all
//! land on the same vocabulary slot). Implements the original 1980 Porter
//! algorithm, steps 1a through 5b.

/// Stem a single lowercase token.
///
/// Tokens shorter than three characters and tokens containing non-ASCII
/// letters are returned unchanged.
pub fn stem(word: &str) -> String {
    if word.len() < 3 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return word.to_string();
    }
    let mut w: Vec<u8> = word.as_bytes().to_vec();
    step_1a(&mut w);
    step_1b(&mut w);
    step_1c(&mut w);
    step_2(&mut w);
    step_3(&mut w);
    step_4(&mut w);
    step_5a(&mut w);
    step_5b(&mut w);
    // Input was ASCII, every edit keeps it ASCII
    String::from_utf8(w).unwrap_or_else(|_| word.to_string())
}

/// A letter is a consonant unless it is a vowel, or a 'y' preceded by a
/// consonant.
fn is_consonant(w: &[u8], i: usize) -> bool {
    match w[i] {
        b'a' | b'e' | b'i' | b'o' | b'u' => false,
        b'y' => i == 0 || !is_consonant(w, i - 1),
        _ => true,
    }
}

/// The measure m: number of vowel-consonant sequences in the stem.
fn measure(w: &[u8]) -> usize {
    let mut m = 0;
    let mut i = 0;
    let n = w.len();
    // Skip leading consonants
    while i < n && is_consonant(w, i) {
        i += 1;
    }
    loop {
        // Vowel run
        while i < n && !is_consonant(w, i) {
            i += 1;
        }
        if i >= n {
            return m;
        }
        // Consonant run closes one VC sequence
        while i < n && is_consonant(w, i) {
            i += 1;
        }
        m += 1;
        if i >= n {
            return m;
        }
    }
}

fn contains_vowel(w: &[u8]) -> bool {
    (0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_double_consonant(w: &[u8]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// Stem ends consonant-vowel-consonant where the final consonant is not
/// w, x or y.
fn ends_cvc(w: &[u8]) -> bool {
    let n = w.len();
    n >= 3
        && is_consonant(w, n - 3)
        && !is_consonant(w, n - 2)
        && is_consonant(w, n - 1)
        && !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn ends_with(w: &[u8], suffix: &str) -> bool {
    w.len() >= suffix.len() && &w[w.len() - suffix.len()..] == suffix.as_bytes()
}

/// Replace `suffix` with `replacement` if the remaining stem has measure
/// greater than `min_measure`. Returns true if the suffix matched (whether
/// or not the measure condition held), which ends the containing step.
fn replace_if(w: &mut Vec<u8>, suffix: &str, replacement: &str, min_measure: usize) -> bool {
    if !ends_with(w, suffix) {
        return false;
    }
    let stem_len = w.len() - suffix.len();
    if measure(&w[..stem_len]) > min_measure {
        w.truncate(stem_len);
        w.extend_from_slice(replacement.as_bytes());
    }
    true
}

fn step_1a(w: &mut Vec<u8>) {
    if ends_with(w, "sses") {
        w.truncate(w.len() - 2);
    } else if ends_with(w, "ies") {
        w.truncate(w.len() - 2);
    } else if !ends_with(w, "ss") && ends_with(w, "s") {
        w.truncate(w.len() - 1);
    }
}

fn step_1b(w: &mut Vec<u8>) {
    if ends_with(w, "eed") {
        if measure(&w[..w.len() - 3]) > 0 {
            w.truncate(w.len() - 1);
        }
        return;
    }
    let removed = if ends_with(w, "ed") && contains_vowel(&w[..w.len() - 2]) {
        w.truncate(w.len() - 2);
        true
    } else if ends_with(w, "ing") && contains_vowel(&w[..w.len() - 3]) {
        w.truncate(w.len() - 3);
        true
    } else {
        false
    };
    if removed {
        if ends_with(w, "at") || ends_with(w, "bl") || ends_with(w, "iz") {
            w.push(b'e');
        } else if ends_double_consonant(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
            w.truncate(w.len() - 1);
        } else if measure(w) == 1 && ends_cvc(w) {
            w.push(b'e');
        }
    }
}

fn step_1c(w: &mut [u8]) {
    let n = w.len();
    if n >= 2 && w[n - 1] == b'y' && contains_vowel(&w[..n - 1]) {
        w[n - 1] = b'i';
    }
}

fn step_2(w: &mut Vec<u8>) {
    const RULES: &[(&str, &str)] = &[
        ("ational", "ate"),
        ("tional", "tion"),
        ("enci", "ence"),
        ("anci", "ance"),
        ("izer", "ize"),
        ("abli", "able"),
        ("alli", "al"),
        ("entli", "ent"),
        ("eli", "e"),
        ("ousli", "ous"),
        ("ization", "ize"),
        ("ation", "ate"),
        ("ator", "ate"),
        ("alism", "al"),
        ("iveness", "ive"),
        ("fulness", "ful"),
        ("ousness", "ous"),
        ("aliti", "al"),
        ("iviti", "ive"),
        ("biliti", "ble"),
    ];
    for (suffix, replacement) in RULES {
        if replace_if(w, suffix, replacement, 0) {
            return;
        }
    }
}

fn step_3(w: &mut Vec<u8>) {
    const RULES: &[(&str, &str)] = &[
        ("icate", "ic"),
        ("ative", ""),
        ("alize", "al"),
        ("iciti", "ic"),
        ("ical", "ic"),
        ("ful", ""),
        ("ness", ""),
    ];
    for (suffix, replacement) in RULES {
        if replace_if(w, suffix, replacement, 0) {
            return;
        }
    }
}

fn step_4(w: &mut Vec<u8>) {
    const SUFFIXES: &[&str] = &[
        "ement", "ance", "ence", "able", "ible", "ment", "ant", "ent", "ism", "ate", "iti",
        "ous", "ive", "ize", "ion", "al", "er", "ic", "ou",
    ];
    for suffix in SUFFIXES {
        if !ends_with(w, suffix) {
            continue;
        }
        let stem_len = w.len() - suffix.len();
        // "ion" only deletes after 's' or 't'
        if *suffix == "ion" && !(stem_len > 0 && matches!(w[stem_len - 1], b's' | b't')) {
            continue;
        }
        if measure(&w[..stem_len]) > 1 {
            w.truncate(stem_len);
        }
        return;
    }
}

fn step_5a(w: &mut Vec<u8>) {
    if !ends_with(w, "e") {
        return;
    }
    let stem = &w[..w.len() - 1];
    let m = measure(stem);
    if m > 1 || (m == 1 && !ends_cvc(stem)) {
        w.truncate(w.len() - 1);
    }
}

fn step_5b(w: &mut Vec<u8>) {
    if measure(w) > 1 && ends_double_consonant(w) && w[w.len() - 1] == b'l' {
        w.truncate(w.len() - 1);
    }
}

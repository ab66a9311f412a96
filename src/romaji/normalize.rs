/// Lower-case `romaji` and collapse long-vowel spellings.
///
/// Every `oo` becomes `o`. A `u` directly after a vowel is then dropped when
/// the next character is an ASCII lower-case letter or the end of the string.
/// Downstream city matching depends on these exact rules, including their
/// quirks on deliberate double vowels.
#[must_use]
pub fn normalize(romaji: &str) -> String {
    let lowered = romaji.to_lowercase().replace("oo", "o");
    let chars: Vec<char> = lowered.chars().collect();

    let mut out = String::with_capacity(lowered.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        out.push(c);
        let long_vowel = is_vowel(c)
            && chars.get(i + 1) == Some(&'u')
            && chars.get(i + 2).is_none_or(|next| next.is_ascii_lowercase());
        // The character after the `u` is only looked at, never consumed.
        i += if long_vowel { 2 } else { 1 };
    }
    out
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'i' | 'u' | 'e' | 'o')
}

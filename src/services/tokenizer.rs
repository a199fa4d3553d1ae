//! Tokenizer for mixed-script text (CJK + Latin).
//!
//! CJK scripts carry no word boundaries, so contiguous CJK runs are split
//! into overlapping character bigrams; the whole run is kept as one extra
//! token so short exact terms survive bigram fragmentation. Latin text is
//! tokenized as lower-cased alphanumeric runs.

/// Split text into matching units.
///
/// Pure function of its input: punctuation, whitespace, and symbols emit
/// nothing, a single-character CJK run is dropped, and empty input yields an
/// empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();

    // CJK runs: every overlapping bigram, plus the run itself.
    let mut i = 0;
    while i < chars.len() {
        if is_cjk(chars[i]) {
            let start = i;
            while i < chars.len() && is_cjk(chars[i]) {
                i += 1;
            }
            let run = &chars[start..i];
            if run.len() >= 2 {
                for pair in run.windows(2) {
                    tokens.push(pair.iter().collect());
                }
                tokens.push(run.iter().collect());
            }
        } else {
            i += 1;
        }
    }

    // Alphanumeric runs of length >= 2, lower-cased.
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_alphanumeric() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            if i - start >= 2 {
                tokens.push(chars[start..i].iter().collect::<String>().to_lowercase());
            }
        } else {
            i += 1;
        }
    }

    tokens
}

/// Hiragana, katakana (including the prolonged sound mark), and the CJK
/// unified ideograph block.
fn is_cjk(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}')
}

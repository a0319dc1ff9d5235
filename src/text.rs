//! Text normalisation shared by training and inference.
//!
//! Mathematical operators survive normalisation: `%`, `<`, `*` and friends
//! are difficulty signals. `^` does not.

/// Characters kept besides lowercase ASCII letters, digits and whitespace.
const KEPT_SYMBOLS: &[char] = &['+', '-', '*', '/', '%', '=', '<', '>'];

/// Lower-case `text` and drop everything outside `[a-z0-9\s+\-*/%=<>]`.
///
/// Missing text normalises to the empty string. Whitespace runs are kept as-is.
pub fn clean_text(text: Option<&str>) -> String {
  let Some(text) = text else { return String::new() };
  text
    .to_lowercase()
    .chars()
    .filter(|&c| is_allowed(c))
    .collect()
}

/// True if `c` belongs to the normalised alphabet.
pub fn is_allowed(c: char) -> bool {
  c.is_ascii_lowercase() || c.is_ascii_digit() || is_space(c) || KEPT_SYMBOLS.contains(&c)
}

/// Whitespace as the training data was tokenised: Unicode whitespace plus the
/// ASCII separators `\x1c`..=`\x1f`.
pub fn is_space(c: char) -> bool {
  c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Number of whitespace-delimited words, using [`is_space`].
pub fn word_count(text: &str) -> usize {
  text.split(is_space).filter(|w| !w.is_empty()).count()
}

/// Join the three user-facing fields the way the dashboard always has.
pub fn join_fields(parts: &[&str]) -> String {
  parts.join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_text_is_empty() {
    assert_eq!(clean_text(None), "");
  }

  #[test]
  fn strips_punctuation_and_keeps_operators() {
    let out = clean_text(Some("Given N (1 <= N <= 10^5), print A+B; mod 1e9+7!"));
    assert_eq!(out, "given n 1 <= n <= 105 print a+b mod 1e9+7");
  }

  #[test]
  fn whitespace_runs_are_preserved() {
    assert_eq!(clean_text(Some("A  B\t\nC")), "a  b\t\nc");
  }

  #[test]
  fn output_uses_allowed_alphabet_only() {
    let out = clean_text(Some("Ünïcode — “quotes” & {braces} [x_1] 2^n n²"));
    assert!(out.chars().all(is_allowed), "unexpected char in {out:?}");
  }

  #[test]
  fn idempotent() {
    let samples = [
      "Find the MAX sum; output it.",
      "dp[i][j] = min(dp[i-1][j], dp[i][j-1]) % MOD",
      "  spaced   out  ",
      "",
    ];
    for s in samples {
      let once = clean_text(Some(s));
      assert_eq!(clean_text(Some(&once)), once);
    }
  }

  #[test]
  fn ascii_separators_count_as_whitespace() {
    assert_eq!(clean_text(Some("a\x1fb c\x1cd")), "a\u{1f}b c\u{1c}d");
    assert_eq!(word_count("a\x1fb c\x1cd"), 4);
    assert_eq!(word_count("  two\t words \n"), 2);
    assert_eq!(word_count(""), 0);
  }

  #[test]
  fn joins_with_single_spaces() {
    assert_eq!(join_fields(&["a", "", "c"]), "a  c");
  }
}

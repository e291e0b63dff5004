//! URL slug derivation.
//!
//! When a caller does not supply a slug, one is derived from the display
//! name: lowercase, non-word characters stripped, whitespace runs collapsed
//! to single hyphens. Collisions are not checked here — the storage layer's
//! UNIQUE constraint is the arbiter and rejects the loser as a conflict.

/// Derive a slug from a display name.
///
/// The result may be empty for names made entirely of punctuation; callers
/// that require a non-empty slug validate the name first.
pub fn derive_slug(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_hyphen = false;

  for c in name.trim().chars() {
    if c.is_whitespace() || c == '-' {
      pending_hyphen = !slug.is_empty();
    } else if c.is_alphanumeric() || c == '_' {
      if pending_hyphen {
        slug.push('-');
        pending_hyphen = false;
      }
      slug.extend(c.to_lowercase());
    }
    // Any other character is stripped.
  }

  slug
}

#[cfg(test)]
mod tests {
  use super::derive_slug;

  #[test]
  fn lowercases_and_hyphenates() {
    assert_eq!(derive_slug("Physics Theories"), "physics-theories");
  }

  #[test]
  fn strips_punctuation() {
    assert_eq!(derive_slug("Newton's Laws!"), "newtons-laws");
  }

  #[test]
  fn collapses_whitespace_and_hyphen_runs() {
    assert_eq!(derive_slug("  a   b - c  "), "a-b-c");
    assert_eq!(derive_slug("a --- b"), "a-b");
  }

  #[test]
  fn keeps_underscores_and_digits() {
    assert_eq!(derive_slug("rev_2 Final"), "rev_2-final");
  }

  #[test]
  fn no_leading_or_trailing_hyphen() {
    assert_eq!(derive_slug("-- trimmed --"), "trimmed");
  }

  #[test]
  fn all_punctuation_yields_empty() {
    assert_eq!(derive_slug("!!!"), "");
  }
}

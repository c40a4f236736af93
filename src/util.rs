//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// No nested/conditional logic.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings (char-boundary aware).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

/// Trimmed, non-empty view of an optional string.
pub fn non_blank(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} and {a} then {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x then y");
  }

  #[test]
  fn trunc_respects_char_boundaries() {
    let s = "ÅÅÅÅ";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with("Å…"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }

  #[test]
  fn non_blank_filters_whitespace() {
    assert_eq!(non_blank(Some("  ")), None);
    assert_eq!(non_blank(Some(" Hemoglobin ")), Some("Hemoglobin"));
    assert_eq!(non_blank(None), None);
  }
}

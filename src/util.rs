//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Strip markdown code-fence markers (```` ``` ```` / ```` ```json ````) the model
/// sometimes wraps around its JSON, wherever they appear.
pub fn strip_code_fences(text: &str) -> String {
  text.replace("```json", "").replace("```JSON", "").replace("```", "").trim().to_string()
}

/// Canonical form for comparing typed answers: lowercase, no whitespace.
pub fn normalize_answer(s: &str) -> String {
  s.trim().to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

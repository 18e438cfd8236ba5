use regex::Regex;

/// Strips control characters and collapses whitespace, keeping case.
pub fn sanitize(input: &str) -> String {
    let control = Regex::new(r"[\p{Cc}]").unwrap();
    let s = control.replace_all(input, " ").into_owned();

    let collapse = Regex::new(r"\s+").unwrap();
    collapse.replace_all(s.trim(), " ").into_owned()
}

/// `part / whole` as a percentage, 0 when `whole` is 0, capped at 100.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }

    (part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0)
}

/// Formats a statistic for persisted tables: up to 6 decimals with trailing
/// zeros removed, or an empty string if None or non-finite.
pub fn fmt_stat(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{x:.6}");
            let s = s.trim_end_matches('0').trim_end_matches('.');
            if s == "-0" { "0".to_owned() } else { s.to_owned() }
        }
        _ => String::new(),
    }
}

/// Formats a statistic for fixed-width text blocks (6 decimals, `NaN` if
/// missing).
pub fn fmt_fixed(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.6}"),
        _ => "NaN".to_owned(),
    }
}

/// Replaces characters that cannot appear in a file name component.
pub fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_stat() {
        assert_eq!(fmt_stat(Some(4.0)), "4");
        assert_eq!(fmt_stat(Some(2.5)), "2.5");
        assert_eq!(fmt_stat(Some(1.632_993_161_855_452)), "1.632993");
        assert_eq!(fmt_stat(Some(-0.000_000_1)), "0");
        assert_eq!(fmt_stat(Some(f64::NAN)), "");
        assert_eq!(fmt_stat(None), "");
    }

    #[test]
    fn test_sanitize_file_component() {
        assert_eq!(sanitize_file_component("Cost / Unit"), "Cost _ Unit");
        assert_eq!(sanitize_file_component("a:b\tc"), "a_b_c");
        assert_eq!(sanitize_file_component("Done Unit"), "Done Unit");
    }
}

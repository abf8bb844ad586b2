use std::borrow::Cow;

/// Replaces positional `%N` markers with the matching argument.
///
/// Markers are 1-based and at most two digits (`%1`..`%99`), the convention
/// translators already know from the host toolkit. A marker whose position
/// exceeds the argument list is left verbatim, since translations may drop
/// or reorder markers; a `%` not followed by a digit passes through
/// unchanged. Returns the template borrowed when nothing was replaced.
pub fn substitute<'a>(template: &'a str, args: &[&str]) -> Cow<'a, str> {
    if args.is_empty() || !template.contains('%') {
        return Cow::Borrowed(template);
    }

    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut copied_to = 0;
    let mut replaced = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let digits_start = i + 1;
        let mut digits_end = digits_start;
        while digits_end < bytes.len()
            && digits_end - digits_start < 2
            && bytes[digits_end].is_ascii_digit()
        {
            digits_end += 1;
        }
        if digits_end == digits_start {
            i += 1;
            continue;
        }
        let position: usize = template[digits_start..digits_end].parse().unwrap_or(0);
        if position >= 1 && position <= args.len() {
            out.push_str(&template[copied_to..i]);
            out.push_str(args[position - 1]);
            copied_to = digits_end;
            replaced = true;
        }
        i = digits_end;
    }

    if !replaced {
        return Cow::Borrowed(template);
    }
    out.push_str(&template[copied_to..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_markers_in_order() {
        assert_eq!(substitute("%1 of %2", &["3", "10"]), "3 of 10");
    }

    #[test]
    fn translators_may_reorder_markers() {
        assert_eq!(substitute("%2, dann %1", &["a", "b"]), "b, dann a");
    }

    #[test]
    fn bare_percent_passes_through() {
        assert_eq!(substitute("100%", &[]), "100%");
        assert_eq!(substitute("100% of %1", &["it"]), "100% of it");
    }

    #[test]
    fn out_of_range_marker_is_left_verbatim() {
        assert_eq!(substitute("%3", &["a"]), "%3");
        assert_eq!(substitute("%1 and %2", &["a"]), "a and %2");
    }

    #[test]
    fn marker_free_input_is_returned_borrowed() {
        let result = substitute("no markers here", &["unused"]);
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn two_digit_markers_are_supported() {
        let args: Vec<String> = (1..=12).map(|n| n.to_string()).collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        assert_eq!(substitute("%12|%1", &refs), "12|1");
    }

    #[test]
    fn repeated_marker_is_replaced_each_time() {
        assert_eq!(substitute("%1 + %1", &["x"]), "x + x");
    }
}

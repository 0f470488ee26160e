/// Trims, lowercases, turns underscores and whitespace runs into a single
/// dash, and drops any character outside `[a-z0-9.\-:/]`.
pub(crate) fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for ch in raw.trim().chars() {
        let lower = ch.to_ascii_lowercase();

        match lower {
            'a'..='z' | '0'..='9' | '.' | '-' | ':' | '/' => {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(lower);
            }
            '_' => {
                pending_dash = !out.is_empty();
            }
            c if c.is_whitespace() => {
                pending_dash = !out.is_empty();
            }
            _ => {
                // dropped: outside the allowed character set
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn collapses_whitespace_and_underscores() {
        assert_eq!(slugify("  GPT 4O_Mini!! "), "gpt-4o-mini");
    }

    #[test]
    fn keeps_allowed_punctuation() {
        assert_eq!(slugify("v1.0:beta/test"), "v1.0:beta/test");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }
}

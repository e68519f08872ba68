//! Text normalization shared by every free-text name field

/// Normalize a user-supplied name
///
/// Tabs, newlines and carriage returns are removed, runs of spaces collapse
/// to one space, and the result is trimmed.
pub fn normalize_name(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut previous_space = false;

    for c in raw.chars() {
        match c {
            '\t' | '\n' | '\r' => continue,
            ' ' => {
                if !previous_space {
                    normalized.push(' ');
                }
                previous_space = true;
            }
            _ => {
                normalized.push(c);
                previous_space = false;
            }
        }
    }

    normalized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces() {
        assert_eq!(normalize_name("red  lamp"), "red lamp");
        assert_eq!(normalize_name("red     lamp"), "red lamp");
    }

    #[test]
    fn test_strips_control_whitespace() {
        assert_eq!(normalize_name("red\tlamp"), "redlamp");
        assert_eq!(normalize_name("red\r\nlamp"), "redlamp");
        assert_eq!(normalize_name("red \t lamp"), "red lamp");
    }

    #[test]
    fn test_trims() {
        assert_eq!(normalize_name("  alice  "), "alice");
        assert_eq!(normalize_name("\n alice\t"), "alice");
    }

    #[test]
    fn test_blank_becomes_empty() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name(" \t\r\n "), "");
    }

    #[test]
    fn test_is_idempotent() {
        let once = normalize_name("  Big \t  Old\n  Lamp ");
        assert_eq!(once, "Big Old Lamp");
        assert_eq!(normalize_name(&once), once);
    }
}

/// Placeholder directory browsers put in front of a picked file name.
pub const FAKE_PATH_PREFIX: &str = "C:\\fakepath\\";

const CARD_EXTENSIONS: [&str; 2] = [".vcf", ".vcard"];

/// Drops a leading `C:\fakepath\` (any case) from a picked file path.
pub fn strip_fake_path(raw: &str) -> &str {
    match raw.get(..FAKE_PATH_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(FAKE_PATH_PREFIX) => {
            &raw[FAKE_PATH_PREFIX.len()..]
        }
        _ => raw,
    }
}

/// Extension of `name` including the dot, taken from the last `.`.
pub fn card_extension(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx..])
}

pub fn is_card_file(name: &str) -> bool {
    card_extension(name).is_some_and(|ext| {
        CARD_EXTENSIONS
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_browser_prefix_case_insensitively() {
        assert_eq!(strip_fake_path("C:\\fakepath\\a.vcf"), "a.vcf");
        assert_eq!(strip_fake_path("c:\\FAKEPATH\\a.vcf"), "a.vcf");
        assert_eq!(strip_fake_path("a.vcf"), "a.vcf");
        assert_eq!(strip_fake_path(""), "");
    }

    #[test]
    fn accepts_card_extensions_in_any_case() {
        for name in ["a.vcf", "a.vcard", "A.VCF", "b.VCard", "my.card.vcf"] {
            assert!(is_card_file(name), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for name in ["a.txt", "noext", "", "my.vcf.txt", "a.vcf ", "vcf"] {
            assert!(!is_card_file(name), "{name} should be rejected");
        }
    }

    #[test]
    fn extension_comes_from_last_dot() {
        assert_eq!(card_extension("my.card.vcf"), Some(".vcf"));
        assert_eq!(card_extension("noext"), None);
    }
}

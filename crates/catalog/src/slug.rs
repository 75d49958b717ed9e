/// Derives a stable identifier from a display name.
///
/// Lowercases, folds French accents to ASCII and collapses every run of other
/// characters into a single `-`. `"Faculté d'Économie"` becomes
/// `faculte-d-economie`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        let folded: &str = match ch {
            'à' | 'á' | 'â' | 'ä' | 'ã' => "a",
            'ç' => "c",
            'è' | 'é' | 'ê' | 'ë' => "e",
            'ì' | 'í' | 'î' | 'ï' => "i",
            'ñ' => "n",
            'ò' | 'ó' | 'ô' | 'ö' | 'õ' => "o",
            'ù' | 'ú' | 'û' | 'ü' => "u",
            'ÿ' => "y",
            'œ' => "oe",
            'æ' => "ae",
            c if c.is_ascii_alphanumeric() => {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                pending_dash = false;
                out.push(c);
                continue;
            }
            _ => {
                pending_dash = true;
                continue;
            }
        };
        if pending_dash && !out.is_empty() {
            out.push('-');
        }
        pending_dash = false;
        out.push_str(folded);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn folds_accents_and_separators() {
        assert_eq!(slugify("Faculté des Sciences"), "faculte-des-sciences");
        assert_eq!(slugify("Faculté d'Économie"), "faculte-d-economie");
        assert_eq!(slugify("Résidences Étudiantes"), "residences-etudiantes");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  -- Bloc A2 --  "), "bloc-a2");
        assert_eq!(slugify("***"), "");
    }
}

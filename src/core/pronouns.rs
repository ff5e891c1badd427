//! Built-in pronoun families used when rendering text about a character.

/// One set of pronouns, e.g. she/her.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PronounFamily {
    /// Name users pick the family by
    pub name: &'static str,
    /// "she"
    pub subject: &'static str,
    /// "her"
    pub object: &'static str,
    /// "her" (as in "her tail")
    pub possessive_adjective: &'static str,
    /// "hers"
    pub possessive_pronoun: &'static str,
    /// "herself"
    pub reflexive: &'static str,
    /// Whether verbs agree in the plural ("they are" vs "she is")
    pub plural: bool,
}

/// The family new characters get.
pub const DEFAULT_FAMILY: &str = "Neuter";

/// Every known family.
pub const FAMILIES: &[PronounFamily] = &[
    PronounFamily {
        name: "Feminine",
        subject: "she",
        object: "her",
        possessive_adjective: "her",
        possessive_pronoun: "hers",
        reflexive: "herself",
        plural: false,
    },
    PronounFamily {
        name: "Masculine",
        subject: "he",
        object: "him",
        possessive_adjective: "his",
        possessive_pronoun: "his",
        reflexive: "himself",
        plural: false,
    },
    PronounFamily {
        name: "Neuter",
        subject: "they",
        object: "them",
        possessive_adjective: "their",
        possessive_pronoun: "theirs",
        reflexive: "themselves",
        plural: true,
    },
    PronounFamily {
        name: "Inanimate",
        subject: "it",
        object: "it",
        possessive_adjective: "its",
        possessive_pronoun: "its",
        reflexive: "itself",
        plural: false,
    },
    PronounFamily {
        name: "Zie and Zir",
        subject: "zie",
        object: "zir",
        possessive_adjective: "zir",
        possessive_pronoun: "zirs",
        reflexive: "zirself",
        plural: false,
    },
];

/// Looks a family up by name, ignoring case and surrounding whitespace.
#[must_use]
pub fn find_family(name: &str) -> Option<&'static PronounFamily> {
    let name = name.trim();
    FAMILIES
        .iter()
        .find(|family| family.name.eq_ignore_ascii_case(name))
}

/// Like [`find_family`], falling back to [`DEFAULT_FAMILY`] for unknown names.
#[must_use]
pub fn family_or_default(name: &str) -> &'static PronounFamily {
    find_family(name)
        .or_else(|| find_family(DEFAULT_FAMILY))
        .unwrap_or(&FAMILIES[0])
}

impl PronounFamily {
    /// Resolves a form named after the neuter pronoun or a verb.
    ///
    /// Forms: `they`, `them`, `their`, `theirs`, `themselves`, `are`, `have`, `were`.
    #[must_use]
    pub fn form(&self, form: &str) -> Option<&'static str> {
        let resolved = match form.trim().to_lowercase().as_str() {
            "they" | "subject" => self.subject,
            "them" | "object" => self.object,
            "their" => self.possessive_adjective,
            "theirs" => self.possessive_pronoun,
            "themselves" | "themself" => self.reflexive,
            "are" | "is" => self.verb("are", "is"),
            "have" | "has" => self.verb("have", "has"),
            "were" | "was" => self.verb("were", "was"),
            _ => return None,
        };
        Some(resolved)
    }

    const fn verb(&self, plural: &'static str, singular: &'static str) -> &'static str {
        if self.plural { plural } else { singular }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_find_family_is_case_insensitive() {
        assert_eq!(find_family("feminine").unwrap().subject, "she");
        assert_eq!(find_family(" ZIE AND ZIR ").unwrap().reflexive, "zirself");
        assert!(find_family("unknown").is_none());
    }

    #[test]
    fn test_forms_and_verb_agreement() {
        let masculine = find_family("Masculine").unwrap();
        assert_eq!(masculine.form("their"), Some("his"));
        assert_eq!(masculine.form("are"), Some("is"));
        assert_eq!(masculine.form("have"), Some("has"));

        let neuter = find_family("Neuter").unwrap();
        assert_eq!(neuter.form("are"), Some("are"));
        assert_eq!(neuter.form("themselves"), Some("themselves"));
        assert_eq!(neuter.form("whatever"), None);
    }

    #[test]
    fn test_family_or_default() {
        assert_eq!(family_or_default("nonsense").name, DEFAULT_FAMILY);
        assert_eq!(family_or_default("Inanimate").subject, "it");
    }
}

//! Token replacement for transformation messages and descriptions.
//!
//! Templates embed tokens of the form `{@name}` or `{@name|data}`:
//!
//! | Token | Replaced with |
//! |-------|---------------|
//! | `{@target}` | the character's name |
//! | `{@f\|their}` | a pronoun or verb form, see [`PronounFamily::form`] |
//! | `{@side}` | `left`, `right` or `both` |
//! | `{@bodypart}` | the body part noun |
//! | `{@colour}` | the base colour |
//! | `{@pattern}` / `{@pattern_colour}` | the pattern and its colour |
//! | `{@species}` | the species name |
//!
//! Tokens that cannot be resolved are left in place so broken templates are visible
//! instead of silently producing half a sentence.

use super::pronouns::PronounFamily;
use tracing::debug;

const TOKEN_OPEN: &str = "{@";
const TOKEN_CLOSE: char = '}';

/// Values available to a template.
#[derive(Debug, Clone, Copy)]
pub struct TokenContext<'a> {
    /// Character name
    pub target: &'a str,
    /// Character pronouns
    pub pronouns: &'a PronounFamily,
    /// Side being described
    pub side: Option<&'a str>,
    /// Body part noun
    pub bodypart: Option<&'a str>,
    /// Base colour
    pub colour: Option<&'a str>,
    /// Pattern name
    pub pattern: Option<&'a str>,
    /// Pattern colour
    pub pattern_colour: Option<&'a str>,
    /// Species name
    pub species: Option<&'a str>,
}

impl<'a> TokenContext<'a> {
    /// A context with only the character filled in.
    #[must_use]
    pub const fn new(target: &'a str, pronouns: &'a PronounFamily) -> Self {
        Self {
            target,
            pronouns,
            side: None,
            bodypart: None,
            colour: None,
            pattern: None,
            pattern_colour: None,
            species: None,
        }
    }

    fn resolve(&self, name: &str, data: Option<&str>) -> Option<String> {
        let value = match name {
            "target" => Some(self.target),
            "f" => data.and_then(|form| self.pronouns.form(form)),
            "side" => self.side,
            "bodypart" => self.bodypart,
            "colour" | "color" => self.colour,
            "pattern" => self.pattern,
            "pattern_colour" | "pattern_color" => self.pattern_colour,
            "species" => self.species,
            _ => None,
        };
        value.map(str::to_string)
    }
}

/// Renders a template, replacing every resolvable token and capitalising sentences.
///
/// Sentences are detected in the template text only. A substituted value is
/// capitalised when it opens a sentence, but punctuation inside it (a name like
/// "Dr. pepper") never starts a new one.
#[must_use]
pub fn render(template: &str, context: &TokenContext<'_>) -> String {
    let mut output = Sentences::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(TOKEN_OPEN) {
        output.push_template(&rest[..start]);
        let after_open = &rest[start + TOKEN_OPEN.len()..];

        let Some(end) = after_open.find(TOKEN_CLOSE) else {
            // Unterminated token: keep the remainder verbatim
            output.push_template(&rest[start..]);
            rest = "";
            break;
        };

        let token = &after_open[..end];
        let (name, data) = match token.split_once('|') {
            Some((name, data)) => (name.trim(), Some(data.trim())),
            None => (token.trim(), None),
        };

        if let Some(value) = context.resolve(name, data) {
            output.push_value(&value);
        } else {
            debug!(token, "Unresolved template token");
            output.push_template(&rest[start..start + TOKEN_OPEN.len() + end + 1]);
        }

        rest = &after_open[end + 1..];
    }
    output.push_template(rest);

    output.text
}

/// Output buffer that upper-cases the first letter of every sentence.
struct Sentences {
    text: String,
    at_sentence_start: bool,
}

impl Sentences {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            at_sentence_start: true,
        }
    }

    /// Template text: `.`, `!` and `?` end a sentence.
    fn push_template(&mut self, template: &str) {
        for c in template.chars() {
            if self.at_sentence_start && c.is_alphabetic() {
                self.text.extend(c.to_uppercase());
                self.at_sentence_start = false;
                continue;
            }
            if matches!(c, '.' | '!' | '?') {
                self.at_sentence_start = true;
            } else if !c.is_whitespace() && !matches!(c, '"' | '\'' | '*' | '_') {
                self.at_sentence_start = false;
            }
            self.text.push(c);
        }
    }

    /// Substituted text: may open a sentence, never ends one.
    fn push_value(&mut self, value: &str) {
        if !self.at_sentence_start {
            self.text.push_str(value);
            return;
        }
        match value.char_indices().find(|(_, c)| c.is_alphabetic()) {
            Some((index, first)) => {
                self.text.push_str(&value[..index]);
                self.text.extend(first.to_uppercase());
                self.text.push_str(&value[index + first.len_utf8()..]);
                self.at_sentence_start = false;
            }
            None => {
                self.text.push_str(value);
                if !value.trim().is_empty() {
                    self.at_sentence_start = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::pronouns::find_family;

    fn context() -> TokenContext<'static> {
        let mut context = TokenContext::new("Amby", find_family("Feminine").unwrap());
        context.side = Some("left");
        context.bodypart = Some("ear");
        context.colour = Some("grey");
        context.species = Some("wolf");
        context
    }

    #[test]
    fn test_render_replaces_tokens() {
        let rendered = render(
            "{@target}'s {@side} {@bodypart} becomes a {@colour} {@species} {@bodypart}.",
            &context(),
        );
        assert_eq!(rendered, "Amby's left ear becomes a grey wolf ear.");
    }

    #[test]
    fn test_render_resolves_pronouns_and_capitalises() {
        let rendered = render("{@f|they} {@f|have} a tail. {@f|their} ears twitch.", &context());
        assert_eq!(rendered, "She has a tail. Her ears twitch.");
    }

    #[test]
    fn test_unknown_tokens_are_kept() {
        let rendered = render("A {@sparkle} tail and {@f|bogus}.", &context());
        assert_eq!(rendered, "A {@sparkle} tail and {@f|bogus}.");

        // Tokens without a value in this context are kept too
        let bare = TokenContext::new("Amby", find_family("Neuter").unwrap());
        assert_eq!(render("{@pattern}", &bare), "{@pattern}");
    }

    #[test]
    fn test_unterminated_token_is_left_alone() {
        let rendered = render("{@target} waves {@f|their", &context());
        assert_eq!(rendered, "Amby waves {@f|their");
    }

    #[test]
    fn test_punctuation_in_values_does_not_start_sentences() {
        let mut context = context();
        context.colour = Some("dr. pepper");
        context.target = "mx. amby";

        let rendered = render("{@target}'s {@bodypart} turns {@colour}. wow.", &context);
        assert_eq!(rendered, "Mx. amby's ear turns dr. pepper. Wow.");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(render("no tokens {here}", &context()), "No tokens {here}");
        assert_eq!(render("", &context()), "");
    }
}

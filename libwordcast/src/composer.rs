//! Post formatting

use crate::config::PostConfig;
use crate::types::WordTriple;

/// Formats a word triple into the text of a post
#[derive(Debug, Clone)]
pub struct PostComposer {
    template: String,
    hashtags: String,
}

impl Default for PostComposer {
    fn default() -> Self {
        Self::from_config(&PostConfig::default())
    }
}

impl PostComposer {
    pub fn new(template: impl Into<String>, hashtags: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            hashtags: hashtags.into(),
        }
    }

    pub fn from_config(config: &PostConfig) -> Self {
        Self::new(config.template.clone(), config.hashtags.clone())
    }

    /// Fill the template and append the hashtags after a blank line
    ///
    /// Values are substituted in a single pass, so placeholder-looking text
    /// inside a value is left alone.
    pub fn compose(&self, word: &str, meaning: &str, example: &str) -> String {
        let mut body = String::with_capacity(self.template.len() + word.len() + meaning.len() + example.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            body.push_str(&rest[..start]);
            let tail = &rest[start..];
            let (value, len) = if tail.starts_with("{word}") {
                (word, "{word}".len())
            } else if tail.starts_with("{meaning}") {
                (meaning, "{meaning}".len())
            } else if tail.starts_with("{example}") {
                (example, "{example}".len())
            } else {
                ("{", 1)
            };
            body.push_str(value);
            rest = &tail[len..];
        }
        body.push_str(rest);

        if self.hashtags.is_empty() {
            body
        } else {
            format!("{}\n\n{}", body, self.hashtags)
        }
    }

    pub fn compose_triple(&self, triple: &WordTriple) -> String {
        self.compose(&triple.word, &triple.meaning, &triple.example)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let composer = PostComposer::default();
        let text = composer.compose("Luminous", "full of light", "The luminous moon lit the path.");
        assert_eq!(
            text,
            "Word of the day: Luminous\n\n\
             Meaning: full of light\n\n\
             Example: The luminous moon lit the path.\n\n\
             #vocabulary #spellbee"
        );
    }

    #[test]
    fn test_compose_is_deterministic() {
        let composer = PostComposer::default();
        let first = composer.compose("Placid", "calm", "The lake was placid.");
        let second = composer.compose("Placid", "calm", "The lake was placid.");
        assert_eq!(first, second);
        assert!(first.contains("Placid"));
        assert!(first.contains("calm"));
        assert!(first.contains("The lake was placid."));
        assert!(first.ends_with("#vocabulary #spellbee"));
    }

    #[test]
    fn test_custom_template() {
        let composer = PostComposer::new("{word} ({meaning}): {example}", "#words");
        assert_eq!(composer.compose("a", "b", "c"), "a (b): c\n\n#words");
    }

    #[test]
    fn test_placeholder_text_in_values_is_not_expanded() {
        let composer = PostComposer::new("{word} / {meaning}", "");
        assert_eq!(composer.compose("{meaning}", "x", "y"), "{meaning} / x");
    }

    #[test]
    fn test_unknown_braces_are_kept() {
        let composer = PostComposer::new("{word} {other} {", "");
        assert_eq!(composer.compose("w", "m", "e"), "w {other} {");
    }

    #[test]
    fn test_compose_triple() {
        let composer = PostComposer::default();
        let triple = WordTriple::new("Zephyr", "a gentle breeze", "A zephyr stirred the leaves.");
        assert_eq!(
            composer.compose_triple(&triple),
            composer.compose("Zephyr", "a gentle breeze", "A zephyr stirred the leaves.")
        );
    }
}

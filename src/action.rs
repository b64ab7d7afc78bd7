//! The fixed set of enhancement actions.
//!
//! Each action carries a human-readable label (sent to the endpoint as the
//! `action` field) and an instruction prompt (sent as `prompt`).

use clap::ValueEnum;
use std::fmt;

/// One of the three canned enhancement operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Action {
    /// Fix grammatical errors and improve clarity.
    FixGrammar,
    /// Make the tone more professional and polished.
    AdjustTone,
    /// Add detail, examples and context.
    Expand,
}

impl Action {
    /// All actions, in display order.
    pub const ALL: [Action; 3] = [Action::FixGrammar, Action::AdjustTone, Action::Expand];

    /// Label shown on the control and sent to the endpoint.
    pub fn label(self) -> &'static str {
        match self {
            Action::FixGrammar => "Fix Grammar",
            Action::AdjustTone => "Adjust Tone",
            Action::Expand => "Expand",
        }
    }

    /// Instruction prompt sent alongside the text.
    pub fn prompt(self) -> &'static str {
        match self {
            Action::FixGrammar => {
                "Fix any grammatical errors in the following text and improve clarity while maintaining the original meaning:"
            }
            Action::AdjustTone => {
                "Adjust the tone of the following text to be more professional and polished while keeping the core message:"
            }
            Action::Expand => {
                "Expand the following text with more detail, examples, and context while maintaining the original intent:"
            }
        }
    }

    /// Ctrl+<key> binding in the TUI.
    pub fn hotkey(self) -> char {
        match self {
            Action::FixGrammar => 'g',
            Action::AdjustTone => 't',
            Action::Expand => 'e',
        }
    }

    /// Look up the action bound to a Ctrl+<key> chord.
    pub fn from_hotkey(key: char) -> Option<Action> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.hotkey() == key)
    }

    /// Result shown when the endpoint answered but carried no enhanced text.
    pub fn placeholder(self, original: &str) -> String {
        format!(
            "Enhanced text for \"{}\" would appear here. Original: {}",
            self.label(),
            original
        )
    }

    /// Result shown when the request failed outright.
    pub fn fallback(self, original: &str) -> String {
        format!(
            "Demo: {} enhancement of your text would appear here. Original text: \"{}\"",
            self.label(),
            original
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(Action::FixGrammar.label(), "Fix Grammar");
        assert_eq!(Action::AdjustTone.label(), "Adjust Tone");
        assert_eq!(Action::Expand.label(), "Expand");
    }

    #[test]
    fn test_prompts_are_distinct() {
        let prompts: Vec<_> = Action::ALL.iter().map(|a| a.prompt()).collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert!(prompts.iter().all(|p| p.ends_with(':')));
    }

    #[test]
    fn test_hotkeys() {
        assert_eq!(Action::from_hotkey('g'), Some(Action::FixGrammar));
        assert_eq!(Action::from_hotkey('T'), Some(Action::AdjustTone));
        assert_eq!(Action::from_hotkey('e'), Some(Action::Expand));
        assert_eq!(Action::from_hotkey('x'), None);
    }

    #[test]
    fn test_fallback_embeds_label_and_text() {
        let text = Action::Expand.fallback("ok");
        assert_eq!(
            text,
            "Demo: Expand enhancement of your text would appear here. Original text: \"ok\""
        );
    }

    #[test]
    fn test_placeholder_embeds_label_and_text() {
        let text = Action::FixGrammar.placeholder("I has a apple.");
        assert!(text.contains("\"Fix Grammar\""));
        assert!(text.ends_with("Original: I has a apple."));
    }

    #[test]
    fn test_value_enum_names() {
        let parsed = Action::from_str("adjust-tone", false).unwrap();
        assert_eq!(parsed, Action::AdjustTone);
    }
}

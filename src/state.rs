//! Per-chat dictionary choice.
//!
//! Kept in process memory only; a restart simply drops every chat back to
//! the catalog default. Lookups themselves stay stateless.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::catalog::Dictionary;

#[derive(Default)]
pub struct ChatPreferences {
    chosen: RwLock<HashMap<i64, Dictionary>>,
}

impl ChatPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dictionary to use for a chat, falling back to the catalog
    /// default when the chat never picked one.
    pub fn dictionary_for(&self, chat_id: i64) -> Dictionary {
        self.chosen
            .read()
            .ok()
            .and_then(|map| map.get(&chat_id).copied())
            .unwrap_or_else(Dictionary::default)
    }

    /// Remember the dictionary chosen in a chat.
    pub fn set_dictionary(&self, chat_id: i64, dict: Dictionary) {
        if let Ok(mut map) = self.chosen.write() {
            map.insert(chat_id, dict);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_chat_gets_default() {
        let prefs = ChatPreferences::new();

        assert_eq!(prefs.dictionary_for(42), Dictionary::default());
    }

    #[test]
    fn test_choice_is_remembered_per_chat() {
        let prefs = ChatPreferences::new();
        let ru = Dictionary::from_code("RU-SK").unwrap();

        prefs.set_dictionary(1, ru);

        assert_eq!(prefs.dictionary_for(1), ru);
        assert_eq!(prefs.dictionary_for(2), Dictionary::default());
    }

    #[test]
    fn test_choice_can_be_changed() {
        let prefs = ChatPreferences::new();
        let ru = Dictionary::from_code("RU-SK").unwrap();
        let ua = Dictionary::from_code("UA-SK").unwrap();

        prefs.set_dictionary(7, ru);
        prefs.set_dictionary(7, ua);

        assert_eq!(prefs.dictionary_for(7), ua);
    }
}

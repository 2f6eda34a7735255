//! Greeting tables and the matcher for greeting messages.

/// Greetings in many languages.
pub const GREETINGS: [&str; 34] = [
    "Hello there",
    "Hey there",
    "Hi",
    "Good day",
    "Greetings",
    "What's up",
    "Howdy",
    "नमस्ते",
    "नमस्कार",
    "आदाब",
    "राम राम",
    "जय हिंद",
    "Hola",
    "Bonjour",
    "Guten Tag",
    "Ciao",
    "Olá",
    "Hej",
    "Hallo",
    "Привет",
    "こんにちは",
    "안녕하세요",
    "你好",
    "مرحبا",
    "Salaam",
    "Sawubona",
    "Jambo",
    "Shalom",
    "Γεια σας",
    "สวัสดี",
    "Xin chào",
    "Zdravo",
    "Halo",
    "Kumusta",
];

/// Replies to a bare mention.
pub const HELP_MESSAGES: [&str; 10] = [
    "How can I help you today?",
    "What can I do for you?",
    "Need assistance with something?",
    "How may I assist you?",
    "What would you like to know?",
    "आज मैं आपकी कैसे मदद कर सकता हूँ?",
    "मैं आपके लिए क्या कर सकता हूँ?",
    "क्या आपको किसी चीज़ में सहायता चाहिए?",
    "मैं आपकी कैसे सेवा कर सकता हूँ?",
    "आप क्या जानना चाहते हैं?",
];

/// Whole messages that get a greeting back.
pub const GREETING_WORDS: [&str; 7] = ["hi", "hello", "hey", "hola", "bonjour", "hallo", "ciao"];

/// Discord's message length limit.
const MESSAGE_LIMIT: usize = 2000;

/// Chunk size used when the greeting list has to be split.
const CHUNK_LIMIT: usize = 1900;

const LIST_HEADER: &str = "Here are all the greetings I know:\n";

/// How the bot answers a plain chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// The bot was mentioned and nothing else was said.
    Help,
    /// The message was a greeting word.
    Greet,
}

/// Decides whether a message deserves a reply.
pub fn reaction(content: &str, bot_id: u64, mentions_bot: bool) -> Option<Reaction> {
    if mentions_bot {
        let rest = content
            .replace(&format!("<@{bot_id}>"), "")
            .replace(&format!("<@!{bot_id}>"), "");
        if rest.trim().is_empty() {
            return Some(Reaction::Help);
        }
    }

    let word = content.trim().to_lowercase();
    GREETING_WORDS
        .contains(&word.as_str())
        .then_some(Reaction::Greet)
}

/// The full greeting list, split into messages Discord will accept.
pub fn greeting_chunks() -> Vec<String> {
    chunk_lines(LIST_HEADER, &GREETINGS)
}

fn chunk_lines(header: &str, lines: &[&str]) -> Vec<String> {
    let whole = format!("{header}{}", lines.join("\n"));
    if whole.chars().count() <= MESSAGE_LIMIT {
        return vec![whole];
    }

    let mut chunks = Vec::new();
    let mut current = header.to_string();
    for line in lines {
        let next_len = current.chars().count() + line.chars().count() + 1;
        if next_len > CHUNK_LIMIT && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod test {
    use super::*;

    const BOT: u64 = 1234;

    #[test]
    fn bare_mention_asks_for_help() {
        assert_eq!(reaction("<@1234>", BOT, true), Some(Reaction::Help));
        assert_eq!(reaction("  <@!1234>  ", BOT, true), Some(Reaction::Help));
        assert_eq!(reaction("<@1234> roll me a d20", BOT, true), None);
    }

    #[test]
    fn greeting_words_must_be_the_whole_message() {
        assert_eq!(reaction("Hello", BOT, false), Some(Reaction::Greet));
        assert_eq!(reaction("  BONJOUR ", BOT, false), Some(Reaction::Greet));
        assert_eq!(reaction("hello everyone", BOT, false), None);
        assert_eq!(reaction("howdy", BOT, false), None);
    }

    #[test]
    fn short_list_is_one_message() {
        let chunks = greeting_chunks();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("Here are all the greetings I know:\n"));
        assert!(chunks[0].contains("Kumusta"));
    }

    #[test]
    fn long_list_is_split_on_lines() {
        let line = "x".repeat(100);
        let lines: Vec<&str> = std::iter::repeat(line.as_str()).take(40).collect();
        let chunks = chunk_lines(LIST_HEADER, &lines);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= CHUNK_LIMIT));
        let total: usize = chunks.iter().map(|c| c.matches(&line).count()).sum();
        assert_eq!(total, 40);
    }
}

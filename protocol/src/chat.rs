use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A server description. Servers send either a bare JSON string or a chat
/// component; components are flattened into their plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    text: String,
}

impl Message {
    pub fn new<S: Into<String>>(text: S) -> Message {
        Message { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Component {
    Plain(String),
    Styled {
        #[serde(default)]
        text: String,
        #[serde(default)]
        extra: Vec<Component>,
    },
}

impl Component {
    fn flatten_into(self, out: &mut String) {
        match self {
            Component::Plain(text) => out.push_str(&text),
            Component::Styled { text, extra } => {
                out.push_str(&text);
                for component in extra {
                    component.flatten_into(out);
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Message, D::Error> {
        let mut text = String::new();
        Component::deserialize(deserializer)?.flatten_into(&mut text);
        Ok(Message { text })
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_string() {
        let message: Message = serde_json::from_str(r#""A Minecraft Server""#).unwrap();
        assert_eq!(message.text(), "A Minecraft Server");
    }

    #[test]
    fn component_with_extra() {
        let message: Message = serde_json::from_str(
            r#"{"text":"Hello ","extra":[{"text":"big ","bold":true},"world",{"extra":[{"text":"!"}]}]}"#,
        )
        .unwrap();
        assert_eq!(message.text(), "Hello big world!");
    }

    #[test]
    fn serializes_as_plain_text() {
        let json = serde_json::to_string(&Message::new("motd")).unwrap();
        assert_eq!(json, r#""motd""#);
    }
}

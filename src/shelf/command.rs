use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// One shelved shell command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfCommand {
    /// Shell text; base64 on disk
    #[serde(with = "encoded")]
    pub command: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ShelfCommand {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

pub fn encode(command: &str) -> String {
    STANDARD.encode(command.as_bytes())
}

pub fn decode(encoded: &str) -> Result<String, DecodeError> {
    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("command is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("command is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

mod encoded {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(command: &str, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(command))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::decode(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_command_is_encoded_on_disk() {
        let cmd = ShelfCommand::new("greet", "echo 'hi there' | tr a-z A-Z");
        let json = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["command"], "ZWNobyAnaGkgdGhlcmUnIHwgdHIgYS16IEEtWg==");
        assert!(json.get("description").is_none());
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_decodes_when_loading() {
        let json = r#"{"command":"bHMgLWxh","name":"list","tags":["fs"]}"#;
        let cmd: ShelfCommand = serde_json::from_str(json).unwrap();

        assert_eq!(cmd.command, "ls -la");
        assert_eq!(cmd.tags, vec!["fs"]);
        assert_eq!(cmd.description, "");
    }

    #[test]
    fn test_rejects_garbage() {
        let json = r#"{"command":"%%%","name":"bad"}"#;
        assert!(serde_json::from_str::<ShelfCommand>(json).is_err());
        assert!(decode("!!").is_err());
    }
}

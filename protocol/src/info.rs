use serde::{Deserialize, Serialize};

use crate::chat::Message;

/// Status document returned by the server list ping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingStatus {
    #[serde(default)]
    pub description: Message,
    #[serde(default)]
    pub players: PlayerInfo,
    pub version: VersionInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub max: i32,
    pub online: i32,
}

impl PlayerInfo {
    pub fn simple(online: i32, max: i32) -> PlayerInfo {
        PlayerInfo { online, max }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub protocol: i32,
}

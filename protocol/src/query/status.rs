use serde::{Deserialize, Serialize};

/// Everything a full-stat response reports. Fields the server left out keep
/// their default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStatus {
    pub server: ServerInfo,
    pub game: GameInfo,
    pub players: Vec<String>,
    pub plugins: Vec<Plugin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub host: HostInfo,
    pub version: ServerVersion,
    #[serde(rename = "player")]
    pub player_info: QueryPlayerInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostInfo {
    pub name: String,
    pub port: u16,
    pub ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlayerInfo {
    pub max: i32,
    pub online: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub map: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    pub version: String,
}

impl Plugin {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, version: V) -> Plugin {
        Plugin {
            name: name.into(),
            version: version.into(),
        }
    }
}

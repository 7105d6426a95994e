use serde::{Deserialize, Serialize};
use shardbench_core::ShardId;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// network endpoint of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    pub ip: String,
    pub port: u16,
}

impl Peer {
    pub fn new<I: Into<String>>(ip: I, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Leader,
    Validator,
    Client,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub ip: String,
    pub port: u16,
    pub role: Role,
    #[serde(default)]
    pub shard_id: Option<ShardId>,
}

impl NodeConfig {
    fn peer(&self) -> Peer {
        Peer::new(self.ip.clone(), self.port)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Leader {peer} has no shard_id")]
    LeaderWithoutShard { peer: Peer },

    #[error("No leader in the configuration")]
    NoLeader,
}

/// the nodes of the benchmark network
///
/// ```yaml
/// nodes:
///   - { ip: 127.0.0.1, port: 9000, role: leader, shard_id: 0 }
///   - { ip: 127.0.0.1, port: 9010, role: validator, shard_id: 0 }
///   - { ip: 127.0.0.1, port: 9999, role: client }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    pub nodes: Vec<NodeConfig>,
}

impl NetworkConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_reader(file)?;
        config.validate()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let mut has_leader = false;
        for node in self.nodes.iter().filter(|node| node.role == Role::Leader) {
            if node.shard_id.is_none() {
                return Err(ConfigError::LeaderWithoutShard { peer: node.peer() });
            }
            has_leader = true;
        }

        if has_leader {
            Ok(self)
        } else {
            Err(ConfigError::NoLeader)
        }
    }

    /// the shard leaders and their shard, index aligned, in file order
    pub fn leaders_and_shard_ids(&self) -> (Vec<Peer>, Vec<ShardId>) {
        self.nodes
            .iter()
            .filter(|node| node.role == Role::Leader)
            .filter_map(|node| node.shard_id.map(|shard_id| (node.peer(), shard_id)))
            .unzip()
    }

    pub fn validators(&self) -> Vec<Peer> {
        self.nodes
            .iter()
            .filter(|node| node.role == Role::Validator)
            .map(NodeConfig::peer)
            .collect()
    }

    /// port the generator listens on for blocks and proofs, if any
    pub fn client_port(&self) -> Option<u16> {
        self.nodes
            .iter()
            .find(|node| node.role == Role::Client)
            .map(|node| node.port)
    }
}

//! Known Stellar networks and their endpoints.

use std::fmt;
use std::str::FromStr;

use crate::RpcError;

/// A named Stellar network a replay can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Testnet,
    Mainnet,
    Futurenet,
}

impl Network {
    /// All known networks, in display order.
    pub const ALL: [Network; 3] = [Network::Testnet, Network::Mainnet, Network::Futurenet];

    /// The network passphrase used when hashing transactions.
    pub fn passphrase(self) -> &'static str {
        match self {
            Network::Testnet => "Test SDF Network ; September 2015",
            Network::Mainnet => "Public Global Stellar Network ; September 2015",
            Network::Futurenet => "Test SDF Future Network ; October 2022",
        }
    }

    /// The default Horizon endpoint for this network.
    pub fn horizon_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://horizon-testnet.stellar.org/",
            Network::Mainnet => "https://horizon.stellar.org/",
            Network::Futurenet => "https://horizon-futurenet.stellar.org/",
        }
    }

    /// The default Soroban RPC endpoint for this network.
    pub fn soroban_rpc_url(self) -> &'static str {
        match self {
            Network::Testnet => "https://soroban-testnet.stellar.org",
            Network::Mainnet => "https://mainnet.sorobanrpc.com",
            Network::Futurenet => "https://rpc-futurenet.stellar.org",
        }
    }

    /// The default endpoint configuration for this network.
    pub fn config(self) -> NetworkConfig {
        NetworkConfig {
            network: self,
            horizon_url: self.horizon_url().to_string(),
            soroban_rpc_url: self.soroban_rpc_url().to_string(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Futurenet => "futurenet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" | "public" => Ok(Network::Mainnet),
            "futurenet" => Ok(Network::Futurenet),
            other => Err(RpcError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Endpoint configuration for one network.
///
/// Defaults come from [`Network::config`]; individual endpoints can be
/// overridden for private deployments or local test servers.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// The network these endpoints serve.
    pub network: Network,
    /// Horizon base URL.
    pub horizon_url: String,
    /// Soroban RPC URL.
    pub soroban_rpc_url: String,
}

impl NetworkConfig {
    /// Replace the Horizon endpoint.
    pub fn with_horizon_url(mut self, url: impl Into<String>) -> Self {
        self.horizon_url = url.into();
        self
    }

    /// Replace the Soroban RPC endpoint.
    pub fn with_soroban_rpc_url(mut self, url: impl Into<String>) -> Self {
        self.soroban_rpc_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_networks() {
        assert_eq!("testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("MAINNET".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("public".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("futurenet".parse::<Network>().unwrap(), Network::Futurenet);
    }

    #[test]
    fn rejects_unknown_network() {
        assert!(matches!(
            "devnet".parse::<Network>(),
            Err(RpcError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        for network in Network::ALL {
            assert_eq!(network.to_string().parse::<Network>().unwrap(), network);
        }
    }

    #[test]
    fn config_overrides() {
        let config = Network::Testnet
            .config()
            .with_horizon_url("http://localhost:8000/");
        assert_eq!(config.horizon_url, "http://localhost:8000/");
        assert_eq!(config.soroban_rpc_url, Network::Testnet.soroban_rpc_url());
    }
}

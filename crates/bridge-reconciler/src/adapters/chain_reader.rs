//! Chain Reader Adapter
//!
//! Implements the `ChainReader` port with fixed answers, for replays of
//! recorded event streams and for tests.

use crate::domain::{Address, Bytes32, ChainId, ReconcilerError, RoleId};
use crate::ports::outbound::ChainReader;
use async_trait::async_trait;
use sha3::{Digest, Keccak256};
use tracing::debug;

/// Role id the bridge contract uses for relayers: `keccak256("RELAYER_ROLE")`.
pub fn default_relayer_role() -> RoleId {
    let digest = Keccak256::digest(b"RELAYER_ROLE");
    let mut role = [0u8; 32];
    role.copy_from_slice(&digest);
    Bytes32(role)
}

/// Chain reader returning preconfigured values.
#[derive(Clone, Debug)]
pub struct StaticChainReader {
    chain_id: ChainId,
    relayer_role: RoleId,
    /// Fail every read with `UpstreamReadFailure`.
    pub should_fail: bool,
}

impl StaticChainReader {
    /// Reader for a chain using the standard relayer role.
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            relayer_role: default_relayer_role(),
            should_fail: false,
        }
    }

    /// Override the reported relayer role.
    pub fn with_relayer_role(mut self, relayer_role: RoleId) -> Self {
        self.relayer_role = relayer_role;
        self
    }

    fn check(&self) -> Result<(), ReconcilerError> {
        if self.should_fail {
            return Err(ReconcilerError::UpstreamReadFailure(
                "chain reader unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for StaticChainReader {
    async fn chain_id(&self, contract: &Address) -> Result<ChainId, ReconcilerError> {
        self.check()?;
        debug!("[bridge] chain_id({}) -> {}", contract, self.chain_id);
        Ok(self.chain_id)
    }

    async fn relayer_role(&self, contract: &Address) -> Result<RoleId, ReconcilerError> {
        self.check()?;
        debug!("[bridge] relayer_role({}) -> {}", contract, self.relayer_role);
        Ok(self.relayer_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_relayer_role() {
        assert_eq!(
            default_relayer_role().to_hex(),
            "0xe2b7fb3b832174769106daebcfd6d1970523240dda11281102db9363b83b0dc4"
        );
    }

    #[tokio::test]
    async fn test_static_reader_answers() {
        let reader = StaticChainReader::new(ChainId(2)).with_relayer_role(Bytes32([1; 32]));
        assert_eq!(reader.chain_id(&Address::ZERO).await.unwrap(), ChainId(2));
        assert_eq!(
            reader.relayer_role(&Address::ZERO).await.unwrap(),
            Bytes32([1; 32])
        );
    }

    #[tokio::test]
    async fn test_failing_reader() {
        let mut reader = StaticChainReader::new(ChainId(2));
        reader.should_fail = true;
        let err = reader.chain_id(&Address::ZERO).await.unwrap_err();
        assert!(matches!(err, ReconcilerError::UpstreamReadFailure(_)));
    }
}

//! # Domain Value Objects
//!
//! Immutable value types: chain identifiers, addresses, 32-byte identifiers,
//! composite entity keys and the proposal status enumeration.
//!
//! ## Identifier Formats
//!
//! Composite keys render to the exact strings used by existing stored data:
//!
//! | Key | Format |
//! |-----|--------|
//! | `DepositKey` | `{origin}->{destination}-{nonce}` |
//! | `DirectionKey` | `{origin}->{destination}` |
//! | `VoteKey` | `{origin}->{destination}-{nonce}-{voter}` |
//! | `Address` | lowercase `0x`-prefixed hex |

use super::errors::ReconcilerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Block height.
pub type BlockNumber = u64;

/// Per-direction deposit sequence number.
pub type DepositNonce = u64;

/// Numeric bridge chain identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u8);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for ChainId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Error parsing a hex-encoded value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexParseError {
    /// Not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded to the wrong number of bytes.
    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        got: usize,
    },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], HexParseError> {
    let raw = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(raw).map_err(|e| HexParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(HexParseError::InvalidLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// 20-byte account address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Lowercase `0x`-prefixed hex form. This is the Relayer id.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Address {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s).map(Self)
    }
}

impl TryFrom<String> for Address {
    type Error = HexParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_hex()
    }
}

/// 32-byte identifier (resource ids, data hashes, role ids).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    /// Lowercase `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Bytes32 {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s).map(Self)
    }
}

impl TryFrom<String> for Bytes32 {
    type Error = HexParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Bytes32> for String {
    fn from(value: Bytes32) -> Self {
        value.to_hex()
    }
}

/// Asset/resource class being transferred.
pub type ResourceId = Bytes32;

/// Content hash of a proposed transfer payload.
pub type DataHash = Bytes32;

/// Access-control role identifier.
pub type RoleId = Bytes32;

/// Bridge direction: origin chain to destination chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DirectionKey {
    /// Chain the transfer leaves.
    pub origin: ChainId,
    /// Chain the transfer arrives on.
    pub destination: ChainId,
}

impl DirectionKey {
    /// Create a direction key.
    pub fn new(origin: ChainId, destination: ChainId) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

impl fmt::Display for DirectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.origin, self.destination)
    }
}

/// Identity of a transfer: shared by its Deposit and Proposal.
///
/// Nonces are scoped per direction, so the triple is globally unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DepositKey {
    /// Chain the transfer leaves.
    pub origin: ChainId,
    /// Chain the transfer arrives on.
    pub destination: ChainId,
    /// Per-direction sequence number.
    pub nonce: DepositNonce,
}

impl DepositKey {
    /// Create a deposit key.
    pub fn new(origin: ChainId, destination: ChainId, nonce: DepositNonce) -> Self {
        Self {
            origin,
            destination,
            nonce,
        }
    }

    /// The direction this deposit travels.
    pub fn direction(&self) -> DirectionKey {
        DirectionKey::new(self.origin, self.destination)
    }
}

impl fmt::Display for DepositKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.direction(), self.nonce)
    }
}

/// A relayer's vote on a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoteKey {
    /// Proposal being voted.
    pub proposal: DepositKey,
    /// Voting account.
    pub voter: Address,
}

impl VoteKey {
    /// Create a vote key.
    pub fn new(proposal: DepositKey, voter: Address) -> Self {
        Self { proposal, voter }
    }
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.proposal, self.voter)
    }
}

/// Proposal lifecycle status.
///
/// Nominal path: `Inactive -> Active -> {Passed -> Executed} | Cancelled`.
/// Transitions are not validated; the latest signal always wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Created, no votes yet.
    #[default]
    Inactive,
    /// Voting in progress.
    Active,
    /// Vote threshold reached.
    Passed,
    /// Transfer executed on destination.
    Executed,
    /// Proposal cancelled.
    Cancelled,
}

impl ProposalStatus {
    /// Stored status name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::Active => "Active",
            Self::Passed => "Passed",
            Self::Executed => "Executed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// On-chain status code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Active => 1,
            Self::Passed => 2,
            Self::Executed => 3,
            Self::Cancelled => 4,
        }
    }
}

impl TryFrom<u8> for ProposalStatus {
    type Error = ReconcilerError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Inactive),
            1 => Ok(Self::Active),
            2 => Ok(Self::Passed),
            3 => Ok(Self::Executed),
            4 => Ok(Self::Cancelled),
            other => Err(ReconcilerError::UnknownStatusCode(other)),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_key_format() {
        let key = DepositKey::new(ChainId(1), ChainId(2), 5);
        assert_eq!(key.to_string(), "1->2-5");
        assert_eq!(key.direction().to_string(), "1->2");
    }

    #[test]
    fn test_deposit_keys_differ_by_direction() {
        let forward = DepositKey::new(ChainId(1), ChainId(2), 5);
        let backward = DepositKey::new(ChainId(2), ChainId(1), 5);
        assert_ne!(forward.to_string(), backward.to_string());
    }

    #[test]
    fn test_vote_key_format() {
        let voter: Address = "0x00000000000000000000000000000000000000AA".parse().unwrap();
        let key = VoteKey::new(DepositKey::new(ChainId(1), ChainId(2), 5), voter);
        assert_eq!(
            key.to_string(),
            "1->2-5-0x00000000000000000000000000000000000000aa"
        );
    }

    #[test]
    fn test_address_lowercase_hex() {
        let addr: Address = "0xABCDEF0000000000000000000000000000000001".parse().unwrap();
        assert_eq!(addr.to_hex(), "0xabcdef0000000000000000000000000000000001");
    }

    #[test]
    fn test_address_without_prefix() {
        let addr: Address = "abcdef0000000000000000000000000000000001".parse().unwrap();
        assert_eq!(addr.0[0], 0xab);
    }

    #[test]
    fn test_address_wrong_length() {
        let err = "0x1234".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            HexParseError::InvalidLength {
                expected: 20,
                got: 2
            }
        );
    }

    #[test]
    fn test_bytes32_invalid_hex() {
        assert!(matches!(
            "0xzz".parse::<Bytes32>(),
            Err(HexParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_address_serde_as_string() {
        let addr = Address([0x11; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "11".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_status_mapping_total() {
        assert_eq!(ProposalStatus::try_from(0).unwrap(), ProposalStatus::Inactive);
        assert_eq!(ProposalStatus::try_from(1).unwrap(), ProposalStatus::Active);
        assert_eq!(ProposalStatus::try_from(2).unwrap(), ProposalStatus::Passed);
        assert_eq!(ProposalStatus::try_from(3).unwrap(), ProposalStatus::Executed);
        assert_eq!(ProposalStatus::try_from(4).unwrap(), ProposalStatus::Cancelled);
        assert_eq!(
            ProposalStatus::try_from(5),
            Err(ReconcilerError::UnknownStatusCode(5))
        );
    }

    #[test]
    fn test_status_code_matches_mapping() {
        for code in 0u8..=4 {
            assert_eq!(ProposalStatus::try_from(code).unwrap().code(), code);
        }
    }
}

use ruc::eg;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// An opaque 32-byte cryptographic identifier.
#[derive(
    Clone, Eq, PartialEq, Ord, PartialOrd, Default, Hash, Serialize, Deserialize, Debug,
)]
pub struct Address32([u8; 32]);

pub type Address = Address32;

impl Address32 {
    /// The all-zero address. Reserved on-chain as a sentinel and never
    /// derivable from a public key.
    pub fn zero() -> Self {
        Address32::default()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Derive the account address of a public key.
    pub fn from_public_key(pub_key: &[u8]) -> Self {
        let digest = Sha256::digest(pub_key);
        let mut r = Address32::default();
        r.0.copy_from_slice(digest.as_slice());
        r
    }

    /// Derive the well-known address owned by a runtime module.
    pub fn of_module(name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"module/");
        hasher.update(name.as_bytes());
        let mut r = Address32::default();
        r.0.copy_from_slice(hasher.finalize().as_slice());
        r
    }
}

impl AsRef<[u8]> for Address32 {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl<'a> TryFrom<&'a [u8]> for Address32 {
    type Error = ();
    fn try_from(x: &'a [u8]) -> Result<Address32, ()> {
        if x.len() == 32 {
            let mut r = Address32::default();
            r.0.copy_from_slice(x);
            Ok(r)
        } else {
            Err(())
        }
    }
}

// The hex form doubles as the storage-key form; fixed width keeps
// lexicographic string order identical to byte order.
impl fmt::Display for Address32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Address32 {
    type Err = Box<dyn ruc::RucError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| eg!(e))?;
        Address32::try_from(bytes.as_slice()).map_err(|_| eg!("invalid address length"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruc::RucResult;

    #[test]
    fn address_hex_round_trip() {
        let addr = Address32::from_public_key(b"some public key");
        let parsed = ruc::pnk!(Address32::from_str(&addr.to_string()));
        assert_eq!(addr, parsed);
    }

    #[test]
    fn zero_address_is_not_derivable() {
        assert!(Address32::zero().is_zero());
        assert!(!Address32::from_public_key(&[]).is_zero());
    }
}

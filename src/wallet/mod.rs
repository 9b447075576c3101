//! Member wallets.
//!
//! A wallet is an Ed25519 keypair stored as JSON. Members use it to sign
//! ballots that anyone can relay to the DAO.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{Keypair, PublicKey, SecretKey, SigningDomain};
use crate::governance::{Ballot, SignedBallot};
use crate::types::{Address, Id};

/// Current wallet file format version
const WALLET_VERSION: u8 = 1;

const ALGORITHM: &str = "ed25519";

/// Wallet file format
#[derive(Serialize, Deserialize)]
struct WalletFile {
    version: u8,
    algorithm: String,
    /// Public key (hex)
    public_key: String,
    /// Secret key (hex), unencrypted
    secret_key: String,
    name: Option<String>,
    created_at: i64,
}

/// A member wallet
pub struct Wallet {
    keypair: Keypair,
    /// Wallet name/label
    pub name: Option<String>,
    /// Path to wallet file (if loaded from or saved to disk)
    pub path: Option<PathBuf>,
}

impl Wallet {
    /// Generate a new wallet
    #[must_use]
    pub fn generate() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    /// Wrap an existing keypair
    #[must_use]
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair,
            name: None,
            path: None,
        }
    }

    /// Public key
    #[must_use]
    pub fn public_key(&self) -> &PublicKey {
        self.keypair.public_key()
    }

    /// Address derived from the public key
    #[must_use]
    pub fn address(&self) -> Address {
        Address::from_public_key(self.keypair.public_key())
    }

    /// Underlying keypair
    #[must_use]
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Sign a ballot for this wallet's address
    #[must_use]
    pub fn sign_ballot(&self, proposal_id: Id, support: u8, domain: &SigningDomain) -> SignedBallot {
        let ballot = Ballot {
            proposal_id,
            voter: self.address(),
            support,
        };
        SignedBallot::sign(ballot, &self.keypair, domain)
    }

    /// Save wallet to a file, creating parent directories
    ///
    /// # Errors
    /// Returns error if file cannot be written
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), WalletError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| WalletError::IoError(e.to_string()))?;
        }

        let wallet_file = WalletFile {
            version: WALLET_VERSION,
            algorithm: ALGORITHM.to_string(),
            public_key: self.keypair.public_key().to_hex(),
            secret_key: hex::encode(self.keypair.secret_key().to_bytes()),
            name: self.name.clone(),
            created_at: crate::types::now_millis(),
        };
        let json = serde_json::to_string_pretty(&wallet_file)
            .map_err(|e| WalletError::SerializationError(e.to_string()))?;
        fs::write(path, json).map_err(|e| WalletError::IoError(e.to_string()))?;

        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Load wallet from a file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, has another version, or its
    /// keys do not belong together
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WalletError::NotFound);
        }

        let contents = fs::read_to_string(path).map_err(|e| WalletError::IoError(e.to_string()))?;
        let wallet_file: WalletFile = serde_json::from_str(&contents)
            .map_err(|e| WalletError::SerializationError(e.to_string()))?;

        if wallet_file.version != WALLET_VERSION || wallet_file.algorithm != ALGORITHM {
            return Err(WalletError::UnsupportedVersion(wallet_file.version));
        }

        let secret_bytes = hex::decode(wallet_file.secret_key.trim_start_matches("0x"))
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let secret =
            SecretKey::from_bytes(&secret_bytes).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let keypair = Keypair::from_secret(secret);

        let public = PublicKey::from_hex(&wallet_file.public_key)
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        if &public != keypair.public_key() {
            return Err(WalletError::InvalidKey("public key does not match secret key".into()));
        }

        Ok(Self {
            keypair,
            name: wallet_file.name,
            path: Some(path.to_path_buf()),
        })
    }

    /// Default wallet directory
    #[must_use]
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".collector-dao")
            .join("wallets")
    }

    /// Default wallet path
    #[must_use]
    pub fn default_path() -> PathBuf {
        Self::default_dir().join("default.json")
    }

    /// Load the default wallet
    ///
    /// # Errors
    /// Returns error if default wallet doesn't exist or is invalid
    pub fn load_default() -> Result<Self, WalletError> {
        Self::load(Self::default_path())
    }
}

/// Wallet errors
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
    /// Serialization error
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Invalid key
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Unsupported wallet version
    #[error("unsupported wallet version: {0}")]
    UnsupportedVersion(u8),
    /// Wallet not found
    #[error("wallet not found")]
    NotFound,
}

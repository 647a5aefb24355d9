use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::VersionedTransaction;

use crate::errors::BotError;
use crate::models::User;

/// Key material held by the bot on a user's behalf. Read-only once loaded.
#[derive(Clone)]
pub struct CustodialWallet {
    public_key: String,
    private_key_material: String,
}

impl CustodialWallet {
    pub fn from_user(user: &User) -> Self {
        Self {
            public_key: user.public_key.clone(),
            private_key_material: user.private_key.clone(),
        }
    }

    /// Create a fresh keypair, returning `(public_key_base58, private_key_base64)`.
    pub fn generate() -> (String, String) {
        let keypair = Keypair::new();
        (
            keypair.pubkey().to_string(),
            STANDARD.encode(keypair.to_bytes()),
        )
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn pubkey(&self) -> Result<Pubkey, BotError> {
        Pubkey::from_str(&self.public_key)
            .map_err(|e| BotError::Signing(format!("stored public key is invalid: {e}")))
    }

    fn keypair(&self) -> Result<Keypair, BotError> {
        let bytes = STANDARD
            .decode(&self.private_key_material)
            .map_err(|e| BotError::Signing(format!("key material is not base64: {e}")))?;

        #[allow(deprecated)]
        Keypair::from_bytes(&bytes)
            .map_err(|e| BotError::Signing(format!("key material is corrupt: {e}")))
    }

    /// Decode a base64 unsigned transaction from the swap router and sign it.
    pub fn sign_transaction(&self, unsigned_base64: &str) -> Result<VersionedTransaction, BotError> {
        let raw = STANDARD
            .decode(unsigned_base64)
            .map_err(|e| BotError::Signing(format!("transaction is not base64: {e}")))?;

        let unsigned: VersionedTransaction = bincode::deserialize(&raw)
            .map_err(|e| BotError::Signing(format!("transaction could not be decoded: {e}")))?;

        let keypair = self.keypair()?;
        VersionedTransaction::try_new(unsigned.message, &[&keypair])
            .map_err(|e| BotError::Signing(e.to_string()))
    }
}

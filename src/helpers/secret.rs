//! Secret sealing for values stored in the config file.
//!
//! The API key is kept in `config.toml` as Base64 of
//! `[nonce (12 bytes)][AES-256-GCM ciphertext]`.

use crate::error::{Error, Result};
use aes_gcm::{
    Aes256Gcm,
    aead::{Aead, AeadCore, KeyInit, Nonce, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

const NONCE_LEN: usize = 12;

/// Key used to seal secrets at rest.
///
/// WARNING: anyone with the binary can open sealed values. This only keeps
/// keys out of plain sight in the config file.
const SEALING_KEY: &[u8; 32] = b"ReferralPagerConfigSealingKey!01";

/// Seal a plaintext secret for storage
pub fn seal_secret(plain_text: &str) -> Result<String> {
    let cipher = Aes256Gcm::new(SEALING_KEY.into());
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plain_text.as_bytes())
        .map_err(|e| Error::Invalid {
            message: format!("Sealing failed: {e}"),
        })?;

    let mut sealed = nonce.to_vec();
    sealed.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(sealed))
}

/// Open a secret produced by [`seal_secret`]
pub fn open_secret(sealed: &str) -> Result<String> {
    let data = BASE64.decode(sealed.trim()).map_err(|e| Error::Invalid {
        message: format!("Base64 decode failed: {e}"),
    })?;

    if data.len() < NONCE_LEN {
        return Err(Error::Invalid {
            message: "Sealed secret too short".to_string(),
        });
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(SEALING_KEY.into());
    let nonce = Nonce::<Aes256Gcm>::from_slice(nonce_bytes);

    let plain = cipher.decrypt(nonce, ciphertext).map_err(|e| Error::Invalid {
        message: format!("Opening sealed secret failed: {e}"),
    })?;

    String::from_utf8(plain).map_err(|e| Error::Invalid {
        message: format!("UTF-8 decode failed: {e}"),
    })
}

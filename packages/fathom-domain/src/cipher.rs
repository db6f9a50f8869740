//! AES-256-GCM envelope for knowledge-base chunk payloads. The wire layout is
//! `nonce(12) || ciphertext || tag(16)`, with the key exchanged as base64.

use aes_gcm::{
	Aes256Gcm, Key, Nonce,
	aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
	#[error("key must be {KEY_LEN} bytes after base64 decoding")]
	InvalidKey,
	#[error("payload is shorter than nonce plus tag")]
	Truncated,
	#[error("decryption failed")]
	Decrypt,
	#[error("encryption failed")]
	Encrypt,
	#[error("plaintext is not valid UTF-8")]
	Utf8(#[from] std::string::FromUtf8Error),
}

pub struct ContentCipher {
	cipher: Aes256Gcm,
}
impl ContentCipher {
	pub fn new(key: &[u8]) -> Result<Self, CipherError> {
		if key.len() != KEY_LEN {
			return Err(CipherError::InvalidKey);
		}

		Ok(Self { cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)) })
	}

	pub fn from_base64_key(key: &str) -> Result<Self, CipherError> {
		let bytes = STANDARD.decode(key.trim()).map_err(|_| CipherError::InvalidKey)?;

		Self::new(&bytes)
	}

	pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, CipherError> {
		let mut nonce = [0_u8; NONCE_LEN];

		rand::thread_rng().fill_bytes(&mut nonce);

		let sealed = self
			.cipher
			.encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
			.map_err(|_| CipherError::Encrypt)?;
		let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());

		out.extend_from_slice(&nonce);
		out.extend_from_slice(&sealed);

		Ok(out)
	}

	pub fn decrypt(&self, payload: &[u8]) -> Result<String, CipherError> {
		if payload.len() < NONCE_LEN + TAG_LEN {
			return Err(CipherError::Truncated);
		}

		let (nonce, sealed) = payload.split_at(NONCE_LEN);
		let plain = self
			.cipher
			.decrypt(Nonce::from_slice(nonce), sealed)
			.map_err(|_| CipherError::Decrypt)?;

		Ok(String::from_utf8(plain)?)
	}
}

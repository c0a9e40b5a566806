//! AES-GCM encryption for short string fields carried through untrusted hands.
//!
//! Output is `base64url(nonce || ciphertext || tag)` with a fresh 96-bit nonce per call.

// crates.io
use aes_gcm::{
	Aes128Gcm, Aes256Gcm, AesGcm,
	aead::{Aead, KeyInit, Nonce, consts::U12},
	aes::Aes192,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
// self
use crate::_prelude::*;

type Aes192Gcm = AesGcm<Aes192, U12>;

const NONCE_LEN: usize = 12;

/// Failures raised while encrypting or decrypting a field.
#[derive(Debug, ThisError)]
pub enum CryptoError {
	/// Key is not a valid AES key size.
	#[error("Cipher key must be 16, 24, or 32 bytes long, got {len}.")]
	InvalidKeyLength {
		/// Observed key length in bytes.
		len: usize,
	},
	/// Ciphertext is not valid base64url.
	#[error("Ciphertext is not valid base64url.")]
	Encoding(#[from] base64::DecodeError),
	/// Ciphertext is shorter than the nonce prefix.
	#[error("Ciphertext is too short.")]
	TooShort,
	/// Encryption failed inside the AEAD primitive.
	#[error("Encryption failed.")]
	Encrypt,
	/// Authentication tag mismatch: wrong key or tampered ciphertext.
	#[error("Ciphertext failed authentication.")]
	Decrypt,
	/// Decrypted bytes are not UTF-8.
	#[error("Decrypted field is not valid UTF-8.")]
	Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Clone)]
enum Engine {
	Aes128(Aes128Gcm),
	Aes192(Aes192Gcm),
	Aes256(Aes256Gcm),
}

/// Symmetric field cipher keyed at construction.
#[derive(Clone)]
pub struct FieldCipher(Engine);
impl FieldCipher {
	/// Builds a cipher; key length selects AES-128, AES-192, or AES-256.
	pub fn new(key: impl AsRef<[u8]>) -> Result<Self, CryptoError> {
		let key = key.as_ref();
		let invalid = |_| CryptoError::InvalidKeyLength { len: key.len() };
		let engine = match key.len() {
			16 => Engine::Aes128(Aes128Gcm::new_from_slice(key).map_err(invalid)?),
			24 => Engine::Aes192(Aes192Gcm::new_from_slice(key).map_err(invalid)?),
			32 => Engine::Aes256(Aes256Gcm::new_from_slice(key).map_err(invalid)?),
			len => return Err(CryptoError::InvalidKeyLength { len }),
		};

		Ok(Self(engine))
	}

	/// Encrypts `plaintext` under a fresh random nonce.
	pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
		let mut nonce = [0_u8; NONCE_LEN];

		rand::rng().fill(&mut nonce);

		let nonce_ref = Nonce::<Aes256Gcm>::from_slice(&nonce);
		let sealed = match &self.0 {
			Engine::Aes128(c) => c.encrypt(nonce_ref, plaintext.as_bytes()),
			Engine::Aes192(c) => c.encrypt(nonce_ref, plaintext.as_bytes()),
			Engine::Aes256(c) => c.encrypt(nonce_ref, plaintext.as_bytes()),
		}
		.map_err(|_| CryptoError::Encrypt)?;
		let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());

		out.extend_from_slice(&nonce);
		out.extend_from_slice(&sealed);

		Ok(URL_SAFE_NO_PAD.encode(out))
	}

	/// Decrypts a value produced by [`FieldCipher::encrypt`].
	pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
		let data = URL_SAFE_NO_PAD.decode(encoded)?;

		if data.len() < NONCE_LEN {
			return Err(CryptoError::TooShort);
		}

		let (nonce, sealed) = data.split_at(NONCE_LEN);
		let nonce = Nonce::<Aes256Gcm>::from_slice(nonce);
		let plain = match &self.0 {
			Engine::Aes128(c) => c.decrypt(nonce, sealed),
			Engine::Aes192(c) => c.decrypt(nonce, sealed),
			Engine::Aes256(c) => c.decrypt(nonce, sealed),
		}
		.map_err(|_| CryptoError::Decrypt)?;

		Ok(String::from_utf8(plain)?)
	}
}
impl Debug for FieldCipher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let bits = match self.0 {
			Engine::Aes128(_) => 128,
			Engine::Aes192(_) => 192,
			Engine::Aes256(_) => 256,
		};

		write!(f, "FieldCipher(AES-{bits}-GCM)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn encrypt_then_decrypt_for_every_key_size() {
		for key in [
			"0123456789abcdef",
			"0123456789abcdef01234567",
			"0123456789abcdef0123456789abcdef",
		] {
			let cipher = FieldCipher::new(key).expect("Key fixture should be a valid AES size.");
			let sealed = cipher.encrypt("hello world").expect("Encryption should succeed.");

			assert_eq!(cipher.decrypt(&sealed).expect("Decryption should succeed."), "hello world");
		}
	}

	#[test]
	fn nonces_make_ciphertexts_differ() {
		let cipher = FieldCipher::new("0123456789abcdef").expect("Key fixture should be valid.");
		let a = cipher.encrypt("jane@shop.example.com").expect("Encryption should succeed.");
		let b = cipher.encrypt("jane@shop.example.com").expect("Encryption should succeed.");

		assert_ne!(a, b);
	}

	#[test]
	fn wrong_key_and_tampering_fail_closed() {
		let cipher = FieldCipher::new("0123456789abcdef").expect("Key fixture should be valid.");
		let other = FieldCipher::new("fedcba9876543210").expect("Key fixture should be valid.");
		let sealed = cipher.encrypt("hello world").expect("Encryption should succeed.");

		assert!(matches!(other.decrypt(&sealed), Err(CryptoError::Decrypt)));

		let mut bytes = URL_SAFE_NO_PAD.decode(&sealed).expect("Ciphertext should decode.");
		let last = bytes.len() - 1;

		bytes[last] ^= 0x01;

		let tampered = URL_SAFE_NO_PAD.encode(bytes);

		assert!(matches!(cipher.decrypt(&tampered), Err(CryptoError::Decrypt)));
		assert!(matches!(cipher.decrypt("AAAA"), Err(CryptoError::TooShort)));
		assert!(matches!(cipher.decrypt("%%%"), Err(CryptoError::Encoding(_))));
	}

	#[test]
	fn unsupported_key_sizes_are_rejected() {
		assert!(matches!(FieldCipher::new("short"), Err(CryptoError::InvalidKeyLength { len: 5 })));
		assert!(matches!(FieldCipher::new(""), Err(CryptoError::InvalidKeyLength { len: 0 })));
	}
}

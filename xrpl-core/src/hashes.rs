//! Transaction identifiers.
//!
//! A transaction id is the SHA-512Half of the signed blob prefixed with the
//! `TXN\0` hash prefix.

use sha2::{Digest, Sha512};

use crate::{BinaryCodec, SubmittableTransaction, XrplError, XrplResult};

/// Hash prefix for transaction ids, `"TXN\0"`.
pub const TRANSACTION_ID_PREFIX: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

/// First 32 bytes of the SHA-512 digest.
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(data);
    let mut half = [0u8; 32];
    half.copy_from_slice(&digest[..32]);
    half
}

/// Id of an already encoded, signed transaction, as uppercase hex.
pub fn hash_tx_blob(blob: &str) -> XrplResult<String> {
    let bytes = hex::decode(blob)
        .map_err(|err| XrplError::Codec(format!("transaction blob is not valid hex: {err}")))?;
    let mut prefixed = Vec::with_capacity(TRANSACTION_ID_PREFIX.len() + bytes.len());
    prefixed.extend_from_slice(&TRANSACTION_ID_PREFIX);
    prefixed.extend_from_slice(&bytes);
    Ok(hex::encode_upper(sha512_half(&prefixed)))
}

/// Id of a signed transaction in either form. Unsigned input is rejected.
pub fn hash_signed_tx(
    tx: &SubmittableTransaction,
    codec: &dyn BinaryCodec,
) -> XrplResult<String> {
    let blob = match tx {
        SubmittableTransaction::Json(tx) => {
            if !tx.is_signed() {
                return Err(XrplError::Validation(
                    "The transaction has not been signed.".to_owned(),
                ));
            }
            codec.encode(tx)?
        }
        SubmittableTransaction::Blob(blob) => {
            if !codec.decode(blob)?.is_signed() {
                return Err(XrplError::Validation(
                    "The transaction has not been signed.".to_owned(),
                ));
            }
            blob.clone()
        }
    };
    hash_tx_blob(&blob)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transaction;

    #[derive(Debug)]
    struct FixedCodec {
        blob: &'static str,
        signed: bool,
    }

    impl BinaryCodec for FixedCodec {
        fn encode(&self, _tx: &Transaction) -> XrplResult<String> {
            Ok(self.blob.to_owned())
        }

        fn decode(&self, _blob: &str) -> XrplResult<Transaction> {
            let mut tx = Transaction::new("Payment", "rSender");
            if self.signed {
                tx.txn_signature = Some("30440220".to_owned());
            }
            Ok(tx)
        }
    }

    const BLOB: &str = "120000228000000024000000016140000000000003E8";
    const BLOB_HASH: &str = "01CFD9CB83DD7F178966D0B900E100B316E02C334638ECDE6BB2B8EA7F6489BA";

    #[test]
    fn sha512_half_of_empty_input() {
        assert_eq!(
            hex::encode_upper(sha512_half(&[])),
            "CF83E1357EEFB8BDF1542850D66D8007D620E4050B5715DC83F4A921D36CE9CE"
        );
    }

    #[test]
    fn hashes_prefixed_blob() {
        assert_eq!(hash_tx_blob(BLOB).unwrap(), BLOB_HASH);
        assert!(matches!(hash_tx_blob("zz"), Err(XrplError::Codec(_))));
    }

    #[test]
    fn json_input_is_encoded_before_hashing() {
        let codec = FixedCodec {
            blob: BLOB,
            signed: true,
        };
        let mut tx = Transaction::new("Payment", "rSender");
        tx.signing_pub_key = Some("ED01".to_owned());
        assert_eq!(hash_signed_tx(&tx.into(), &codec).unwrap(), BLOB_HASH);
    }

    #[test]
    fn unsigned_input_is_rejected() {
        let codec = FixedCodec {
            blob: BLOB,
            signed: false,
        };
        let unsigned = Transaction::new("Payment", "rSender");
        assert!(matches!(
            hash_signed_tx(&unsigned.into(), &codec),
            Err(XrplError::Validation(_))
        ));
        assert!(matches!(
            hash_signed_tx(&SubmittableTransaction::Blob(BLOB.to_owned()), &codec),
            Err(XrplError::Validation(_))
        ));
    }
}

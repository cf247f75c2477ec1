//! Challenge transaction construction and inspection
//!
//! The login challenge is carried inside a Stellar transaction as a
//! `ManageData` entry named `auth_challenge`. The ledger caps data values,
//! so only a fixed-size prefix of the challenge is embedded and verification
//! uses prefix matching against the stored challenge.

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use stellar_xdr::next::{
    BytesM, DataValue, FeeBumpTransactionInnerTx, Limits, ManageDataOp, Memo, MuxedAccount,
    Operation, OperationBody, Preconditions, ReadXdr, SequenceNumber, String64, StringM,
    TimeBounds, TimePoint, Transaction, TransactionEnvelope, TransactionExt,
    TransactionV1Envelope, Uint256, VecM, WriteXdr,
};
use thiserror::Error;

use super::strkey;

/// ManageData entry name carrying the challenge.
pub const CHALLENGE_DATA_NAME: &str = "auth_challenge";

/// Byte ceiling for the embedded challenge value.
pub const CHALLENGE_EMBED_LIMIT: usize = 28;

/// Absolute time bound on the unsigned challenge transaction, in seconds.
pub const CHALLENGE_TX_TIMEOUT_SECS: u64 = 30;

/// Upper bound on accepted envelope size when decoding.
const ENVELOPE_READ_LIMIT: usize = 10_000;

/// Errors from building or decoding challenge transactions
#[derive(Error, Debug)]
pub enum ChallengeTxError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Malformed transaction envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Transaction encoding failed: {0}")]
    EncodingFailed(String),
}

/// Build the unsigned challenge transaction for a wallet, returned as
/// base64-encoded XDR.
///
/// The transaction's sole operation writes
/// `auth_challenge = truncate(challenge, 28)` and its source account is the
/// claimed wallet. A 30-second absolute time bound makes stale transactions
/// unsubmittable by ledger rules.
pub fn build_challenge_transaction(
    wallet_address: &str,
    challenge: &str,
) -> Result<String, ChallengeTxError> {
    let key = strkey::decode_account_id(wallet_address)
        .map_err(|e| ChallengeTxError::InvalidAddress(e.to_string()))?;

    let embedded = truncate_challenge(challenge);
    let data_name = String64(
        StringM::try_from(CHALLENGE_DATA_NAME)
            .map_err(|e| ChallengeTxError::EncodingFailed(e.to_string()))?,
    );
    let data_value = DataValue(
        BytesM::try_from(embedded.as_bytes().to_vec())
            .map_err(|e| ChallengeTxError::EncodingFailed(e.to_string()))?,
    );

    let operation = Operation {
        source_account: None,
        body: OperationBody::ManageData(ManageDataOp {
            data_name,
            data_value: Some(data_value),
        }),
    };
    let operations: VecM<Operation, 100> = vec![operation]
        .try_into()
        .map_err(|e: stellar_xdr::next::Error| ChallengeTxError::EncodingFailed(e.to_string()))?;

    let max_time = Utc::now().timestamp() as u64 + CHALLENGE_TX_TIMEOUT_SECS;
    let tx = Transaction {
        source_account: MuxedAccount::Ed25519(Uint256(key)),
        fee: 100,
        seq_num: SequenceNumber(0),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(max_time),
        }),
        memo: Memo::None,
        operations,
        ext: TransactionExt::V0,
    };

    let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: VecM::default(),
    });

    let bytes = envelope
        .to_xdr(Limits::len(ENVELOPE_READ_LIMIT))
        .map_err(|e| ChallengeTxError::EncodingFailed(e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(bytes))
}

/// Decode a base64 XDR blob into a transaction envelope.
pub fn parse_envelope(blob: &str) -> Result<TransactionEnvelope, ChallengeTxError> {
    let bytes = general_purpose::STANDARD
        .decode(blob.trim())
        .map_err(|e| ChallengeTxError::MalformedEnvelope(e.to_string()))?;

    TransactionEnvelope::from_xdr(bytes, Limits::len(ENVELOPE_READ_LIMIT))
        .map_err(|e| ChallengeTxError::MalformedEnvelope(e.to_string()))
}

/// Extract the embedded challenge value from the `auth_challenge` ManageData
/// operation, if present.
pub fn embedded_challenge(envelope: &TransactionEnvelope) -> Option<String> {
    for operation in operations(envelope) {
        if let OperationBody::ManageData(op) = &operation.body {
            if op.data_name.0.as_slice() == CHALLENGE_DATA_NAME.as_bytes() {
                let value = op.data_value.as_ref()?;
                return Some(String::from_utf8_lossy(value.0.as_slice()).into_owned());
            }
        }
    }
    None
}

/// Resolve the effective source account of an envelope as a G-address.
///
/// Fee-bump envelopes resolve through the inner transaction's source, never
/// the fee source. Muxed (M-) source accounts resolve to their underlying
/// ed25519 key.
///
/// Every current envelope and account variant carries a resolvable key, so
/// this returns `Some` for any envelope that parsed; `None` is reserved for
/// future XDR shapes without one.
pub fn effective_source_account(envelope: &TransactionEnvelope) -> Option<String> {
    match envelope {
        TransactionEnvelope::TxV0(e) => {
            Some(strkey::encode_account_id(&e.tx.source_account_ed25519.0))
        }
        TransactionEnvelope::Tx(e) => muxed_to_address(&e.tx.source_account),
        TransactionEnvelope::TxFeeBump(e) => {
            let FeeBumpTransactionInnerTx::Tx(inner) = &e.tx.inner_tx;
            muxed_to_address(&inner.tx.source_account)
        }
    }
}

fn muxed_to_address(account: &MuxedAccount) -> Option<String> {
    match account {
        MuxedAccount::Ed25519(key) => Some(strkey::encode_account_id(&key.0)),
        MuxedAccount::MuxedEd25519(m) => Some(strkey::encode_account_id(&m.ed25519.0)),
    }
}

fn operations(envelope: &TransactionEnvelope) -> &[Operation] {
    match envelope {
        TransactionEnvelope::TxV0(e) => e.tx.operations.as_slice(),
        TransactionEnvelope::Tx(e) => e.tx.operations.as_slice(),
        TransactionEnvelope::TxFeeBump(e) => {
            let FeeBumpTransactionInnerTx::Tx(inner) = &e.tx.inner_tx;
            inner.tx.operations.as_slice()
        }
    }
}

/// Truncate a challenge to the embeddable byte limit on a char boundary.
pub fn truncate_challenge(challenge: &str) -> &str {
    if challenge.len() <= CHALLENGE_EMBED_LIMIT {
        return challenge;
    }
    let mut end = CHALLENGE_EMBED_LIMIT;
    while !challenge.is_char_boundary(end) {
        end -= 1;
    }
    &challenge[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::next::{
        FeeBumpTransaction, FeeBumpTransactionEnvelope, FeeBumpTransactionExt, TransactionV0,
        TransactionV0Envelope, TransactionV0Ext,
    };

    const WALLET: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";

    #[test]
    fn test_truncate_short_challenge() {
        assert_eq!(truncate_challenge("abc"), "abc");
    }

    #[test]
    fn test_truncate_long_challenge() {
        let challenge = "a".repeat(64);
        let truncated = truncate_challenge(&challenge);
        assert_eq!(truncated.len(), CHALLENGE_EMBED_LIMIT);
        assert!(challenge.starts_with(truncated));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // Three-byte chars: byte 28 lands mid-character, so the cut backs
        // off to byte 27.
        let challenge = "€".repeat(20);
        let truncated = truncate_challenge(&challenge);
        assert_eq!(truncated.len(), 27);
        assert!(challenge.starts_with(truncated));
    }

    #[test]
    fn test_build_and_parse_round_trip() {
        let challenge = "f".repeat(64);
        let blob = build_challenge_transaction(WALLET, &challenge).unwrap();

        let envelope = parse_envelope(&blob).unwrap();
        assert_eq!(
            embedded_challenge(&envelope).unwrap(),
            truncate_challenge(&challenge)
        );
        assert_eq!(effective_source_account(&envelope).unwrap(), WALLET);
    }

    #[test]
    fn test_build_rejects_bad_address() {
        assert!(matches!(
            build_challenge_transaction("not-a-wallet", "abc"),
            Err(ChallengeTxError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_envelope("definitely not xdr!").is_err());
        // Valid base64, invalid XDR
        assert!(parse_envelope("aGVsbG8gd29ybGQ=").is_err());
    }

    #[test]
    fn test_fee_bump_resolves_inner_source() {
        let blob = build_challenge_transaction(WALLET, "abc").unwrap();
        let inner = match parse_envelope(&blob).unwrap() {
            TransactionEnvelope::Tx(e) => e,
            _ => panic!("expected v1 envelope"),
        };

        let fee_bump = TransactionEnvelope::TxFeeBump(FeeBumpTransactionEnvelope {
            tx: FeeBumpTransaction {
                fee_source: MuxedAccount::Ed25519(Uint256([7u8; 32])),
                fee: 200,
                inner_tx: FeeBumpTransactionInnerTx::Tx(inner),
                ext: FeeBumpTransactionExt::V0,
            },
            signatures: VecM::default(),
        });

        assert_eq!(effective_source_account(&fee_bump).unwrap(), WALLET);
        assert_eq!(embedded_challenge(&fee_bump).unwrap(), "abc");
    }

    #[test]
    fn test_v0_envelope_source() {
        let key = strkey::decode_account_id(WALLET).unwrap();
        let envelope = TransactionEnvelope::TxV0(TransactionV0Envelope {
            tx: TransactionV0 {
                source_account_ed25519: Uint256(key),
                fee: 100,
                seq_num: SequenceNumber(0),
                time_bounds: None,
                memo: Memo::None,
                operations: VecM::default(),
                ext: TransactionV0Ext::V0,
            },
            signatures: VecM::default(),
        });

        assert_eq!(effective_source_account(&envelope).unwrap(), WALLET);
        assert!(embedded_challenge(&envelope).is_none());
    }
}

//! Transaction requests as they arrive from a transport layer
//!
//! Every field is optional on the wire. A request is checked for presence,
//! then its hex-encoded key and signature are decoded; anything malformed is
//! refused here and never reaches the ledger.

use crate::core::amount::Amount;
use crate::core::transaction::MINT_SOURCE;
use crate::crypto::{public_key_from_hex, KeyError, Signature};
use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Request rejection reasons
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Sender {0} is reserved for system transactions")]
    ReservedSender(String),
    #[error("Malformed {field}: {source}")]
    Malformed {
        field: &'static str,
        #[source]
        source: KeyError,
    },
}

/// A signed transfer request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub sender_blockchain_address: Option<String>,
    pub recipient_blockchain_address: Option<String>,
    pub sender_public_key: Option<String>,
    pub value: Option<Amount>,
    pub signature: Option<String>,
}

/// A request whose fields are all present and decoded
#[derive(Debug, Clone)]
pub struct Submission {
    pub sender: String,
    pub recipient: String,
    pub value: Amount,
    pub public_key: PublicKey,
    pub signature: Signature,
}

impl TransactionRequest {
    /// Whether every field is present
    pub fn validate(&self) -> bool {
        self.sender_blockchain_address.is_some()
            && self.recipient_blockchain_address.is_some()
            && self.sender_public_key.is_some()
            && self.value.is_some()
            && self.signature.is_some()
    }

    /// Decode the request into a submission
    pub fn parse(&self) -> Result<Submission, RequestError> {
        let sender = required(&self.sender_blockchain_address, "senderBlockchainAddress")?;
        let recipient = required(&self.recipient_blockchain_address, "recipientBlockchainAddress")?;
        let public_key_hex = required(&self.sender_public_key, "senderPublicKey")?;
        let signature_hex = required(&self.signature, "signature")?;
        let value = self.value.ok_or(RequestError::MissingField("value"))?;

        if sender == MINT_SOURCE {
            return Err(RequestError::ReservedSender(sender.clone()));
        }

        let public_key = public_key_from_hex(public_key_hex).map_err(|source| {
            RequestError::Malformed {
                field: "senderPublicKey",
                source,
            }
        })?;
        let signature = signature_hex
            .parse::<Signature>()
            .map_err(|source| RequestError::Malformed {
                field: "signature",
                source,
            })?;

        Ok(Submission {
            sender: sender.clone(),
            recipient: recipient.clone(),
            value,
            public_key,
            signature,
        })
    }
}

fn required<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a String, RequestError> {
    field.as_ref().ok_or(RequestError::MissingField(name))
}

//! Ledger key extraction for rs-soroban-replay.
//!
//! A transaction's result meta records every ledger entry change the
//! transaction caused. To replay the transaction against current network
//! state we need the set of ledger keys it touched, so this crate walks the
//! versioned `TransactionMeta` union and collects a de-duplicated set of
//! [`LedgerKeyRef`]s.
//!
//! Extraction is a pure, synchronous computation: base64 decode, XDR decode,
//! walk the change lists, project each changed entry down to its key and
//! re-encode it in a stable textual form.

use std::collections::HashSet;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use stellar_xdr::curr::{
    LedgerEntry, LedgerEntryChange, LedgerEntryChanges, LedgerKey, Limits, OperationMeta, ReadXdr,
    TransactionMeta, VecM, WriteXdr,
};
use thiserror::Error;

/// Errors produced while extracting ledger keys from result meta.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The outer base64 envelope was malformed.
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes were not valid XDR for the expected type.
    #[error("xdr decode failed: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),
}

/// Result type for key extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// A stable, comparable reference to one ledger state slot.
///
/// The reference is the base64 encoding of the XDR serialization of a
/// [`LedgerKey`], so identity is structural: two keys with identical content
/// always produce identical refs. Refs sort and hash as plain strings, which
/// makes them usable both as set members during extraction and as request
/// parameters for `getLedgerEntries`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKeyRef(String);

impl LedgerKeyRef {
    /// Encode a ledger key into its stable ref form.
    pub fn from_key(key: &LedgerKey) -> Result<Self> {
        let bytes = key.to_xdr(Limits::none())?;
        Ok(Self(STANDARD.encode(bytes)))
    }

    /// Wrap an already-encoded ref without re-validating it.
    ///
    /// Intended for refs that came out of this crate (or off the wire from a
    /// collaborator that produced them the same way).
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded form, as sent to the network.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back into the structured key.
    pub fn to_key(&self) -> Result<LedgerKey> {
        let bytes = STANDARD.decode(&self.0)?;
        Ok(LedgerKey::from_xdr(bytes, Limits::none())?)
    }
}

impl fmt::Display for LedgerKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the set of ledger keys touched by a transaction.
///
/// `meta_b64` is the base64-encoded `TransactionMeta` XDR as returned by
/// Horizon in `result_meta_xdr`. The walk is tolerant of meta versions it
/// does not know: anything outside V0..=V3 contributes no changes rather
/// than failing. A blob that does not decode at all is an error.
///
/// Duplicate keys collapse silently; re-running extraction on the same blob
/// yields the same set.
pub fn extract_ledger_keys(meta_b64: &str) -> Result<HashSet<LedgerKeyRef>> {
    let raw = STANDARD.decode(meta_b64.trim())?;
    let meta = TransactionMeta::from_xdr(raw, Limits::none())?;

    let mut refs = HashSet::new();
    for change in collect_changes(&meta) {
        let key = match change {
            LedgerEntryChange::Created(entry)
            | LedgerEntryChange::Updated(entry)
            | LedgerEntryChange::State(entry) => entry_to_key(entry),
            LedgerEntryChange::Removed(key) => key.clone(),
            // Change kinds beyond the four we replay from are skipped.
            _ => continue,
        };
        refs.insert(LedgerKeyRef::from_key(&key)?);
    }

    Ok(refs)
}

/// Gather every ledger entry change recorded in a transaction meta.
///
/// V0 keeps changes per operation only; V1 adds a transaction-level list;
/// V2/V3 split the transaction-level list into before/after application.
/// Unknown versions contribute nothing.
fn collect_changes(meta: &TransactionMeta) -> Vec<&LedgerEntryChange> {
    fn tx_level<'a>(out: &mut Vec<&'a LedgerEntryChange>, changes: &'a LedgerEntryChanges) {
        out.extend(changes.0.iter());
    }

    fn op_level<'a>(out: &mut Vec<&'a LedgerEntryChange>, ops: &'a VecM<OperationMeta>) {
        for op in ops.iter() {
            out.extend(op.changes.0.iter());
        }
    }

    let mut out = Vec::new();
    match meta {
        TransactionMeta::V0(ops) => op_level(&mut out, ops),
        TransactionMeta::V1(v1) => {
            tx_level(&mut out, &v1.tx_changes);
            op_level(&mut out, &v1.operations);
        }
        TransactionMeta::V2(v2) => {
            tx_level(&mut out, &v2.tx_changes_before);
            tx_level(&mut out, &v2.tx_changes_after);
            op_level(&mut out, &v2.operations);
        }
        TransactionMeta::V3(v3) => {
            tx_level(&mut out, &v3.tx_changes_before);
            tx_level(&mut out, &v3.tx_changes_after);
            op_level(&mut out, &v3.operations);
        }
        _ => {}
    }
    out
}

/// Extract the ledger key from an entry.
///
/// The key is a projection of the entry's identifying fields, not the whole
/// entry.
pub fn entry_to_key(entry: &LedgerEntry) -> LedgerKey {
    use stellar_xdr::curr::LedgerEntryData;

    match &entry.data {
        LedgerEntryData::Account(account) => {
            LedgerKey::Account(stellar_xdr::curr::LedgerKeyAccount {
                account_id: account.account_id.clone(),
            })
        }
        LedgerEntryData::Trustline(trustline) => {
            LedgerKey::Trustline(stellar_xdr::curr::LedgerKeyTrustLine {
                account_id: trustline.account_id.clone(),
                asset: trustline.asset.clone(),
            })
        }
        LedgerEntryData::Offer(offer) => LedgerKey::Offer(stellar_xdr::curr::LedgerKeyOffer {
            seller_id: offer.seller_id.clone(),
            offer_id: offer.offer_id,
        }),
        LedgerEntryData::Data(data) => LedgerKey::Data(stellar_xdr::curr::LedgerKeyData {
            account_id: data.account_id.clone(),
            data_name: data.data_name.clone(),
        }),
        LedgerEntryData::ClaimableBalance(cb) => {
            LedgerKey::ClaimableBalance(stellar_xdr::curr::LedgerKeyClaimableBalance {
                balance_id: cb.balance_id.clone(),
            })
        }
        LedgerEntryData::LiquidityPool(pool) => {
            LedgerKey::LiquidityPool(stellar_xdr::curr::LedgerKeyLiquidityPool {
                liquidity_pool_id: pool.liquidity_pool_id.clone(),
            })
        }
        LedgerEntryData::ContractData(data) => {
            LedgerKey::ContractData(stellar_xdr::curr::LedgerKeyContractData {
                contract: data.contract.clone(),
                key: data.key.clone(),
                durability: data.durability.clone(),
            })
        }
        LedgerEntryData::ContractCode(code) => {
            LedgerKey::ContractCode(stellar_xdr::curr::LedgerKeyContractCode {
                hash: code.hash.clone(),
            })
        }
        LedgerEntryData::ConfigSetting(setting) => {
            LedgerKey::ConfigSetting(stellar_xdr::curr::LedgerKeyConfigSetting {
                config_setting_id: setting.discriminant(),
            })
        }
        LedgerEntryData::Ttl(ttl) => LedgerKey::Ttl(stellar_xdr::curr::LedgerKeyTtl {
            key_hash: ttl.key_hash.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{
        AccountEntry, AccountEntryExt, AccountId, ContractDataDurability, ContractDataEntry,
        ContractId, ExtensionPoint, Hash, LedgerEntryData, LedgerEntryExt, OperationMetaV2,
        PublicKey, ScAddress, ScVal, SequenceNumber, Thresholds, TransactionMetaV2,
        TransactionMetaV3, TransactionMetaV4, Uint256,
    };

    fn account_entry(seed: u8) -> LedgerEntry {
        let mut key = [0u8; 32];
        key[0] = seed;

        LedgerEntry {
            last_modified_ledger_seq: 1,
            data: LedgerEntryData::Account(AccountEntry {
                account_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key))),
                balance: 1000000000,
                seq_num: SequenceNumber(1),
                num_sub_entries: 0,
                inflation_dest: None,
                flags: 0,
                home_domain: stellar_xdr::curr::String32::default(),
                thresholds: Thresholds([1, 0, 0, 0]),
                signers: VecM::default(),
                ext: AccountEntryExt::V0,
            }),
            ext: LedgerEntryExt::V0,
        }
    }

    fn contract_data_entry(seed: u8) -> LedgerEntry {
        LedgerEntry {
            last_modified_ledger_seq: 1,
            data: LedgerEntryData::ContractData(ContractDataEntry {
                ext: ExtensionPoint::V0,
                contract: ScAddress::Contract(ContractId(Hash([seed; 32]))),
                key: ScVal::U32(7),
                durability: ContractDataDurability::Persistent,
                val: ScVal::U32(42),
            }),
            ext: LedgerEntryExt::V0,
        }
    }

    fn changes(list: Vec<LedgerEntryChange>) -> LedgerEntryChanges {
        LedgerEntryChanges(list.try_into().unwrap())
    }

    fn meta_v2(tx_before: Vec<LedgerEntryChange>, op_changes: Vec<LedgerEntryChange>) -> String {
        let meta = TransactionMeta::V2(TransactionMetaV2 {
            tx_changes_before: changes(tx_before),
            operations: vec![OperationMeta {
                changes: changes(op_changes),
            }]
            .try_into()
            .unwrap(),
            tx_changes_after: LedgerEntryChanges::default(),
        });
        encode_meta(&meta)
    }

    fn encode_meta(meta: &TransactionMeta) -> String {
        STANDARD.encode(meta.to_xdr(Limits::none()).unwrap())
    }

    #[test]
    fn extracts_keys_from_all_change_kinds() {
        let removed = entry_to_key(&account_entry(9));
        let meta = meta_v2(
            vec![LedgerEntryChange::State(account_entry(1))],
            vec![
                LedgerEntryChange::Created(account_entry(2)),
                LedgerEntryChange::Updated(account_entry(3)),
                LedgerEntryChange::Removed(removed.clone()),
            ],
        );

        let refs = extract_ledger_keys(&meta).unwrap();
        assert_eq!(refs.len(), 4);
        assert!(refs.contains(&LedgerKeyRef::from_key(&removed).unwrap()));
    }

    #[test]
    fn duplicate_keys_collapse() {
        // Created then updated: same account, one key.
        let meta = meta_v2(
            vec![],
            vec![
                LedgerEntryChange::Created(account_entry(1)),
                LedgerEntryChange::Updated(account_entry(1)),
            ],
        );

        let refs = extract_ledger_keys(&meta).unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn extraction_is_idempotent() {
        let meta = meta_v2(
            vec![LedgerEntryChange::State(account_entry(1))],
            vec![
                LedgerEntryChange::Updated(account_entry(1)),
                LedgerEntryChange::Created(account_entry(2)),
            ],
        );

        let first = extract_ledger_keys(&meta).unwrap();
        let second = extract_ledger_keys(&meta).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn v0_collects_operation_changes() {
        let meta = TransactionMeta::V0(
            vec![OperationMeta {
                changes: changes(vec![LedgerEntryChange::Created(account_entry(4))]),
            }]
            .try_into()
            .unwrap(),
        );

        let refs = extract_ledger_keys(&encode_meta(&meta)).unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn v3_collects_soroban_changes() {
        let meta = TransactionMeta::V3(TransactionMetaV3 {
            ext: ExtensionPoint::V0,
            tx_changes_before: changes(vec![LedgerEntryChange::State(account_entry(1))]),
            operations: vec![OperationMeta {
                changes: changes(vec![LedgerEntryChange::Updated(contract_data_entry(8))]),
            }]
            .try_into()
            .unwrap(),
            tx_changes_after: changes(vec![LedgerEntryChange::Updated(account_entry(1))]),
            soroban_meta: None,
        });

        let refs = extract_ledger_keys(&encode_meta(&meta)).unwrap();
        // Account 1 appears twice; contract data once.
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn unknown_version_yields_empty_set() {
        let meta = TransactionMeta::V4(TransactionMetaV4 {
            ext: ExtensionPoint::V0,
            tx_changes_before: LedgerEntryChanges::default(),
            operations: VecM::<OperationMetaV2>::default(),
            tx_changes_after: LedgerEntryChanges::default(),
            soroban_meta: None,
            events: VecM::default(),
            diagnostic_events: VecM::default(),
        });

        let refs = extract_ledger_keys(&encode_meta(&meta)).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn malformed_base64_is_an_error() {
        assert!(matches!(
            extract_ledger_keys("not base64!!!"),
            Err(ExtractError::Base64(_))
        ));
    }

    #[test]
    fn truncated_xdr_is_an_error() {
        let encoded = STANDARD.encode([0u8, 0, 0]);
        assert!(matches!(
            extract_ledger_keys(&encoded),
            Err(ExtractError::Xdr(_))
        ));
    }

    #[test]
    fn key_ref_round_trips() {
        let key = entry_to_key(&contract_data_entry(5));
        let key_ref = LedgerKeyRef::from_key(&key).unwrap();
        assert_eq!(key_ref.to_key().unwrap(), key);
    }

    #[test]
    fn key_ref_identity_is_structural() {
        let a = LedgerKeyRef::from_key(&entry_to_key(&account_entry(1))).unwrap();
        let b = LedgerKeyRef::from_key(&entry_to_key(&account_entry(1))).unwrap();
        assert_eq!(a, b);
    }
}

//! Strict Soroban compatibility checks for contract code.
//!
//! Soroban rejects WASM modules that use floating-point instructions. When a
//! snapshot contains contract code that trips this rule, the replay engine's
//! behavior for that contract is undefined relative to the network, so the
//! session flags it before simulating.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use stellar_xdr::curr::{LedgerEntry, LedgerEntryData, Limits, ReadXdr};
use thiserror::Error;
use wasmparser::{Operator, Parser, Payload};

/// Compatibility violations found in a WASM module.
#[derive(Debug, Error)]
pub enum WasmGuardError {
    /// The module is not well-formed WASM.
    #[error("malformed wasm module: {0}")]
    Parse(#[from] wasmparser::BinaryReaderError),

    /// The module uses a floating-point instruction.
    #[error("floating-point instruction {opcode} is not allowed under strict Soroban compatibility")]
    FloatOpcode { opcode: String },
}

/// Check one WASM module against the strict compatibility rules.
pub fn check_module(wasm: &[u8]) -> Result<(), WasmGuardError> {
    for payload in Parser::new(0).parse_all(wasm) {
        if let Payload::CodeSectionEntry(body) = payload? {
            let mut ops = body.get_operators_reader()?;
            while !ops.eof() {
                let op = ops.read()?;
                if let Some(opcode) = float_opcode_name(&op) {
                    return Err(WasmGuardError::FloatOpcode { opcode });
                }
            }
        }
    }
    Ok(())
}

/// Every float opcode carries an `F32`/`F64` prefix in its debug name;
/// matching on that avoids keeping an exhaustive variant list in sync with
/// the parser version.
fn float_opcode_name(op: &Operator) -> Option<String> {
    let name = format!("{op:?}");
    if name.starts_with("F32") || name.starts_with("F64") {
        Some(name)
    } else {
        None
    }
}

/// A contract in a snapshot that fails the compatibility check.
#[derive(Debug, Clone)]
pub struct WasmIncompatibility {
    /// Hex hash of the offending contract code entry.
    pub contract_hash: String,
    /// Human-readable description of the violation.
    pub reason: String,
}

/// Scan a snapshot of base64 XDR ledger entries for incompatible contract
/// code.
///
/// Entries that are not contract code, or that do not decode, are skipped:
/// the snapshot is opaque pass-through data and only recognizable contract
/// code is inspected.
pub fn scan_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Vec<WasmIncompatibility> {
    let mut found = Vec::new();
    for raw in entries {
        let Ok(bytes) = STANDARD.decode(raw) else {
            continue;
        };
        let Ok(entry) = LedgerEntry::from_xdr(bytes, Limits::none()) else {
            continue;
        };
        if let LedgerEntryData::ContractCode(code) = &entry.data {
            if let Err(err) = check_module(code.code.as_slice()) {
                found.push(WasmIncompatibility {
                    contract_hash: hex::encode(code.hash.0),
                    reason: err.to_string(),
                });
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use stellar_xdr::curr::{
        ContractCodeEntry, ContractCodeEntryExt, Hash, LedgerEntryExt, WriteXdr,
    };

    /// Minimal module: one `() -> ()` function whose body is the given
    /// instruction bytes (locals declaration and `end` are appended).
    fn module_with_body(instrs: &[u8]) -> Vec<u8> {
        let mut body = vec![0x00]; // no locals
        body.extend_from_slice(instrs);
        body.push(0x0b); // end

        let mut wasm = vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];
        wasm.extend_from_slice(&[0x01, 0x04, 0x01, 0x60, 0x00, 0x00]); // type section
        wasm.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]); // function section
        wasm.push(0x0a); // code section
        wasm.push((body.len() + 2) as u8);
        wasm.push(0x01); // one body
        wasm.push(body.len() as u8);
        wasm.extend_from_slice(&body);
        wasm
    }

    fn float_module() -> Vec<u8> {
        // f32.const 0, f32.const 0, f32.add, drop
        module_with_body(&[
            0x43, 0x00, 0x00, 0x00, 0x00, 0x43, 0x00, 0x00, 0x00, 0x00, 0x92, 0x1a,
        ])
    }

    fn clean_module() -> Vec<u8> {
        module_with_body(&[0x01]) // nop
    }

    fn code_entry_b64(wasm: Vec<u8>, seed: u8) -> String {
        let entry = LedgerEntry {
            last_modified_ledger_seq: 1,
            data: LedgerEntryData::ContractCode(ContractCodeEntry {
                ext: ContractCodeEntryExt::V0,
                hash: Hash([seed; 32]),
                code: wasm.try_into().unwrap(),
            }),
            ext: LedgerEntryExt::V0,
        };
        STANDARD.encode(entry.to_xdr(Limits::none()).unwrap())
    }

    #[test]
    fn clean_module_passes() {
        check_module(&clean_module()).unwrap();
    }

    #[test]
    fn float_opcode_is_rejected() {
        match check_module(&float_module()) {
            Err(WasmGuardError::FloatOpcode { opcode }) => assert!(opcode.starts_with("F32")),
            other => panic!("expected float rejection, got {other:?}"),
        }
    }

    #[test]
    fn scan_flags_incompatible_contract_code() {
        let entries = vec![
            code_entry_b64(clean_module(), 1),
            code_entry_b64(float_module(), 2),
        ];
        let found = scan_entries(entries.iter().map(String::as_str));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].contract_hash, hex::encode([2u8; 32]));
    }

    #[test]
    fn scan_skips_opaque_entries() {
        let entries = vec!["definitely not xdr".to_string()];
        assert!(scan_entries(entries.iter().map(String::as_str)).is_empty());
    }
}

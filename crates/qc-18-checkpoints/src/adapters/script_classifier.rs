//! Standard script template classifier
//!
//! Recognises the output templates relayed by default policy. Anything
//! else is `NonStandard`.

use crate::ports::outbound::{ScriptClass, ScriptClassifier};

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_1: u8 = 0x51;
pub const OP_3: u8 = 0x53;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// Largest payload accepted in a null-data output.
pub const MAX_DATA_CARRIER_SIZE: usize = 80;

/// Largest key count in a standard bare multisig output.
const MAX_STANDARD_MULTISIG_KEYS: usize = 3;

/// Default classifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardScriptClassifier;

impl ScriptClassifier for StandardScriptClassifier {
    fn classify(&self, pk_script: &[u8]) -> ScriptClass {
        if is_pubkey_hash(pk_script) {
            ScriptClass::PubKeyHash
        } else if is_script_hash(pk_script) {
            ScriptClass::ScriptHash
        } else if is_pubkey(pk_script) {
            ScriptClass::PubKey
        } else if is_multisig(pk_script) {
            ScriptClass::MultiSig
        } else if is_null_data(pk_script) {
            ScriptClass::NullData
        } else {
            ScriptClass::NonStandard
        }
    }
}

fn is_pubkey_hash(s: &[u8]) -> bool {
    s.len() == 25
        && s[0] == OP_DUP
        && s[1] == OP_HASH160
        && s[2] == 20
        && s[23] == OP_EQUALVERIFY
        && s[24] == OP_CHECKSIG
}

fn is_script_hash(s: &[u8]) -> bool {
    s.len() == 23 && s[0] == OP_HASH160 && s[1] == 20 && s[22] == OP_EQUAL
}

fn is_pubkey_bytes(key: &[u8]) -> bool {
    match key.len() {
        33 => key[0] == 0x02 || key[0] == 0x03,
        65 => key[0] == 0x04,
        _ => false,
    }
}

fn is_pubkey(s: &[u8]) -> bool {
    match s.split_last() {
        Some((&OP_CHECKSIG, body)) if !body.is_empty() => {
            body[0] as usize == body.len() - 1 && is_pubkey_bytes(&body[1..])
        }
        _ => false,
    }
}

/// Split `s` into pushed data items; `None` if any opcode is not a push.
fn parse_pushes(mut s: &[u8]) -> Option<Vec<&[u8]>> {
    let mut items = Vec::new();
    while let Some((&op, rest)) = s.split_first() {
        let (len, rest) = match op {
            OP_0 => (0, rest),
            1..=0x4b => (op as usize, rest),
            OP_PUSHDATA1 => {
                let (&len, rest) = rest.split_first()?;
                (len as usize, rest)
            }
            _ => return None,
        };
        if rest.len() < len {
            return None;
        }
        items.push(&rest[..len]);
        s = &rest[len..];
    }
    Some(items)
}

fn small_int(op: u8) -> Option<usize> {
    (OP_1..=OP_3).contains(&op).then(|| (op - OP_1 + 1) as usize)
}

fn is_multisig(s: &[u8]) -> bool {
    if s.len() < 3 || s[s.len() - 1] != OP_CHECKMULTISIG {
        return false;
    }
    let (Some(required), Some(total)) = (small_int(s[0]), small_int(s[s.len() - 2])) else {
        return false;
    };
    if required > total || total > MAX_STANDARD_MULTISIG_KEYS {
        return false;
    }
    match parse_pushes(&s[1..s.len() - 2]) {
        Some(keys) => keys.len() == total && keys.iter().all(|k| is_pubkey_bytes(k)),
        None => false,
    }
}

fn is_null_data(s: &[u8]) -> bool {
    match s.split_first() {
        Some((&OP_RETURN, rest)) => {
            if rest.is_empty() {
                return true;
            }
            matches!(parse_pushes(rest), Some(items) if items.len() == 1 && items[0].len() <= MAX_DATA_CARRIER_SIZE)
        }
        _ => false,
    }
}

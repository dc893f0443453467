//! Operation fixtures in node JSON form.

use crate::{block_hash, hash, raw_header_json, KT1};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

fn envelope(seed: u8, contents: Vec<Value>) -> Value {
    json!({
        "protocol": hash(0x31).to_string(),
        "chain_id": hash(0x32).to_string(),
        "hash": hash(seed).to_string(),
        "branch": block_hash(0).to_string(),
        "contents": contents,
        "signature": hash(0x24).to_string()
    })
}

fn manager(kind: &str, counter: u64) -> Value {
    json!({
        "kind": kind,
        "source": KT1,
        "fee": "1420",
        "counter": counter.to_string(),
        "gas_limit": "10600",
        "storage_limit": "300"
    })
}

fn with(mut base: Value, extra: Value) -> Value {
    if let (Value::Object(base), Value::Object(extra)) = (&mut base, extra) {
        base.extend(extra);
    }
    base
}

fn fees() -> Value {
    json!([
        {"kind": "contract", "contract": KT1, "change": "-1420", "origin": "block"},
        {"kind": "freezer", "category": "fees", "delegate": KT1, "cycle": 5, "change": "1420", "origin": "block"}
    ])
}

/// Endorsement operation with `slots` consecutive slots.
pub fn endorsement(level: i64, slots: usize) -> Value {
    envelope(
        0x40,
        vec![json!({
            "kind": "endorsement",
            "level": level,
            "metadata": {
                "balance_updates": [],
                "delegate": KT1,
                "slots": (0..slots as u64).collect::<Vec<_>>()
            }
        })],
    )
}

/// Applied transaction consuming `milligas`.
pub fn transaction(milligas: u64) -> Value {
    envelope(
        0x41,
        vec![with(
            manager("transaction", 1),
            json!({
                "amount": "1000000",
                "destination": KT1,
                "metadata": {
                    "balance_updates": fees(),
                    "operation_result": {
                        "status": "applied",
                        "consumed_milligas": milligas.to_string()
                    }
                }
            }),
        )],
    )
}

fn inlined_endorsement(level: i64) -> Value {
    json!({
        "branch": block_hash(level).to_string(),
        "operations": {"kind": "endorsement", "level": level},
        "signature": hash(0x24).to_string()
    })
}

fn script() -> Value {
    json!({
        "code": [
            {"prim": "parameter", "args": [{"prim": "unit"}]},
            {"prim": "storage", "args": [{"prim": "nat", "annots": ["%counter"]}]},
            {"prim": "code", "args": [[{"prim": "CDR"}, {"prim": "NIL", "args": [{"prim": "operation"}]}, {"prim": "PAIR"}]]}
        ],
        "storage": {"int": "0"}
    })
}

fn internal_results() -> Value {
    json!([
        {
            "kind": "reveal", "source": KT1, "nonce": 0, "public_key": hash(0x50).to_string(),
            "result": {"status": "applied", "consumed_gas": "1000"}
        },
        {
            "kind": "transaction", "source": KT1, "nonce": 1, "amount": "0", "destination": KT1,
            "parameters": {"entrypoint": "default", "value": {"bytes": "0a0b"}},
            "result": {"status": "applied", "consumed_milligas": "2500", "storage_size": "12"}
        },
        {
            "kind": "origination", "source": KT1, "nonce": 2, "balance": "0", "script": script(),
            "result": {
                "status": "applied", "originated_contracts": [KT1],
                "consumed_milligas": "1400", "storage_size": "200", "paid_storage_size_diff": "200"
            }
        },
        {
            "kind": "delegation", "source": KT1, "nonce": 3, "delegate": KT1,
            "result": {"status": "skipped"}
        },
        {
            "kind": "register_global_constant", "source": KT1, "nonce": 4,
            "value": {"string": "constant"},
            "result": {
                "status": "applied", "balance_updates": [], "consumed_gas": "1",
                "storage_size": "40", "global_address": hash(0x51).to_string()
            }
        }
    ])
}

/// Operation groups covering every content kind, result status, balance
/// update kind and internal result kind, plus one unknown content kind.
pub fn every_variant() -> Value {
    let double_baking = {
        let t: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;
        json!({
            "kind": "double_baking_evidence",
            "bh1": raw_header_json(5, t, &block_hash(4)),
            "bh2": raw_header_json(5, t, &block_hash(3)),
            "metadata": {"balance_updates": fees()}
        })
    };
    json!([
        [envelope(0x60, vec![
            json!({
                "kind": "endorsement",
                "level": 6,
                "metadata": {"balance_updates": fees(), "delegate": KT1, "slots": [1, 7, 9]}
            }),
            json!({
                "kind": "endorsement_with_slot",
                "endorsement": inlined_endorsement(6),
                "slot": 2,
                "metadata": {"balance_updates": [], "delegate": KT1, "slots": [2, 3]}
            })
        ])],
        [envelope(0x61, vec![
            json!({
                "kind": "proposals", "source": KT1, "period": 50,
                "proposals": [hash(0x31).to_string()], "metadata": {}
            }),
            json!({
                "kind": "ballot", "source": KT1, "period": 51,
                "proposal": hash(0x31).to_string(), "ballot": "yay", "metadata": {}
            })
        ])],
        [envelope(0x62, vec![
            json!({
                "kind": "seed_nonce_revelation", "level": 4, "nonce": "aa01",
                "metadata": {"balance_updates": fees()}
            }),
            json!({
                "kind": "double_endorsement_evidence",
                "op1": inlined_endorsement(5), "op2": inlined_endorsement(5), "slot": 3,
                "metadata": {"balance_updates": fees()}
            }),
            double_baking,
            json!({
                "kind": "activate_account", "pkh": KT1, "secret": "41f98b15efc63fa893d61d7d6eee4a2ce9427ac4",
                "metadata": {"balance_updates": []}
            })
        ])],
        [envelope(0x63, vec![
            with(manager("reveal", 1), json!({
                "public_key": hash(0x50).to_string(),
                "metadata": {
                    "balance_updates": fees(),
                    "operation_result": {"status": "applied", "consumed_gas": "1000", "consumed_milligas": "1000000"}
                }
            })),
            with(manager("transaction", 2), json!({
                "amount": "0",
                "destination": KT1,
                "parameters": {
                    "entrypoint": "mint",
                    "value": {"prim": "Pair", "args": [{"int": "-42"}, {"string": "tez"}, [{"bytes": "ff"}]]}
                },
                "metadata": {
                    "balance_updates": fees(),
                    "operation_result": {
                        "status": "applied",
                        "storage": {"prim": "Pair", "args": [{"int": "1"}, {"prim": "Unit"}]},
                        "big_map_diff": [{"action": "alloc", "big_map": "12", "key_type": {"prim": "nat"}}],
                        "balance_updates": [],
                        "consumed_milligas": "5000",
                        "storage_size": "1000",
                        "paid_storage_size_diff": "12",
                        "lazy_storage_diff": [{"kind": "big_map", "id": "12", "diff": {"action": "alloc"}}]
                    },
                    "internal_operation_results": internal_results()
                }
            })),
            with(manager("origination", 3), json!({
                "balance": "10",
                "delegate": KT1,
                "script": script(),
                "metadata": {
                    "balance_updates": fees(),
                    "operation_result": {
                        "status": "backtracked",
                        "errors": [{"kind": "temporary", "id": "proto.gas_exhausted.operation"}],
                        "originated_contracts": [KT1],
                        "consumed_gas": "1400",
                        "storage_size": "200"
                    }
                }
            })),
            with(manager("delegation", 4), json!({
                "delegate": KT1,
                "metadata": {
                    "balance_updates": fees(),
                    "operation_result": {
                        "status": "failed",
                        "errors": [{
                            "kind": "permanent", "id": "proto.contract.balance_too_low",
                            "contract": KT1, "balance": "10", "amount": "20"
                        }]
                    }
                }
            })),
            with(manager("register_global_constant", 5), json!({
                "value": {"prim": "Unit"},
                "metadata": {
                    "balance_updates": fees(),
                    "operation_result": {"status": "skipped"}
                }
            })),
            json!({"kind": "preendorsement", "slot": 4, "level": 6, "round": 0, "payload": {"a": [1, -2, 3.5]}})
        ])]
    ])
}

/// Protocol-synthesised results for block metadata.
pub fn implicit_results() -> Value {
    json!([
        {"kind": "transaction", "balance_updates": [], "consumed_milligas": "2100", "storage_size": "4632"},
        {"kind": "origination", "originated_contracts": [KT1], "consumed_gas": "1", "storage_size": "4632"}
    ])
}

use crate::decode::{decode_body, discriminated_serde, unknown, DecodeError, Discriminated};
use crate::hash::Base58Hash;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceUpdate {
    Contract(ContractBalanceUpdate),
    Freezer(FreezerBalanceUpdate),
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractBalanceUpdate {
    pub contract: Base58Hash,
    #[serde_as(as = "DisplayFromStr")]
    pub change: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FreezerBalanceUpdate {
    pub category: String,
    pub delegate: Base58Hash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<i64>,
    #[serde_as(as = "DisplayFromStr")]
    pub change: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl BalanceUpdate {
    pub fn change(&self) -> i64 {
        match self {
            BalanceUpdate::Contract(u) => u.change,
            BalanceUpdate::Freezer(u) => u.change,
        }
    }

    pub fn origin(&self) -> Option<&str> {
        match self {
            BalanceUpdate::Contract(u) => u.origin.as_deref(),
            BalanceUpdate::Freezer(u) => u.origin.as_deref(),
        }
    }
}

impl Discriminated for BalanceUpdate {
    const FIELD: &'static str = "kind";
    const WHAT: &'static str = "balance update";

    fn tag(&self) -> &str {
        match self {
            BalanceUpdate::Contract(_) => "contract",
            BalanceUpdate::Freezer(_) => "freezer",
        }
    }

    fn from_tagged(tag: &str, body: Map<String, Value>) -> Result<Self, DecodeError> {
        match tag {
            "contract" => decode_body(Self::WHAT, tag, body).map(BalanceUpdate::Contract),
            "freezer" => decode_body(Self::WHAT, tag, body).map(BalanceUpdate::Freezer),
            _ => Err(unknown(Self::WHAT, Self::FIELD, tag)),
        }
    }

    fn body(&self) -> Result<Value, serde_json::Error> {
        match self {
            BalanceUpdate::Contract(u) => serde_json::to_value(u),
            BalanceUpdate::Freezer(u) => serde_json::to_value(u),
        }
    }
}

discriminated_serde!(BalanceUpdate);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_both_kinds() {
        let raw = json!([
            {"kind": "contract", "contract": "KT1MruMYHugk6x7qWQGeFKoV4fuarhTfoV6t",
             "change": "-1500", "origin": "block"},
            {"kind": "freezer", "category": "deposits",
             "delegate": "KT1MruMYHugk6x7qWQGeFKoV4fuarhTfoV6t",
             "cycle": 420, "change": "1500", "origin": "block"}
        ]);
        let updates: Vec<BalanceUpdate> = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(updates[0].change(), -1500);
        assert!(matches!(&updates[1], BalanceUpdate::Freezer(f) if f.cycle == Some(420)));
        assert_eq!(updates.iter().map(BalanceUpdate::change).sum::<i64>(), 0);
        assert_eq!(serde_json::to_value(&updates).unwrap(), raw);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let raw = json!({"kind": "minted", "change": "1"});
        let err = serde_json::from_value::<BalanceUpdate>(raw).unwrap_err();
        assert!(err.to_string().contains("unknown kind `minted`"));
    }

    #[test]
    fn unexpected_field_is_an_error() {
        let raw = json!({"kind": "contract", "contract": "KT1MruMYHugk6x7qWQGeFKoV4fuarhTfoV6t",
                         "change": "1", "surprise": 1});
        assert!(serde_json::from_value::<BalanceUpdate>(raw).is_err());
    }
}

// Wire shapes of the declarative block record and of the task report
// sent back to its self link. Unknown fields are carried through
// verbatim so reports never drop data the caller stored on the block.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Lifecycle state of a block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockState {
    Unbound,
    Binding,
    Bound,
    Unbinding,
    Error,
    Template,
}

/// Inbound request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[serde(default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub block: Option<Block>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The declarative record describing desired device configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub input_properties: Vec<Property>,
    #[serde(default)]
    pub data_properties: Vec<Property>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a property bag.
///
/// Composite properties carry a nested `[Property]` array as their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Property {
    pub fn new(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            value,
            ..Self::default()
        }
    }
}

/// Body PATCHed to a block's self link on every state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub sub_status: String,
    pub block: ReportedBlock,
}

/// Sub-status tagging a report as a block update.
pub const UPDATE_BLOCK_WITH_RESPONSE: &str = "UPDATE_BLOCK_WITH_RESPONSE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedBlock {
    pub state: BlockState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub input_properties: Vec<Property>,
    pub data_properties: Vec<Property>,
}

impl TaskReport {
    pub fn new(state: BlockState, error: Option<String>, block: &Block) -> Self {
        Self {
            sub_status: UPDATE_BLOCK_WITH_RESPONSE.into(),
            block: ReportedBlock {
                state,
                error,
                input_properties: block.input_properties.clone(),
                data_properties: block.data_properties.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn block_state_spellings() {
        assert_eq!(BlockState::Unbound.to_string(), "UNBOUND");
        assert_eq!("TEMPLATE".parse::<BlockState>().ok(), Some(BlockState::Template));
        assert_eq!(
            serde_json::to_value(BlockState::Error).ok(),
            Some(json!("ERROR"))
        );
    }

    #[test]
    fn unknown_property_fields_round_trip() {
        let raw = json!({
            "id": "hostname",
            "type": "STRING",
            "value": "bigip1",
            "provider": "bigip1",
            "metaData": { "description": "Host name" }
        });
        let prop: Property = serde_json::from_value(raw.clone()).expect("property");
        assert_eq!(prop.kind.as_deref(), Some("STRING"));
        assert_eq!(serde_json::to_value(&prop).expect("serialize"), raw);
    }

    #[test]
    fn report_body_shape() {
        let block = Block {
            id: Some("b1".into()),
            input_properties: vec![Property::new("hostname", json!("bigip1"))],
            ..Block::default()
        };
        let report = TaskReport::new(BlockState::Bound, None, &block);
        assert_eq!(
            serde_json::to_value(&report).expect("serialize"),
            json!({
                "subStatus": "UPDATE_BLOCK_WITH_RESPONSE",
                "block": {
                    "state": "BOUND",
                    "inputProperties": [{ "id": "hostname", "value": "bigip1" }],
                    "dataProperties": []
                }
            })
        );
    }
}

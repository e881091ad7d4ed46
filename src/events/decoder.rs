//! Event decoding against a JSON ABI schema.

use alloy::dyn_abi::{DynSolValue, EventExt};
use alloy::json_abi::{Event, JsonAbi};
use alloy::primitives::B256;

use crate::chain::types::{HarnessError, HarnessResult, LogEntry};
use crate::contract::abi::DecodedValues;

/// One decoded log: the event name and its fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub name: String,
    pub fields: DecodedValues,
}

/// Decodes logs emitted as one event.
///
/// Indexed dynamic fields (`bytes`, `string`, arrays) are only available as
/// their 32-byte topic hash and decode to `bytes32`.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    event: Event,
}

impl EventDecoder {
    pub fn new(event: Event) -> Self {
        Self { event }
    }

    /// Look up `name` in a contract ABI.
    pub fn from_abi(abi: &JsonAbi, name: &str) -> HarnessResult<Self> {
        abi.event(name)
            .and_then(|events| events.first())
            .cloned()
            .map(Self::new)
            .ok_or_else(|| HarnessError::AbiDecoding(format!("ABI has no event '{}'", name)))
    }

    pub fn name(&self) -> &str {
        &self.event.name
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    /// First topic of every non-anonymous log of this event.
    pub fn selector(&self) -> B256 {
        self.event.selector()
    }

    /// Whether `log` carries this event's selector.
    pub fn matches(&self, log: &LogEntry) -> bool {
        !self.event.anonymous && log.topics.first() == Some(&self.selector())
    }

    /// Decode one log. Topic count and data layout must match the schema.
    pub fn decode_log(&self, log: &LogEntry) -> HarnessResult<DecodedEvent> {
        let decoded = self
            .event
            .decode_log_parts(log.topics.iter().copied(), &log.data)
            .map_err(|e| HarnessError::AbiDecoding(format!("event {}: {}", self.event.name, e)))?;

        let mut indexed = decoded.indexed.into_iter();
        let mut body = decoded.body.into_iter();
        let values = self
            .event
            .inputs
            .iter()
            .map(|param| if param.indexed { indexed.next() } else { body.next() })
            .collect::<Option<Vec<DynSolValue>>>()
            .ok_or_else(|| {
                HarnessError::AbiDecoding(format!(
                    "event {}: decoded fewer values than declared",
                    self.event.name
                ))
            })?;

        Ok(DecodedEvent {
            name: self.event.name.clone(),
            fields: DecodedValues::new(self.event.inputs.iter().map(|p| p.name.clone()), values),
        })
    }

    /// Decode the first log of this event, in receipt order.
    pub fn decode_first(&self, logs: &[LogEntry]) -> HarnessResult<DecodedEvent> {
        self.decode_nth(logs, 0)
    }

    /// Decode the `n`th (zero-based) log of this event, skipping logs of
    /// other events.
    pub fn decode_nth(&self, logs: &[LogEntry], n: usize) -> HarnessResult<DecodedEvent> {
        let log = logs
            .iter()
            .filter(|log| self.matches(log))
            .nth(n)
            .ok_or_else(|| HarnessError::EventNotFound(self.event.name.clone()))?;
        self.decode_log(log)
    }

    /// Decode every log of this event, in receipt order.
    pub fn decode_all(&self, logs: &[LogEntry]) -> HarnessResult<Vec<DecodedEvent>> {
        logs.iter()
            .filter(|log| self.matches(log))
            .map(|log| self.decode_log(log))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{keccak256, Address, Bytes, U256};

    fn bid_event_abi() -> JsonAbi {
        JsonAbi::parse([
            "event BidEvent(bytes16 bidId, bytes bidData, address kettle)",
            "event HintEvent(bytes16 indexed bidId, uint64 decryptionCondition, bytes hint)",
            "event Other(uint256 value)",
        ])
        .unwrap()
    }

    fn bid_log(decoder: &EventDecoder, bid_id: [u8; 16], data: &[u8], kettle: Address) -> LogEntry {
        let body = DynSolValue::Tuple(vec![
            DynSolValue::FixedBytes(B256::right_padding_from(&bid_id), 16),
            DynSolValue::Bytes(data.to_vec()),
            DynSolValue::Address(kettle),
        ])
        .abi_encode_params();
        LogEntry { address: Address::ZERO, topics: vec![decoder.selector()], data: body.into() }
    }

    #[test]
    fn test_decodes_fields_by_name() {
        let decoder = EventDecoder::from_abi(&bid_event_abi(), "BidEvent").unwrap();
        let kettle = Address::repeat_byte(0x33);
        let bid_id = [0x5au8; 16];
        let log = bid_log(&decoder, bid_id, b"payload", kettle);

        let event = decoder.decode_log(&log).unwrap();
        assert_eq!(event.name, "BidEvent");
        assert_eq!(event.fields.fixed_bytes::<16>("bidId").unwrap(), bid_id);
        assert_eq!(event.fields.bytes("bidData").unwrap(), Bytes::from_static(b"payload"));
        assert_eq!(event.fields.address("kettle").unwrap(), kettle);
    }

    #[test]
    fn test_selector_is_signature_hash() {
        let decoder = EventDecoder::from_abi(&bid_event_abi(), "BidEvent").unwrap();
        assert_eq!(decoder.selector(), keccak256("BidEvent(bytes16,bytes,address)"));
    }

    #[test]
    fn test_indexed_field_comes_from_topic() {
        let decoder = EventDecoder::from_abi(&bid_event_abi(), "HintEvent").unwrap();
        let bid_id = [0x01u8; 16];
        let body = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(7u64), 64),
            DynSolValue::Bytes(b"hint".to_vec()),
        ])
        .abi_encode_params();
        let log = LogEntry {
            address: Address::ZERO,
            topics: vec![decoder.selector(), B256::right_padding_from(&bid_id)],
            data: body.into(),
        };

        let event = decoder.decode_log(&log).unwrap();
        let names: Vec<&str> = event.fields.names().collect();
        assert_eq!(names, ["bidId", "decryptionCondition", "hint"]);
        assert_eq!(event.fields.fixed_bytes::<16>("bidId").unwrap(), bid_id);
        assert_eq!(event.fields.bytes("hint").unwrap(), Bytes::from_static(b"hint"));
    }

    #[test]
    fn test_wrong_topic_count_fails() {
        let decoder = EventDecoder::from_abi(&bid_event_abi(), "HintEvent").unwrap();
        let log = LogEntry {
            address: Address::ZERO,
            topics: vec![decoder.selector()],
            data: Bytes::new(),
        };
        assert!(matches!(decoder.decode_log(&log), Err(HarnessError::AbiDecoding(_))));
    }

    #[test]
    fn test_wrong_schema_fails() {
        let decoder = EventDecoder::from_abi(&bid_event_abi(), "BidEvent").unwrap();
        let log = LogEntry {
            address: Address::ZERO,
            topics: vec![decoder.selector()],
            data: Bytes::from(vec![0u8; 16]),
        };
        assert!(matches!(decoder.decode_log(&log), Err(HarnessError::AbiDecoding(_))));
    }

    #[test]
    fn test_nth_skips_other_events() {
        let abi = bid_event_abi();
        let decoder = EventDecoder::from_abi(&abi, "BidEvent").unwrap();
        let other = EventDecoder::from_abi(&abi, "Other").unwrap();

        let logs = vec![
            LogEntry {
                address: Address::ZERO,
                topics: vec![other.selector()],
                data: DynSolValue::Uint(U256::from(1u8), 256).abi_encode().into(),
            },
            bid_log(&decoder, [1u8; 16], b"first", Address::ZERO),
            bid_log(&decoder, [2u8; 16], b"second", Address::ZERO),
        ];

        let second = decoder.decode_nth(&logs, 1).unwrap();
        assert_eq!(second.fields.fixed_bytes::<16>("bidId").unwrap(), [2u8; 16]);
        let first = decoder.decode_first(&logs).unwrap();
        assert_eq!(first.fields.bytes("bidData").unwrap().as_ref(), b"first");
        assert_eq!(decoder.decode_all(&logs).unwrap().len(), 2);
        assert!(matches!(decoder.decode_nth(&logs, 2), Err(HarnessError::EventNotFound(_))));
    }

    #[test]
    fn test_missing_event_in_abi() {
        assert!(EventDecoder::from_abi(&bid_event_abi(), "Nope").is_err());
    }
}

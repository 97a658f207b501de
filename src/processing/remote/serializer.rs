use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SerializationError(pub String);

/// Wire format of a remote backend. Works on `serde_json::Value` so it stays object safe.
pub trait RemoteQuerySerializer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, SerializationError>;
    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, SerializationError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRemoteQuerySerializer;

impl RemoteQuerySerializer for JsonRemoteQuerySerializer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(value).map_err(|e| SerializationError(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, SerializationError> {
        serde_json::from_slice(bytes).map_err(|e| SerializationError(e.to_string()))
    }
}

pub fn serialize<T: Serialize>(
    serializer: &dyn RemoteQuerySerializer,
    value: &T,
) -> Result<Vec<u8>, SerializationError> {
    let value = serde_json::to_value(value).map_err(|e| SerializationError(e.to_string()))?;
    serializer.encode(&value)
}

pub fn deserialize<T: DeserializeOwned>(
    serializer: &dyn RemoteQuerySerializer,
    bytes: &[u8],
) -> Result<T, SerializationError> {
    let value = serializer.decode(bytes)?;
    serde_json::from_value(value).map_err(|e| SerializationError(e.to_string()))
}

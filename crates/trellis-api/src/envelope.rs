//! Response envelopes shared by all resource families.
//!
//! Lists are `{success, count, data}`; single reads are `{success, data}`;
//! mutations add a `message`.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ListEnvelope<T> {
  pub success: bool,
  pub count:   usize,
  pub data:    Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub data:    T,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
  pub success: bool,
  pub message: String,
}

pub fn list<T>(data: Vec<T>) -> Json<ListEnvelope<T>> {
  Json(ListEnvelope { success: true, count: data.len(), data })
}

pub fn data<T>(data: T) -> Json<DataEnvelope<T>> {
  Json(DataEnvelope { success: true, message: None, data })
}

pub fn message_data<T>(message: &str, data: T) -> Json<DataEnvelope<T>> {
  Json(DataEnvelope {
    success: true,
    message: Some(message.to_owned()),
    data,
  })
}

pub fn message(message: &str) -> Json<MessageEnvelope> {
  Json(MessageEnvelope { success: true, message: message.to_owned() })
}

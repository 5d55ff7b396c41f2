//! Integration tests against a mock Courier backend

mod batch;
mod chat;
mod lora;
mod mock_server;
mod models;
mod streaming;

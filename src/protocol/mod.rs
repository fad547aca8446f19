//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Binary Frames)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │   Payload (bincode Command) │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GET       - key
//! - 0x02: PUT       - key, value
//! - 0x03: DEL       - key
//! - 0x04: PING      - empty
//! - 0x05: MULTI_GET - keys
//! - 0x06: ITERATE   - scan arguments
//! - 0x07: BATCH     - put/delete operations
//! - 0x08: PROPERTY  - property name
//! - 0x09: SNAPSHOT  - destination path
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR
//! - 0x03: BAD_REQUEST
//! - 0x04: TOO_LARGE

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType, IterateArgs};
pub use response::{IterateReply, KeyValue, MultiGetReply, Response, ScanItem, Status};

//! Command Service
//!
//! Routes decoded client commands to the engine and the operations built on
//! it, and turns every outcome into a [`Response`].
//!
//! | Command   | Success                         | Failure                     |
//! |-----------|---------------------------------|-----------------------------|
//! | GET       | OK + value / NOT_FOUND          | ERROR / TOO_LARGE           |
//! | MULTI_GET | OK + [`MultiGetReply`]          | ERROR / TOO_LARGE           |
//! | ITERATE   | OK + [`IterateReply`]           | ERROR / TOO_LARGE           |
//! | BATCH     | OK + applied count              | BAD_REQUEST / TOO_LARGE     |
//! | PROPERTY  | OK + text / NOT_FOUND           |                             |
//! | SNAPSHOT  | OK + exported count             | BAD_REQUEST / ERROR         |
//!
//! No reply payload exceeds [`MAX_PAYLOAD_SIZE`]. ITERATE stops early and
//! sets `more` when the next item would not fit; any other reply that is too
//! large becomes TOO_LARGE.

use std::ops::{Bound, ControlFlow};
use std::sync::Arc;

use crate::engine::Engine;
use crate::error::{KvError, Result};
use crate::ops::{multi_get, BatchMutator, RangeIterator, SnapshotExporter};
use crate::protocol::{
    Command, IterateArgs, IterateReply, KeyValue, MultiGetReply, Response, ScanItem,
    MAX_PAYLOAD_SIZE,
};

/// Encoded size of an `IterateReply` with no items (flag + item count)
const ITERATE_REPLY_OVERHEAD: u64 = 1 + 8;

/// Executes commands against one engine
#[derive(Clone)]
pub struct Service {
    engine: Arc<Engine>,
}

impl Service {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Execute a command; failures become error responses
    pub fn execute(&self, command: Command) -> Response {
        let cmd_type = command.command_type();
        match self.dispatch(command).and_then(Self::check_size) {
            Ok(response) => response,
            Err(e) => {
                if e.is_validation() || matches!(e, KvError::AlreadyExists(_)) {
                    tracing::debug!("{:?} rejected: {}", cmd_type, e);
                } else {
                    tracing::warn!("{:?} failed: {}", cmd_type, e);
                }
                Response::from_error(&e)
            }
        }
    }

    fn dispatch(&self, command: Command) -> Result<Response> {
        match command {
            Command::Get { key } => Ok(match self.engine.get(&key)? {
                Some(value) => Response::ok(Some(value)),
                None => Response::not_found(),
            }),

            Command::Put { key, value } => {
                self.engine.put(&key, &value)?;
                Ok(Response::ok(None))
            }

            Command::Delete { key } => {
                self.engine.delete(&key)?;
                Ok(Response::ok(None))
            }

            Command::Ping => Ok(Response::ok(Some(b"PONG".to_vec()))),

            Command::MultiGet { keys } => {
                let data = multi_get(&*self.engine, &keys)?
                    .into_iter()
                    .map(|(key, value)| KeyValue { key, value })
                    .collect();
                Response::ok_encoded(&MultiGetReply { data })
            }

            Command::Iterate(args) => Response::ok_encoded(&self.iterate(&args)?),

            Command::Batch { ops } => {
                let applied = BatchMutator::new(&*self.engine).apply(&ops)?;
                Ok(Response::ok(Some(applied.to_string().into_bytes())))
            }

            Command::Property { name } => Ok(match self.engine.property(&name) {
                Some(value) => Response::ok(Some(value.into_bytes())),
                None => Response::not_found(),
            }),

            Command::Snapshot { destination } => {
                if destination.is_empty() {
                    return Err(KvError::Protocol("missing snapshot destination".to_string()));
                }
                let stats = SnapshotExporter::new(&*self.engine).export(&destination)?;
                Ok(Response::ok(Some(stats.entries.to_string().into_bytes())))
            }
        }
    }

    fn check_size(response: Response) -> Result<Response> {
        let size = response.payload.as_ref().map_or(0, Vec::len);
        if size > MAX_PAYLOAD_SIZE as usize {
            return Err(KvError::ReplyTooLarge {
                size,
                max: MAX_PAYLOAD_SIZE as usize,
            });
        }
        Ok(response)
    }

    fn iterate(&self, args: &IterateArgs) -> Result<IterateReply> {
        let request = args.to_scan_request();
        let mut data = Vec::with_capacity(request.limit().min(64));

        let budget = u64::from(MAX_PAYLOAD_SIZE) - ITERATE_REPLY_OVERHEAD;
        let mut used = 0u64;
        // Size of the first item that did not fit, if the payload cap cut the scan
        let mut overflow: Option<u64> = None;
        let mut failure: Option<KvError> = None;

        let summary = RangeIterator::new(&*self.engine).scan_with(&request, |key, value| {
            let item = if args.include_values {
                ScanItem::Pair(KeyValue {
                    key: key.to_vec(),
                    value: value.to_vec(),
                })
            } else {
                ScanItem::Key(key.to_vec())
            };

            let size = match bincode::serialized_size(&item) {
                Ok(size) => size,
                Err(e) => {
                    failure = Some(e.into());
                    return ControlFlow::Break(());
                }
            };
            if used + size > budget {
                overflow = Some(size);
                return ControlFlow::Break(());
            }

            used += size;
            data.push(item);
            ControlFlow::Continue(())
        })?;

        if let Some(e) = failure {
            return Err(e);
        }

        let more = match overflow {
            Some(size) if data.is_empty() => {
                return Err(KvError::ReplyTooLarge {
                    size: (size + ITERATE_REPLY_OVERHEAD) as usize,
                    max: MAX_PAYLOAD_SIZE as usize,
                });
            }
            Some(_) => {
                tracing::debug!(
                    "ITERATE reply capped at {} items ({} bytes)",
                    data.len(),
                    used + ITERATE_REPLY_OVERHEAD
                );
                !matches!(request.end(), Bound::Unbounded)
            }
            None => summary.truncated,
        };

        Ok(IterateReply { more, data })
    }
}

//! TCP Client
//!
//! Blocking client speaking the binary protocol, with one typed helper
//! per command.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{KvError, Result};
use crate::ops::OpRecord;
use crate::protocol::{
    read_response, write_command, Command, IterateArgs, IterateReply, MultiGetReply, Response,
    Status,
};

/// A connection to a SortKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Set the read timeout (`None` waits forever, as snapshots may need)
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Send a command and wait for its raw response
    pub fn send(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    pub fn ping(&mut self) -> Result<()> {
        expect_ok(self.send(&Command::Ping)?).map(|_| ())
    }

    /// Fetch a value; `None` when the key is absent
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let response = self.send(&Command::Get { key: key.to_vec() })?;
        if response.status == Status::NotFound {
            return Ok(None);
        }
        Ok(Some(expect_ok(response)?.payload.unwrap_or_default()))
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let command = Command::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        };
        expect_ok(self.send(&command)?).map(|_| ())
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        expect_ok(self.send(&Command::Delete { key: key.to_vec() })?).map(|_| ())
    }

    /// Fetch several keys; absent keys are omitted from the reply
    pub fn multi_get(&mut self, keys: Vec<Vec<u8>>) -> Result<MultiGetReply> {
        expect_ok(self.send(&Command::MultiGet { keys })?)?.decode()
    }

    pub fn iterate(&mut self, args: IterateArgs) -> Result<IterateReply> {
        expect_ok(self.send(&Command::Iterate(args))?)?.decode()
    }

    /// Apply operations atomically, returning how many were applied
    pub fn batch(&mut self, ops: Vec<OpRecord>) -> Result<usize> {
        let response = expect_ok(self.send(&Command::Batch { ops })?)?;
        parse_count(&response)
    }

    /// Look up an engine property; `None` for unknown names
    pub fn property(&mut self, name: &str) -> Result<Option<String>> {
        let response = self.send(&Command::Property {
            name: name.to_string(),
        })?;
        if response.status == Status::NotFound {
            return Ok(None);
        }
        Ok(Some(expect_ok(response)?.message()))
    }

    /// Export a snapshot to `destination` on the server, returning the
    /// number of entries copied
    pub fn snapshot(&mut self, destination: &str) -> Result<u64> {
        let response = expect_ok(self.send(&Command::Snapshot {
            destination: destination.to_string(),
        })?)?;
        Ok(parse_count(&response)? as u64)
    }
}

/// Turn a non-OK response into the error it reports
fn expect_ok(response: Response) -> Result<Response> {
    match response.status {
        Status::Ok => Ok(response),
        Status::NotFound => Err(KvError::KeyNotFound),
        Status::BadRequest => Err(KvError::Protocol(response.message())),
        Status::TooLarge | Status::Error => Err(KvError::Network(format!(
            "server returned {:?}: {}",
            response.status,
            response.message()
        ))),
    }
}

fn parse_count(response: &Response) -> Result<usize> {
    response
        .message()
        .parse()
        .map_err(|_| KvError::Protocol(format!("expected a count, got {:?}", response.message())))
}

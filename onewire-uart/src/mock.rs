//! Scripted UART transport for host-side tests.

use std::collections::VecDeque;

use crate::transport::{Baudrate, UartTransport};

/// What the scripted wire does with the next exchanged buffer.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Overwrite the buffer with these bytes; lengths must match.
    Bytes(Vec<u8>),
    /// Leave the buffer untouched: the line echoes the master verbatim.
    Echo,
    /// Fail the exchange.
    Fail,
}

/// Error produced by [`MockUart`] on scripted failures and script underrun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// Replay transport: a queue of per-exchange replies, a capture of every
/// transmitted buffer, and a record of baud-rate changes.
#[derive(Debug, Default)]
pub struct MockUart {
    replies: VecDeque<Reply>,
    written: Vec<Vec<u8>>,
    baud_changes: Vec<Baudrate>,
    refuse_baud: bool,
}

impl MockUart {
    /// A transport with an empty script; any exchange fails until replies
    /// are queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reply to the script.
    pub fn push(&mut self, reply: Reply) -> &mut Self {
        self.replies.push_back(reply);
        self
    }

    /// Make every subsequent baud-rate change fail.
    pub fn refuse_baudrate(&mut self) {
        self.refuse_baud = true;
    }

    /// Every buffer the master transmitted, in order.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Every baud rate the master selected, in order.
    pub fn baud_changes(&self) -> &[Baudrate] {
        &self.baud_changes
    }
}

impl UartTransport for MockUart {
    type Error = MockError;

    fn init(&mut self) -> Result<(), MockError> {
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), MockError> {
        Ok(())
    }

    fn set_baudrate(&mut self, baudrate: Baudrate) -> Result<(), MockError> {
        if self.refuse_baud {
            return Err(MockError);
        }
        self.baud_changes.push(baudrate);
        Ok(())
    }

    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), MockError> {
        self.written.push(buf.to_vec());
        match self.replies.pop_front() {
            Some(Reply::Bytes(bytes)) => {
                assert_eq!(bytes.len(), buf.len(), "scripted reply length");
                buf.copy_from_slice(&bytes);
                Ok(())
            }
            Some(Reply::Echo) => Ok(()),
            Some(Reply::Fail) | None => Err(MockError),
        }
    }
}

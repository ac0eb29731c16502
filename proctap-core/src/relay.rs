//! Message relay
//!
//! Prints every message received from the injected agent, one line each, in
//! receipt order. Error messages print their stack trace; everything else
//! prints as the raw JSON value. No filtering, no buffering, no backpressure.

use std::io::{self, Write};

use crate::message::AgentMessage;

/// Writes relayed agent messages to a sink (stdout in the controller binary).
#[derive(Debug)]
pub struct MessageRelay<W> {
    out: W,
}

impl<W: Write> MessageRelay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print one message. Flushes after each line so output stays live while
    /// the controller blocks on stdin.
    pub fn deliver(&mut self, message: &AgentMessage) -> io::Result<()> {
        match message {
            AgentMessage::Error(detail) => writeln!(self.out, "{}", detail.stack)?,
            AgentMessage::Raw(value) => writeln!(self.out, "{value}")?,
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

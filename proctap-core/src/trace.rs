//! Trace orchestration
//!
//! Wires the linear flow: attach to the target, inject the agent, register
//! the message sink, start execution. The sink is always registered before
//! the script starts so early messages are not dropped.

use std::io::{self, BufRead};

use anyhow::Result;

use crate::agent::AgentSource;
use crate::engine::{Engine, InjectedScript, MessageSink, ProcessSession};
use crate::target::Target;

/// Live handles for a deployed trace. Both must stay alive for as long as
/// messages should keep flowing; dropping them is the implicit teardown.
pub struct ActiveTrace<S: ProcessSession> {
    pub session: S,
    pub script: S::Script,
}

/// Attach, inject, subscribe, start.
///
/// The agent source is taken already-loaded, so a file-read failure has
/// already aborted the run before the engine is touched.
pub fn deploy<E: Engine>(
    engine: &mut E,
    target: &Target,
    agent: &AgentSource,
    sink: MessageSink,
) -> Result<ActiveTrace<E::Session>> {
    let mut session = engine.attach(target)?;
    let mut script = session.inject(agent.source())?;
    script.subscribe(sink)?;
    script.start()?;
    Ok(ActiveTrace { session, script })
}

/// Block until `input` reaches EOF, discarding anything read.
///
/// Keeps the controller process alive while the engine delivers messages in
/// the background; closing stdin (or killing the process) is the only way
/// out.
pub fn hold_until_eof(mut input: impl BufRead) -> io::Result<()> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::AgentMessage;
    use crate::relay::MessageRelay;
    use std::fs;
    use std::io::{Cursor, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CallLog(Arc<Mutex<Vec<String>>>);

    impl CallLog {
        fn push(&self, entry: impl Into<String>) {
            self.0.lock().unwrap().push(entry.into());
        }

        fn entries(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct MockEngine {
        log: CallLog,
    }

    struct MockSession {
        log: CallLog,
    }

    struct MockScript {
        log: CallLog,
        sink: Option<MessageSink>,
    }

    impl Engine for MockEngine {
        type Session = MockSession;

        fn attach(&mut self, target: &Target) -> Result<MockSession> {
            self.log.push(format!("attach:{target}"));
            Ok(MockSession {
                log: self.log.clone(),
            })
        }
    }

    impl ProcessSession for MockSession {
        type Script = MockScript;

        fn inject(&mut self, source: &str) -> Result<MockScript> {
            self.log.push(format!("inject:{source}"));
            Ok(MockScript {
                log: self.log.clone(),
                sink: None,
            })
        }
    }

    impl InjectedScript for MockScript {
        fn subscribe(&mut self, sink: MessageSink) -> Result<()> {
            self.log.push("subscribe");
            self.sink = Some(sink);
            Ok(())
        }

        fn start(&mut self) -> Result<()> {
            anyhow::ensure!(self.sink.is_some(), "no sink registered");
            self.log.push("start");
            Ok(())
        }
    }

    /// Shared writer so the test can inspect what the sink printed.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn agent_on_disk(source: &str) -> (tempfile::TempDir, AgentSource) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_agent.js");
        fs::write(&path, source).unwrap();
        let agent = AgentSource::load(&path).unwrap();
        (dir, agent)
    }

    #[test]
    fn test_missing_agent_fails_before_engine_is_touched() {
        let log = CallLog::default();
        let dir = tempfile::tempdir().unwrap();

        let loaded = AgentSource::load(dir.path().join("absent.js"));
        assert!(loaded.is_err());
        // deploy was never reachable without a loaded agent
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_deploy_subscribes_before_start() {
        let log = CallLog::default();
        let (_dir, agent) = agent_on_disk("hello();");
        let mut engine = MockEngine { log: log.clone() };

        deploy(
            &mut engine,
            &Target::Name("calc".into()),
            &agent,
            Box::new(|_| {}),
        )
        .unwrap();

        assert_eq!(
            log.entries(),
            vec!["attach:calc", "inject:hello();", "subscribe", "start"]
        );
    }

    #[test]
    fn test_start_without_subscribe_is_an_error() {
        let log = CallLog::default();
        let mut script = MockScript {
            log: log.clone(),
            sink: None,
        };
        assert!(script.start().is_err());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_end_to_end_error_message_relays_stack() {
        let log = CallLog::default();
        let (_dir, agent) = agent_on_disk("hello();");
        let mut engine = MockEngine { log: log.clone() };

        let buf = SharedBuf::default();
        let mut relay = MessageRelay::new(buf.clone());
        let sink: MessageSink = Box::new(move |message| {
            relay.deliver(&message).unwrap();
        });

        let mut trace = deploy(&mut engine, &Target::Pid(4242), &agent, sink).unwrap();

        let entries = log.entries();
        assert_eq!(entries[0], "attach:4242");
        assert_eq!(entries[1], "inject:hello();");
        assert_eq!(entries.iter().filter(|e| *e == "start").count(), 1);

        // Feed the registered sink as the engine would
        let sink = trace.script.sink.as_mut().unwrap();
        sink(AgentMessage::from_wire(r#"{"type":"error","stack":"boom"}"#));

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out, "boom\n");
    }

    #[test]
    fn test_hold_until_eof_consumes_input() {
        let input = Cursor::new("first line\nsecond line\n");
        hold_until_eof(input).unwrap();

        let empty = Cursor::new("");
        hold_until_eof(empty).unwrap();
    }
}

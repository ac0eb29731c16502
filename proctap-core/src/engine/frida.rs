//! Frida-backed engine
//!
//! Thin owned wrappers over frida-rust's handle chain. Runtime, device
//! manager, device and session are process-lifetime resources: each is
//! promoted to `'static` when acquired and reclaimed by the OS when the
//! controller exits. No explicit detach is ever issued.

use anyhow::{Context, Result};
use frida::{Device, DeviceManager, Frida, ScriptHandler, ScriptOption};
use tracing::{debug, info};

use super::{AttachError, Engine, InjectedScript, MessageSink, ProcessSession};
use crate::message::AgentMessage;
use crate::target::Target;

pub struct FridaEngine {
    manager: &'static DeviceManager<'static>,
}

impl FridaEngine {
    pub fn new() -> Self {
        let frida: &'static Frida = Box::leak(Box::new(unsafe { Frida::obtain() }));
        let manager = Box::leak(Box::new(DeviceManager::obtain(frida)));
        Self { manager }
    }

    /// Resolve a process name to a PID on the local device. Exact-name match;
    /// zero or multiple matches are fatal.
    fn resolve_pid(device: &'static Device<'static>, name: &str) -> Result<u32, AttachError> {
        let pids: Vec<u32> = device
            .enumerate_processes()
            .iter()
            .filter(|process| process.get_name() == name)
            .map(|process| process.get_pid())
            .collect();

        match pids.as_slice() {
            [] => Err(AttachError::ProcessNotFound {
                name: name.to_string(),
            }),
            [pid] => Ok(*pid),
            many => Err(AttachError::AmbiguousName {
                name: name.to_string(),
                count: many.len(),
            }),
        }
    }
}

impl Default for FridaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for FridaEngine {
    type Session = FridaSession;

    fn attach(&mut self, target: &Target) -> Result<FridaSession> {
        let device: &'static Device<'static> = Box::leak(Box::new(
            self.manager
                .get_local_device()
                .context("no local device available")?,
        ));

        let pid = match target {
            Target::Pid(pid) => *pid,
            Target::Name(name) => Self::resolve_pid(device, name)?,
        };
        debug!("resolved target '{target}' to pid {pid}");

        let session = Box::leak(Box::new(
            device
                .attach(pid)
                .with_context(|| format!("failed to attach to pid {pid}"))?,
        ));
        info!("attached to pid {pid}");

        Ok(FridaSession { session })
    }
}

pub struct FridaSession {
    session: &'static frida::Session<'static>,
}

impl ProcessSession for FridaSession {
    type Script = FridaScript;

    fn inject(&mut self, source: &str) -> Result<FridaScript> {
        let mut options = ScriptOption::new();
        let script = self
            .session
            .create_script(source, &mut options)
            .context("engine rejected the agent script")?;

        Ok(FridaScript {
            script,
            handler: None,
        })
    }
}

pub struct FridaScript {
    script: frida::Script<'static>,
    // Boxed so the address handed to the engine stays stable for the life of
    // the script.
    handler: Option<Box<RelayHandler>>,
}

impl InjectedScript for FridaScript {
    fn subscribe(&mut self, sink: MessageSink) -> Result<()> {
        anyhow::ensure!(self.handler.is_none(), "message sink already registered");

        let handler = self.handler.insert(Box::new(RelayHandler { sink }));
        self.script
            .handle_message(handler.as_mut())
            .context("failed to register message handler")
    }

    fn start(&mut self) -> Result<()> {
        anyhow::ensure!(
            self.handler.is_some(),
            "message sink must be registered before the script starts"
        );
        self.script.load().context("agent script failed to load")
    }
}

struct RelayHandler {
    sink: MessageSink,
}

impl ScriptHandler for RelayHandler {
    fn on_message(&mut self, message: &str) {
        (self.sink)(AgentMessage::from_wire(message));
    }
}

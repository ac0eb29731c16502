//! Instrumentation engine seam
//!
//! The engine itself — attachment, injection, the cross-process message
//! bridge, the agent's scripting runtime — is external. These traits are the
//! narrow surface the controller drives, so orchestration can be exercised
//! against a test double. The frida-backed implementation lives in
//! [`frida`](self::frida) behind the `frida` cargo feature.

use anyhow::Result;
use thiserror::Error;

use crate::message::AgentMessage;
use crate::target::Target;

#[cfg(feature = "frida")]
pub mod frida;

/// Receives decoded agent messages, asynchronously, on whatever thread the
/// engine delivers them from.
pub type MessageSink = Box<dyn FnMut(AgentMessage) + Send + 'static>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    #[error("no running process matches '{name}'")]
    ProcessNotFound { name: String },

    #[error("process name '{name}' is ambiguous: {count} matches, attach by PID instead")]
    AmbiguousName { name: String, count: usize },
}

/// Entry point into the instrumentation engine.
pub trait Engine {
    type Session: ProcessSession;

    /// Establish a session with the target process. Fatal on failure: the
    /// process does not exist, is inaccessible, or transport setup failed.
    fn attach(&mut self, target: &Target) -> Result<Self::Session>;
}

/// An active attachment to a target process.
pub trait ProcessSession {
    type Script: InjectedScript;

    /// Ask the engine to compile the agent source inside the target and
    /// prepare it for execution. Execution does not begin until
    /// [`InjectedScript::start`].
    fn inject(&mut self, source: &str) -> Result<Self::Script>;
}

/// Injected agent code, prepared but not necessarily running.
pub trait InjectedScript {
    /// Register the message sink. Must be called before [`start`](Self::start)
    /// so no messages emitted during early agent execution are lost.
    fn subscribe(&mut self, sink: MessageSink) -> Result<()>;

    /// Begin executing the agent inside the target. Errors if no sink has
    /// been registered, or if the engine rejects the script.
    fn start(&mut self) -> Result<()>;
}

//! Proctap Core Library
//!
//! Building blocks for the proctap controller:
//! - target identification and attach-time name resolution
//! - agent source loading
//! - the agent message model and stdout relay
//! - the instrumentation engine seam (frida-backed behind the `frida` feature)

pub mod agent;
pub mod engine;
pub mod message;
pub mod relay;
pub mod target;
pub mod trace;

pub use agent::AgentSource;
pub use engine::{AttachError, Engine, InjectedScript, MessageSink, ProcessSession};
pub use message::AgentMessage;
pub use relay::MessageRelay;
pub use target::Target;
pub use trace::{deploy, hold_until_eof, ActiveTrace};

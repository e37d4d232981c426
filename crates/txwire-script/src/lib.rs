/// txwire - Script byte handling.
///
/// Provides the opcode table, the `Operation` type, a lazy and restartable
/// `ScriptReader` that turns raw script bytes into operations, and the owned
/// `Script` byte container carried by transaction inputs and outputs.

pub mod opcodes;
pub mod operation;
pub mod reader;
pub mod script;

mod error;
pub use error::{ScriptError, ScriptPart};
pub use opcodes::{OpcodeNames, StandardOpcodes};
pub use operation::{Operation, PushKind, ScriptToken};
pub use reader::{Operations, ScriptReader};
pub use script::Script;

pub use crate::arbiters::Arbiters;
pub use crate::error::{KernelError, KernelErrorExt, ModuleError, ModuleErrorExt};
pub use crate::module::context::{Command, ModuleContext};
pub use crate::module::listener::{Gate, Listener};
pub use crate::module::{Feature, Module, ModuleBehavior, ModuleInfo, ModuleState, Transition};
pub use crate::registry::{ModuleId, ModuleManager, ModuleSnapshot};
pub use crate::request::{Request, RequestHandler};
pub use crate::session::Session;
pub use crate::value::{ChoiceGroup, RangeValue, ValueGroup, ValueNode};

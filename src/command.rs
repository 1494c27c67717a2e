//! # Commands
//!
//! A command is an immutable value describing one unit of work. Its
//! [`CommandType`] is the nominal key used for handler resolution: two types
//! with identical fields are still different command types.

use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::gate::DispatchGate;

/// Nominal identifier for a kind of command.
///
/// Equality and hashing use the Rust [`TypeId`] only; the type name is carried
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct CommandType {
    id: TypeId,
    name: &'static str,
}

impl CommandType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `shop::orders::OrderPlaced`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path, e.g. `OrderPlaced`.
    pub fn short_name(&self) -> &'static str {
        let base_end = self.name.find('<').unwrap_or(self.name.len());
        let start = self.name[..base_end]
            .rfind("::")
            .map(|idx| idx + 2)
            .unwrap_or(0);
        &self.name[start..]
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for CommandType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CommandType {}

impl Hash for CommandType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// Name first so diagnostics come out in a stable, readable order.
impl Ord for CommandType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for CommandType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandType({})", self.name)
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Marker for values that can be dispatched through a [`DispatchGate`].
///
/// ```rust
/// use command_gate::Command;
///
/// #[derive(Debug, Clone)]
/// struct OrderPlaced {
///     id: u64,
/// }
///
/// impl Command for OrderPlaced {}
/// ```
pub trait Command: Any + Send + Sync + fmt::Debug {
    /// Dispatch this command synchronously through `gate`.
    fn dispatch_to(self, gate: &DispatchGate) -> Result<()>
    where
        Self: Sized,
    {
        gate.dispatch(self)
    }
}

/// Object-safe view of any [`Command`], used on the type-erased dispatch path.
pub trait AnyCommand: Any + Send + Sync + fmt::Debug {
    /// The exact runtime type of this command.
    fn command_type(&self) -> CommandType;

    fn as_any(&self) -> &dyn Any;
}

impl<C: Command> AnyCommand for C {
    fn command_type(&self) -> CommandType {
        CommandType::of::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyCommand {
    pub fn downcast_ref<C: Command>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}

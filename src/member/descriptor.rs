//! Member descriptors: a callable member of some owner value, described by its
//! declared signature and invoked through a uniform, type-erased call path.

use std::any::{Any, TypeId};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::command::CommandType;
use crate::error::BoxError;

/// Declared type of a member parameter, return value or owner.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Exact match against a command type; no coercion is considered.
    pub fn is_command_type(&self, command_type: CommandType) -> bool {
        self.id == command_type.id()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Failure raised by a member body.
pub enum MemberFault {
    /// Ordinary failure of the member's own logic.
    Runtime(BoxError),
    /// Failure the member declares outside its ordinary error channel.
    Checked(BoxError),
    /// Unrecoverable failure: the member panicked. Carries the panic payload.
    Fatal(Box<dyn Any + Send>),
}

impl fmt::Debug for MemberFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime(e) => f.debug_tuple("Runtime").field(e).finish(),
            Self::Checked(e) => f.debug_tuple("Checked").field(e).finish(),
            Self::Fatal(_) => f.write_str("Fatal(..)"),
        }
    }
}

/// Outcome of a failed member invocation.
#[derive(Debug)]
pub enum InvocationFailure {
    /// The member ran and failed. Its fault is wrapped in exactly this envelope.
    Target(MemberFault),
    /// The member could not be called: wrong receiver or argument shape.
    Inaccessible(String),
}

/// Value produced by a member that declares a return type.
pub type MemberOutput = Option<Box<dyn Any + Send>>;

type Invoker = dyn Fn(&(dyn Any + Send + Sync), &[&dyn Any]) -> Result<MemberOutput, InvocationFailure>
    + Send
    + Sync;

/// A callable member together with its declared signature.
///
/// ```rust
/// use command_gate::member::{MemberDescriptor, TypeDescriptor};
///
/// struct Ledger;
///
/// impl Ledger {
///     fn record(&self, _entry: &u64) {}
/// }
///
/// let member = MemberDescriptor::unary::<Ledger, u64, _>("record", |ledger, entry| {
///     ledger.record(entry);
///     Ok(())
/// });
///
/// assert_eq!(member.params(), &[TypeDescriptor::of::<u64>()]);
/// assert!(member.returns().is_none());
/// ```
#[derive(Clone)]
pub struct MemberDescriptor {
    owner_type: TypeDescriptor,
    name: String,
    params: Vec<TypeDescriptor>,
    returns: Option<TypeDescriptor>,
    invoker: Arc<Invoker>,
}

impl MemberDescriptor {
    /// Describe an arbitrary member signature with a raw invoker.
    pub fn new<F>(
        owner_type: TypeDescriptor,
        name: impl Into<String>,
        params: Vec<TypeDescriptor>,
        returns: Option<TypeDescriptor>,
        invoker: F,
    ) -> Self
    where
        F: Fn(&(dyn Any + Send + Sync), &[&dyn Any]) -> Result<MemberOutput, InvocationFailure>
            + Send
            + Sync
            + 'static,
    {
        Self {
            owner_type,
            name: name.into(),
            params,
            returns,
            invoker: Arc::new(invoker),
        }
    }

    /// Describe a member of `O` taking one `&A` and returning nothing.
    ///
    /// A panic inside `member` is captured as [`MemberFault::Fatal`].
    pub fn unary<O, A, F>(name: impl Into<String>, member: F) -> Self
    where
        O: Any + Send + Sync,
        A: Any,
        F: Fn(&O, &A) -> Result<(), MemberFault> + Send + Sync + 'static,
    {
        Self::new(
            TypeDescriptor::of::<O>(),
            name,
            vec![TypeDescriptor::of::<A>()],
            None,
            move |owner, args| {
                let receiver = owner.downcast_ref::<O>().ok_or_else(|| {
                    InvocationFailure::Inaccessible(format!(
                        "receiver is not a {}",
                        std::any::type_name::<O>()
                    ))
                })?;
                let [argument] = args else {
                    return Err(InvocationFailure::Inaccessible(format!(
                        "expected 1 argument, got {}",
                        args.len()
                    )));
                };
                let argument: &dyn Any = *argument;
                let argument = argument.downcast_ref::<A>().ok_or_else(|| {
                    InvocationFailure::Inaccessible(format!(
                        "argument is not a {}",
                        std::any::type_name::<A>()
                    ))
                })?;

                match panic::catch_unwind(AssertUnwindSafe(|| member(receiver, argument))) {
                    Ok(Ok(())) => Ok(None),
                    Ok(Err(fault)) => Err(InvocationFailure::Target(fault)),
                    Err(payload) => Err(InvocationFailure::Target(MemberFault::Fatal(payload))),
                }
            },
        )
    }

    pub fn owner_type(&self) -> TypeDescriptor {
        self.owner_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    pub fn param(&self, index: usize) -> Option<TypeDescriptor> {
        self.params.get(index).copied()
    }

    pub fn returns(&self) -> Option<TypeDescriptor> {
        self.returns
    }

    /// `Owner::member` reference used in diagnostics.
    pub fn reference(&self) -> String {
        format!("{}::{}", self.owner_type.name(), self.name)
    }

    pub fn invoke(
        &self,
        owner: &(dyn Any + Send + Sync),
        args: &[&dyn Any],
    ) -> Result<MemberOutput, InvocationFailure> {
        (self.invoker)(owner, args)
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("member", &self.reference())
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

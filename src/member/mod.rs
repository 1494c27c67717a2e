//! # Member Handlers
//!
//! Handlers built from a member of an owner value rather than from a
//! [`Handler`](crate::registry::Handler) implementation. A member is described
//! by a [`MemberDescriptor`] (owner type, parameter types, return type and a
//! type-erased invoker) and validated into a [`MemberHandler`] before it can
//! serve a command type.
//!
//! Failures raised by the member body are classified by [`MemberFault`] and
//! come back out of the adapter as follows:
//!
//! | fault     | surfaces as                                                |
//! |-----------|------------------------------------------------------------|
//! | `Runtime` | `GateError::Handler` carrying the original error unchanged |
//! | `Checked` | `GateError::Handler` carrying a [`MemberInvocationError`]  |
//! | `Fatal`   | the original panic, resumed on the calling thread          |

pub mod descriptor;
pub mod handler;
pub mod source;

pub use descriptor::{InvocationFailure, MemberDescriptor, MemberFault, MemberOutput, TypeDescriptor};
pub use handler::{MemberHandler, MemberInvocationError};
pub use source::MemberSource;

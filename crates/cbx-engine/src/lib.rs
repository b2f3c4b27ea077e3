//! CBX Engine
//!
//! Reactive constraint-box validation over a [`cbx_dom::Document`].
//!
//! # Architecture
//!
//! ```text
//! input/change --> Dispatcher (debounce) --+
//!                                          +--> Resolver --> Checker (xN) --> box state
//! submit/click --> Guard ------------------+                                     |
//!                    ^                                                           |
//!                    +------------- block or allow, scroll to topmost -----------+
//! ```
//!
//! [`Cbx`] ties the pieces together and owns the hide rule lifecycle.

pub mod boxspec;
pub mod checker;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod event;
pub mod guard;
pub mod resolver;
pub mod validator;

pub use boxspec::ConstraintBox;
pub use checker::{CheckOutcome, Checker};
pub use config::{EngineConfig, Markers};
pub use dispatcher::{field_group, DispatchStats, Dispatcher};
pub use engine::{Cbx, CbxBuilder};
pub use error::{ConfigError, EngineError, EngineResult};
pub use event::{ActionEvent, EventKind};
pub use guard::{Guard, GuardOutcome};
pub use resolver::Resolver;
pub use validator::Validator;

/// Re-exports for hosts embedding the engine
pub mod prelude {
    pub use crate::{
        ActionEvent, Cbx, CbxBuilder, EngineConfig, EngineError, EventKind, GuardOutcome,
    };
    pub use cbx_constraint::{FieldValue, Verdict};
    pub use cbx_dom::{Document, NodeId};
}

/// Version of the engine crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

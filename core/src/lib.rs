//! Navigation preload orchestration.
//!
//! Before a navigation completes, the load tasks declared by the components
//! along the matched route are gathered into a [`Chain`] of stages and run as
//! one cancellable operation:
//!
//! ```text
//! NavigationAction
//!   ↓
//! RouteMatcher::match_route()           → RouteMatch::{Matched, Redirect}
//!   ↓
//! DescriptorListBuilder::build()        → Vec<Descriptor>  (env filters, skip policy)
//!   ↓
//! Chain::build()                        → [Single | Batch]*
//!   ↓
//! ExecutionEngine::execute()            → ChainResult::{Finished, Failed, Cancelled}
//!   ↓
//! classify                              → Outcome::{Proceed, Redirect, Failed, Cancelled}
//! ```
//!
//! [`Navigator`] ties the pieces together and owns the single active-session
//! slot through which newer navigations supersede older ones.

pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod executor;
pub mod location;
pub mod navigation;
pub mod runtime;
pub mod state;

pub use descriptor::{Descriptor, DescriptorListBuilder, LoadContext, PreviousRoutes, SkipPolicy};
pub use dispatch::{Action, Dispatcher, NavigationAction, NullDispatcher, PreloadDispatcher};
pub use error::{ErrorCode, PreloadError};
pub use events::{NavigateHook, PreloadEvent, PreloadStats, StatsReporter};
pub use executor::{
    BatchFailurePolicy, Cancellable, Chain, ChainResult, ExecutionEngine, LoadFn, LoadOptions,
    LoadReturn, LoadTask, Stage, TaskFuture, TaskHandle,
};
pub use location::{Location, RouteParams};
pub use navigation::{
    Component, ErrorContext, ErrorHandler, MatchedRoute, Navigator, NavigatorBuilder, Outcome,
    PreloadFailure, Redirector, RouteComponent, RouteMatch, RouteMatcher,
};
pub use runtime::Environment;
pub use state::{SessionHandle, SessionManager, SessionState, SessionStatus};

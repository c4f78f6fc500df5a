//! Business logic services for Boxoffice
//!
//! This crate contains the admission engine that turns queued ticket
//! reservations into holds.
//!
//! # Architecture
//!
//! - `admission` is pure: it plans a pass from a backlog snapshot and a
//!   starting availability
//! - Services own their repositories behind `Arc` and share one `SaleLocks`
//!   registry so passes and sweeps on a sale never interleave
//! - All operations are instrumented with tracing
//!
//! # Services
//!
//! - `TicketSaleService` - Sale creation, reservation queueing, admission passes
//! - `HoldSweeper` - Reclaims holds whose window has closed

pub mod admission;
pub mod hold_sweeper;
pub mod locks;
pub mod ticket_sale;

pub use admission::{decide, plan_pass, AdmissionDecision, PassPlan, QueuedRequest};
pub use hold_sweeper::HoldSweeper;
pub use locks::SaleLocks;
pub use ticket_sale::{PassSummary, TicketSaleService};


//! Survey Session - one operator editing one survey
//!
//! Wraps a [`survey_draft::DraftEditor`] with the asynchronous backend calls
//! around it:
//! - Opening a new or persisted survey
//! - Cancellable binding lookups and template fetches, tagged with a
//!   [`SessionToken`] and a per-kind generation
//! - Submission with re-hydration from the stored record
//! - Teardown that aborts in-flight requests and cancels pending confirmations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use survey_session::{EditorSession, SessionConfig};
//!
//! # async fn example(backend: Arc<dyn survey_session::SurveyBackend>) -> Result<(), survey_draft::DraftError> {
//! let id = survey_model::SurveyId::new("42");
//! let mut session = EditorSession::open_existing(backend, SessionConfig::new(), &id).await?;
//! session.pump().await?;
//! session.editor_mut()?.set_title("Quarterly feedback");
//! session.submit().await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod config;
pub mod session;
pub mod telemetry;
pub mod ticket;

pub use backend::{BackendError, SurveyBackend};
pub use config::SessionConfig;
pub use session::{EditorSession, EventOutcome};
pub use telemetry::init_tracing;
pub use ticket::{RequestKind, RequestTicket, SessionEvent, SessionToken};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Request tickets and session events
//!
//! Every background request is tagged with the session that issued it and a
//! per-kind generation. Only the newest generation of the issuing session is
//! ever applied to the draft.

use crate::backend::BackendError;
use std::collections::HashMap;
use std::fmt;
use survey_model::{AnswerBindings, TemplateRecord};
use uuid::Uuid;

/// Identity of one editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Fresh random token
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Kinds of background request; at most one of each is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Answer-binding lookup
    AnswerBindings,
    /// Template catalog fetch
    Templates,
}

/// Tag carried by a background request and its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    /// Issuing session
    pub session: SessionToken,
    /// Request kind
    pub kind: RequestKind,
    /// Generation within the kind
    pub generation: u64,
}

/// Result of a background request, delivered back to the session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Binding lookup finished
    AnswerBindings {
        ticket: RequestTicket,
        result: Result<AnswerBindings, BackendError>,
    },
    /// Template fetch finished
    Templates {
        ticket: RequestTicket,
        result: Result<Vec<TemplateRecord>, BackendError>,
    },
}

impl SessionEvent {
    /// Ticket of the request that produced this event
    #[must_use]
    pub fn ticket(&self) -> RequestTicket {
        match self {
            Self::AnswerBindings { ticket, .. } | Self::Templates { ticket, .. } => *ticket,
        }
    }
}

/// Generation counters per request kind
#[derive(Debug, Default)]
pub(crate) struct Generations {
    current: HashMap<RequestKind, u64>,
}

impl Generations {
    /// Issue the next ticket for `kind`, superseding older ones
    pub(crate) fn issue(&mut self, session: SessionToken, kind: RequestKind) -> RequestTicket {
        let generation = self.current.entry(kind).or_insert(0);
        *generation += 1;
        RequestTicket {
            session,
            kind,
            generation: *generation,
        }
    }

    /// Supersede every outstanding ticket of `kind` without issuing a new one
    pub(crate) fn invalidate(&mut self, kind: RequestKind) {
        *self.current.entry(kind).or_insert(0) += 1;
    }

    /// Check if `ticket` is the newest of its kind
    pub(crate) fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.current.get(&ticket.kind) == Some(&ticket.generation)
    }
}

//! Outreach: personalized cold-email drafts from company research.
//!
//! One invocation researches the prospect company, renders a copywriting
//! prompt around that research, asks a generative model for a draft and
//! recovers the `email_subject`/`email_content` JSON from its reply.
//!
//! Served over HTTP ([`server`]) or as a serverless event handler ([`lambda`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod campaign;
pub mod config;
pub mod credentials;
pub mod extract;
pub mod lambda;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod server;

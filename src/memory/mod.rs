//! Topic usage memory for diversification.
//!
//! This module tracks which question topics were recently generated so the
//! pipeline can steer new generation away from over-used topics. Events
//! live in an external memory service scoped by actor and exam session;
//! the recency tracker turns raw events into a diversity context.

pub mod client;
pub mod recency;

pub use client::{AgentMemoryClient, TopicEventStore, TopicUsageEvent};
pub use recency::RecencyTracker;

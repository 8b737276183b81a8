//! # Taskdeck
//!
//! A terminal task manager with categories, recurring templates and simple
//! time tracking. The CLI works against an in-memory collection seeded with
//! fixture data; every invocation is one self-contained session.
//!
//! ## Features
//!
//! *   **Filtering & Sorting**: Combine status, priority, category and
//!     free-text filters; sort by title, priority, due date, creation time
//!     or manual order.
//! *   **Recurring Templates**: Templates expand into dated task instances
//!     over a window (daily, weekly, monthly), skipping exception dates.
//! *   **Time Tracking**: Start and stop a per-task timer; closed sessions
//!     accumulate into a running total.
//! *   **Statistics**: Total, completed, pending, overdue and a completion
//!     rate for the whole collection.
//!
//! ## Usage
//!
//! **Listing and filtering**
//! ```bash
//! taskdeck list
//! taskdeck list --status overdue --sort priority --desc
//! taskdeck list --category 1 --search report
//! ```
//!
//! **Managing tasks**
//! ```bash
//! taskdeck add "Write report" --priority high --category 1 --due 2026-09-01
//! taskdeck complete 3 5 8
//! taskdeck edit 3 --title "Write the Q3 report"
//! taskdeck remove 3
//! ```
//!
//! **Recurring templates**
//! ```bash
//! # Create a template, then expand it over a window
//! taskdeck add "Team standup" --recur daily --skip 2026-08-14
//! taskdeck generate 5 --from 2026-08-10 --to 2026-08-21
//! ```
//!
//! **Time tracking**
//! ```bash
//! taskdeck timer start 8
//! taskdeck timer stop 8
//! taskdeck timer show 8
//! ```
//!
//! The core logic lives in [`query`] (filtering, sorting, statistics,
//! validation), [`recurrence`] (template expansion) and [`timer`] (session
//! tracking). All three are pure: they take snapshots plus an explicit
//! clock reading and return new values, with [`store`] as the system of
//! record that commits results back.

pub mod commands;
pub mod models;
pub mod query;
pub mod recurrence;
pub mod store;
pub mod timer;

//! Bounded-concurrency execution of an external CLI tool.
//!
//! Every invocation runs with a private home directory leased from a fixed
//! pool, a caller-supplied timeout enforced by a graceful quit signal, and
//! combined stdout/stderr captured into a fixed-capacity ring buffer.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                          PooledExecutor                            │
//! │                                                                    │
//! │   execute(args, timeout)                                           │
//! │         │                                                          │
//! │         ▼                                                          │
//! │   ┌────────────┐    ┌───────────────┐    ┌─────────────────────┐   │
//! │   │ Lease home │───▶│ Spawn tool    │───▶│ Drain output into   │   │
//! │   │ (HomePool) │    │ HOME_ENV=dir  │    │ ring buffer + wait  │   │
//! │   └────────────┘    └───────────────┘    └─────────────────────┘   │
//! │         ▲                  │ timeout            │                  │
//! │         │                  ▼                    ▼                  │
//! │         │           ┌───────────────┐    ┌─────────────────────┐   │
//! │         └───────────│ SIGQUIT       │    │ Release home        │   │
//! │      (after exit)   │ (cooperative) │    │ (RAII lease drop)   │   │
//! │                     └───────────────┘    └─────────────────────┘   │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pool never grows or shrinks after provisioning; up to `pool_size`
//! executions run in parallel and the next caller suspends until a home is
//! released. Timeouts are cooperative only: the subprocess is asked to quit,
//! never hard-killed.

mod config;
mod error;
mod pool;
mod ring;
mod runner;

pub use config::ExecutorConfig;
pub use error::{ExecError, Result};
pub use pool::{HomeLease, HomePool};
pub use ring::RingBuffer;
pub use runner::PooledExecutor;

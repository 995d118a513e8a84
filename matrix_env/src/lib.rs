//! Matrix Environment Abstraction Layer
//!
//! Everything the matrix generator learns from, or writes to, the CI system
//! goes through the [`CiEnvironment`] trait:
//! - Variables (seed override, pull-request id, job count, repository)
//! - Output channels (key/value output file, job summary)
//!
//! The seed policy lives here too: an explicit seed wins, a pull request
//! gets a seed that is stable across its re-runs, and anything else gets a
//! fresh seed that is reported so the run can be reproduced.
//!
//! # Example
//!
//! ```
//! use matrix_env::{resolve_seed, vars, SeedSource, StaticEnvironment};
//!
//! let env = StaticEnvironment::new().with_var(vars::RNG_SEED, "42");
//! let seed = resolve_seed(None, &env);
//! assert_eq!(seed.value, 42);
//! assert_eq!(seed.source, SeedSource::Explicit);
//! ```

mod context;
mod error;
mod output;
mod process_impl;
mod seed;
mod static_impl;
mod types;

pub use context::CiEnvironment;
pub use error::EnvError;
pub use output::heredoc_entry;
pub use process_impl::ProcessEnvironment;
pub use seed::{parse_seed, resolve_seed, PR_SEED_MIX};
pub use static_impl::StaticEnvironment;
pub use types::{vars, ResolvedSeed, SeedSource};

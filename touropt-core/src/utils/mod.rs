//! Common utilities.

use std::sync::Arc;

mod comparison;
pub use self::comparison::compare_floats;

mod error;
pub use self::error::{GenericError, GenericResult};

mod parallel;
pub use self::parallel::{map_reduce, ThreadPool};

mod random;
pub use self::random::{DefaultRandom, Random};

mod timing;
pub use self::timing::Timer;

/// Specifies a logger type used to print messages.
pub type InfoLogger = Arc<dyn Fn(&str) + Send + Sync>;

/// Keeps track of environment specific information which influences algorithm behavior.
pub struct Environment {
    /// A wrapper on random generator.
    pub random: Arc<dyn Random + Send + Sync>,
    /// A logger used to print information messages.
    pub logger: InfoLogger,
    /// An amount of CPU cores available for the engine.
    pub parallelism: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            random: Arc::new(DefaultRandom::default()),
            logger: Arc::new(|msg: &str| println!("{msg}")),
            parallelism: std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1),
        }
    }
}

impl Environment {
    /// Creates a new instance of `Environment` with the given random generator.
    pub fn new_with_random(random: Arc<dyn Random + Send + Sync>) -> Self {
        Self { random, ..Self::default() }
    }
}

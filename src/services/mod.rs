pub mod accumulator;
pub mod clients;
pub mod kernel;
pub mod ranking;
pub mod recommendations;

pub use accumulator::{ChunkedAccumulator, ScoreVector};
pub use clients::{UserListClient, UserLists};
pub use kernel::{Kernel, KernelParams};
pub use recommendations::{recommend, Recommender};

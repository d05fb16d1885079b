pub mod replay;

pub use replay::{ReplaySummary, ReplayUseCase};

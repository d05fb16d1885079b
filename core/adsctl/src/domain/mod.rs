//! adsctl のドメイン型（コマンドとシナリオ）

pub mod command;
pub mod scenario;

pub use command::AdsctlCommand;
pub use scenario::{Scenario, StepAction};

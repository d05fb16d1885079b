//! adsctl のアダプター（stdout への JSON lines 出力、ログの多重化、シナリオファイル）

pub mod json_lines_observer;
pub mod multi_log;
pub mod scenario_file;

pub use json_lines_observer::JsonLinesObserver;
pub use multi_log::MultiLog;
pub use scenario_file::load_scenario;

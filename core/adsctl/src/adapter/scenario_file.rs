use crate::domain::Scenario;
use common::error::Error;
use std::fs;
use std::path::Path;

pub fn load_scenario(path: &Path) -> Result<Scenario, Error> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::io_msg(format!("failed to read scenario {}: {}", path.display(), e)))?;
    Scenario::parse(&content)
}

//! replay シナリオ（scenario.json）
//!
//! ```json
//! { "member": true,
//!   "steps": [
//!     { "at": "2026-03-01T09:00:00Z", "fire": { "ad": { ... }, "event_type": "served_impression" } },
//!     { "at": "2026-03-01T10:00:00Z", "navigate": { "redirect_chain": ["https://foo.com/"], "html": "..." } },
//!     { "at": "2026-03-01T11:00:00Z", "member": false }
//!   ] }
//! ```

use ads::domain::{Ad, AdEventType};
use chrono::{DateTime, Utc};
use common::error::Error;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// 開始時点の会員状態
    pub member: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub at: DateTime<Utc>,
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Fire { ad: Ad, event_type: AdEventType },
    Navigate { redirect_chain: Vec<Url>, html: Option<String> },
    /// 途中で会員状態を切り替える
    SetMember(bool),
}

impl Scenario {
    pub fn parse(json: &str) -> Result<Self, Error> {
        let raw: ScenarioRaw = serde_json::from_str(json)
            .map_err(|e| Error::invalid_argument(format!("invalid scenario: {}", e)))?;
        let steps = raw
            .steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                step.into_step()
                    .map_err(|e| Error::invalid_argument(format!("invalid scenario step {}: {}", i, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            member: raw.member.unwrap_or(true),
            steps,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ScenarioRaw {
    member: Option<bool>,
    #[serde(default)]
    steps: Vec<StepRaw>,
}

#[derive(Debug, Deserialize)]
struct StepRaw {
    at: DateTime<Utc>,
    fire: Option<FireRaw>,
    navigate: Option<NavigateRaw>,
    member: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct FireRaw {
    ad: Ad,
    event_type: AdEventType,
}

#[derive(Debug, Deserialize)]
struct NavigateRaw {
    redirect_chain: Vec<String>,
    html: Option<String>,
}

impl StepRaw {
    fn into_step(self) -> Result<Step, String> {
        let action = match (self.fire, self.navigate, self.member) {
            (Some(fire), None, None) => StepAction::Fire {
                ad: fire.ad,
                event_type: fire.event_type,
            },
            (None, Some(navigate), None) => {
                let redirect_chain = navigate
                    .redirect_chain
                    .iter()
                    .map(|s| Url::parse(s).map_err(|e| format!("invalid url {:?}: {}", s, e)))
                    .collect::<Result<Vec<_>, _>>()?;
                StepAction::Navigate {
                    redirect_chain,
                    html: navigate.html,
                }
            }
            (None, None, Some(member)) => StepAction::SetMember(member),
            _ => return Err("expected exactly one of fire, navigate or member".to_string()),
        };
        Ok(Step { at: self.at, action })
    }
}

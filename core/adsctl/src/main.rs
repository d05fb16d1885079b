mod adapter;
mod cli;
mod domain;
mod usecase;
mod wiring;


use std::process;
use std::sync::Arc;

use ads::adapter::{load_config, resolve_config_path, ADS_CONFIG_ENV};
use ads::domain::{AdType, AdsConfig, PermissionRuleSettings};
use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{Log, LogLevel, LogRecord};
use domain::AdsctlCommand;
use serde_json::json;
use usecase::ReplayUseCase;

use crate::adapter::{load_scenario, JsonLinesObserver};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    log: Arc<dyn Log>,
    sink: Arc<JsonLinesObserver>,
    env_config: Option<String>,
}

impl Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let cmd = config_to_command(&config);
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("command", cmd.name()),
        );

        let result = self.dispatch(&config, &cmd);

        let code = result.as_ref().copied().unwrap_or(0);
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("command", cmd.name())
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = self.log.log(
                &LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error"),
            );
        }
        result
    }

    fn dispatch(&self, config: &Config, cmd: &AdsctlCommand) -> Result<i32, Error> {
        match cmd {
            AdsctlCommand::Help => {
                print_help();
                Ok(0)
            }
            AdsctlCommand::ShowConfig => {
                let ads_config = self.load_ads_config(config)?;
                self.sink.emit(&describe_config(&ads_config))?;
                Ok(0)
            }
            AdsctlCommand::Replay { scenario } => {
                let ads_config = self.load_ads_config(config)?;
                let scenario = load_scenario(scenario)?;
                let replay = ReplayUseCase::new(ads_config, Arc::clone(&self.sink), Arc::clone(&self.log));
                replay.run(&scenario)?;
                Ok(0)
            }
        }
    }

    fn load_ads_config(&self, config: &Config) -> Result<AdsConfig, Error> {
        let path = resolve_config_path(config.config_path.as_deref(), self.env_config.clone());
        if let Some(p) = &path {
            let _ = self.log.log(
                &LogRecord::new(LogLevel::Debug, "loading config")
                    .layer("cli")
                    .kind("config")
                    .field("path", p.display().to_string()),
            );
        }
        load_config(path.as_deref())
    }
}

/// 設定と、種別ごとの実効許可ルール
fn describe_config(config: &AdsConfig) -> serde_json::Value {
    let effective: serde_json::Map<String, serde_json::Value> = AdType::ALL
        .iter()
        .map(|t| {
            let settings: PermissionRuleSettings = config.permission_rules_for(*t);
            (t.as_str().to_string(), json!(settings))
        })
        .collect();
    json!({
        "config": config,
        "ad_event_retention_days": config.ad_event_retention.num_days(),
        "effective_permission_rules": effective,
    })
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("adsctl: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let runner = Runner {
        log: wiring::wire_log(config.log_file.as_deref(), config.verbose),
        sink: Arc::new(JsonLinesObserver::stdout()),
        env_config: std::env::var(ADS_CONFIG_ENV).ok(),
    };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: adsctl [options] <replay <scenario.json> | config>");
}

fn print_help() {
    println!("Usage: adsctl [options] <command>");
    println!("Commands:");
    println!("  replay <scenario.json>        Fire the scenario's ad events and navigations; print notifications as JSON lines");
    println!("  config                        Print the resolved engine config as JSON");
    println!("Options:");
    println!("  -h, --help                    Show this help message");
    println!("  --config <path>               Engine config file (JSON)");
    println!("  --log-file <path>             Append structured JSONL logs to this file");
    println!("  -v, --verbose                 Emit diagnostic logs to stderr");
    println!("  --generate <shell>            Generate shell completion script (bash, zsh, fish)");
    println!();
    println!("Environment:");
    println!("  ADS_CONFIG      Config file used when --config is not given.");
}

use crate::domain::AdsctlCommand;
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: 診断ログを stderr に出す
    pub verbose: bool,
    /// --config: 設定ファイル（未指定なら $ADS_CONFIG）
    pub config_path: Option<PathBuf>,
    /// --log-file: JSONL ログの追記先
    pub log_file: Option<PathBuf>,
    /// replay のシナリオファイル
    pub scenario: Option<PathBuf>,
    /// `config` サブコマンド
    pub show_config: bool,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn global_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        clap::Arg::new("config")
            .long("config")
            .value_name("path")
            .help("Engine config file (JSON). Falls back to $ADS_CONFIG, then built-in defaults")
            .value_parser(value_parser!(PathBuf))
            .global(true)
            .num_args(1),
    )
    .arg(
        clap::Arg::new("log-file")
            .long("log-file")
            .value_name("path")
            .help("Append structured JSONL logs to this file")
            .value_parser(value_parser!(PathBuf))
            .global(true)
            .num_args(1),
    )
    .arg(
        clap::Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Emit diagnostic logs to stderr")
            .global(true)
            .action(ArgAction::SetTrue),
    )
}

fn build_clap_command() -> clap::Command {
    let cmd = clap::Command::new("adsctl")
        .about("Replay ad event scenarios through the attribution engine")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .subcommand(
            clap::Command::new("replay")
                .about("Fire ad events and navigations from a scenario file, printing notifications as JSON lines")
                .arg(
                    clap::Arg::new("scenario")
                        .index(1)
                        .required(true)
                        .value_name("scenario.json")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(clap::Command::new("config").about("Print the resolved engine config as JSON"));
    global_args(cmd)
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let (scenario, show_config) = match matches.subcommand() {
        Some(("replay", sub)) => (sub.get_one::<PathBuf>("scenario").cloned(), false),
        Some(("config", _)) => (None, true),
        _ => (None, false),
    };
    Config {
        help: matches.get_flag("help"),
        verbose: matches.get_flag("verbose"),
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        scenario,
        show_config,
    }
}

/// コマンドラインを解析する
pub fn parse_args() -> Result<ParseOutcome, Error> {
    parse_args_from(std::env::args_os())
}

/// 任意の引数列を解析する（先頭はプログラム名）
pub fn parse_args_from<I, T>(args: I) -> Result<ParseOutcome, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "adsctl", &mut std::io::stdout());
}

pub fn config_to_command(config: &Config) -> AdsctlCommand {
    if config.help {
        return AdsctlCommand::Help;
    }
    if let Some(scenario) = &config.scenario {
        return AdsctlCommand::Replay {
            scenario: scenario.clone(),
        };
    }
    if config.show_config {
        return AdsctlCommand::ShowConfig;
    }
    AdsctlCommand::Help
}

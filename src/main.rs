mod report;

use plugboard::{
    BoardConfig, ConflictPolicy, FileConfig, InputSource, LineBank, MonotonicClock, Plugboard, SimBoard, ThreadDelay,
    parse_wire,
};
use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    init_tracing();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: configuration: {err}");
            std::process::exit(2);
        }
    };

    let board = SimBoard::new();
    for wire in &config.wires {
        if let (Some(a), Some(b)) = (config.pin(wire.lo()), config.pin(wire.hi())) {
            board.connect(a, b);
        }
    }

    let bank = match LineBank::from_pins(board, ThreadDelay, &config.pins, config.options.settle) {
        Ok(bank) => bank,
        Err(err) => {
            eprintln!("error: configuration: {err}");
            std::process::exit(2);
        }
    };

    report::print_banner(&config, cli.color);

    let mut plugboard = Plugboard::new(bank, MonotonicClock::new(), &config.options);
    let mut input = StdinSource::spawn();
    let mut sink = report::Report::new(cli.color);

    match plugboard.run(&mut input, &mut sink) {
        Ok(never) => match never {},
        Err(err) => {
            tracing::error!(%err, "plugboard loop stopped");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout belongs to the plugboard report.
    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(env_filter).init();
}

/// Characters typed on stdin. A helper thread blocks on stdin so the
/// control loop can poll without blocking.
struct StdinSource {
    rx: Receiver<char>,
    closed: bool,
}

impl StdinSource {
    fn spawn() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Err(err) = pump_chars(io::stdin().lock(), &tx) {
                tracing::warn!(%err, "failed to read stdin");
            }
        });
        StdinSource { rx, closed: false }
    }
}

/// Forward characters from `reader` until EOF or until the receiver hangs up.
/// Bytes that are not valid UTF-8 arrive as U+FFFD and report as invalid input.
fn pump_chars(mut reader: impl BufRead, tx: &Sender<char>) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        if String::from_utf8_lossy(&buf).chars().any(|c| tx.send(c).is_err()) {
            return Ok(());
        }
    }
}

impl InputSource for StdinSource {
    fn poll_char(&mut self) -> Option<char> {
        match self.rx.try_recv() {
            Ok(c) => Some(c),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.closed {
                    tracing::info!("stdin closed; still scanning");
                    self.closed = true;
                }
                None
            }
        }
    }
}

#[derive(Default)]
struct CliConfig {
    config_path: Option<PathBuf>,
    threshold_ms: Option<u64>,
    settle_us: Option<u64>,
    idle_ms: Option<u64>,
    policy: Option<ConflictPolicy>,
    wires: Vec<String>,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut cli = CliConfig { color: io::stdout().is_terminal(), ..CliConfig::default() };
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| {
            inline.clone().or_else(|| args.next()).ok_or_else(|| format!("error: {name} expects a value"))
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("plugboard {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => cli.color = true,
            "--no-color" => cli.color = false,
            "--config" => cli.config_path = Some(PathBuf::from(value("--config")?)),
            "--threshold-ms" => cli.threshold_ms = Some(parse_number("--threshold-ms", &value("--threshold-ms")?)?),
            "--settle-us" => cli.settle_us = Some(parse_number("--settle-us", &value("--settle-us")?)?),
            "--idle-ms" => cli.idle_ms = Some(parse_number("--idle-ms", &value("--idle-ms")?)?),
            "--policy" => {
                let text = value("--policy")?;
                cli.policy = Some(text.parse::<ConflictPolicy>().map_err(|err| format!("error: {err}"))?);
            }
            "--wire" => cli.wires.push(value("--wire")?),
            _ => return Err(format!("error: unknown option '{arg}'\n\n{}", help_text())),
        }
    }

    Ok(cli)
}

fn parse_number(flag: &str, text: &str) -> Result<u64, String> {
    text.parse().map_err(|_| format!("error: invalid {flag} '{text}' (expected a non-negative integer)"))
}

fn load_config(cli: &CliConfig) -> Result<BoardConfig, plugboard::ConfigError> {
    let file = match &cli.config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let mut config = BoardConfig::from_file(file)?;

    if let Some(ms) = cli.threshold_ms {
        config.options.threshold = Duration::from_millis(ms);
    }
    if let Some(us) = cli.settle_us {
        config.options.settle = Duration::from_micros(us);
    }
    if let Some(ms) = cli.idle_ms {
        config.options.idle = Duration::from_millis(ms);
    }
    if let Some(policy) = cli.policy {
        config.options.policy = policy;
    }
    for wire in &cli.wires {
        config.wires.push(parse_wire(wire)?);
    }

    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "plugboard {version}

Plugboard emulator on a simulated 26-line board. Type letters to see them
substituted through the currently stable jumpers.

Usage:
  plugboard [OPTIONS]

Options:
  --config <path>          TOML config file (pins, timings, policy, wires).
  --threshold-ms <ms>      Time a connection must hold. Default: 2000
  --settle-us <us>         Wait after each line switch. Default: 100
  --idle-ms <ms>           Sleep per loop iteration. Default: 10
  --policy <name>          Conflict policy: first-detected | reject-both.
  --wire <X-Y>             Plug a simulated jumper (repeatable).
  --color                  Force ANSI color output.
  --no-color               Disable ANSI color output.
  -h, --help               Show this help message.
  -V, --version            Print version information.

Logging goes to stderr; set RUST_LOG (e.g. RUST_LOG=plugboard=trace).

Exit codes:
  1  Line error while scanning.
  2  Invalid arguments or configuration.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugboard::{InputClass, classify_input};
    use std::io::Cursor;

    fn pumped(bytes: &[u8]) -> Vec<char> {
        let (tx, rx) = mpsc::channel();
        pump_chars(Cursor::new(bytes.to_vec()), &tx).unwrap();
        drop(tx);
        rx.iter().collect()
    }

    #[test]
    fn undecodable_bytes_do_not_stop_input() {
        let chars = pumped(b"\xffa\n\xfe\nb\n");
        assert_eq!(chars, vec!['\u{fffd}', 'a', '\n', '\u{fffd}', '\n', 'b', '\n']);
        assert_eq!(classify_input(chars[0]), InputClass::Invalid('\u{fffd}'));
    }

    #[test]
    fn multibyte_characters_stay_whole() {
        assert_eq!(pumped("Ä\n".as_bytes()), vec!['Ä', '\n']);
    }

    #[test]
    fn closed_receiver_ends_the_pump() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        assert!(pump_chars(Cursor::new(b"abc\n".to_vec()), &tx).is_ok());
    }
}

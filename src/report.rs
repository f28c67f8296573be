use chrono::Local;
use plugboard::{BoardConfig, Notification, Sink};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_banner(config: &BoardConfig, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("{}", palette.bold(palette.paint("--- Plugboard emulator started (26 letters A-Z) ---", ansi::CYAN)));
    println!("Connections must hold for {} seconds.", config.options.threshold.as_secs_f64());
    println!("Type letters (A-Z) and press ENTER.");
    println!("{}", palette.dim("Hint: connect sockets with a jumper to swap their letters."));
    if !config.wires.is_empty() {
        let wires: Vec<String> = config.wires.iter().map(ToString::to_string).collect();
        println!("{}", palette.paint(format!("Simulated jumpers: {}", wires.join(", ")), ansi::GRAY));
    }
}

/// Prints notifications to stdout.
pub struct Report {
    palette: ansi::Palette,
}

impl Report {
    pub fn new(color: bool) -> Self {
        Report { palette: ansi::Palette::new(color) }
    }
}

impl Sink for Report {
    fn notify(&mut self, notification: &Notification) {
        let palette = &self.palette;
        match notification {
            Notification::MappingChanged(change) => {
                let stamp = Local::now().format("%H:%M:%S").to_string();
                println!(
                    "\n{} {}",
                    palette.bold(palette.paint("--- Plugboard mapping updated ---", ansi::CYAN)),
                    palette.paint(format!("[{stamp}]"), ansi::GRAY)
                );
                if change.pairs.is_empty() {
                    println!("  {}", palette.dim("No swaps active."));
                }
                for key in &change.pairs {
                    println!("  {} is now {}", palette.paint(key.lo().to_string(), ansi::GREEN), key.hi());
                }
                for key in &change.rejected {
                    println!("  {}", palette.paint(format!("{key} ignored (conflicting connection)"), ansi::YELLOW));
                }
            }
            Notification::Substituted { .. } => println!("{notification}"),
            Notification::Unassigned(_) => println!("{}", palette.paint(notification.to_string(), ansi::YELLOW)),
            Notification::InvalidInput(_) => println!("{}", palette.paint(notification.to_string(), ansi::RED)),
        }
    }
}

//! hebfix - fix Hebrew/English text typed in the wrong keyboard layout

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Read;

use hebfix::config::load_config;
use hebfix::{convert_last_language, MajorityDetector};

#[derive(Parser)]
#[command(name = "hebfix", version, about = "Hebrew/English wrong-layout fixer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP conversion service
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        listen: Option<String>,
        /// Max conversions in flight (overrides config)
        #[arg(long)]
        max_concurrent_calls: Option<usize>,
        /// Max conversions per client per minute (overrides config)
        #[arg(long)]
        max_calls_per_minute: Option<usize>,
    },
    /// Convert the trailing run of TEXT (or stdin)
    Convert { text: Option<String> },
    /// Convert the whole of TEXT (or stdin) if it looks mistyped
    Detect { text: Option<String> },
    /// Convert the clipboard on Ctrl+Shift+Z and paste the result
    #[cfg(feature = "desktop")]
    Watch {
        /// Leave the result on the clipboard without pasting it
        #[arg(long)]
        clipboard_only: bool,
    },
}

/// Argument, or stdin without its trailing newline
fn input_text(text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    let trimmed = buf.trim_end_matches(['\n', '\r']).len();
    buf.truncate(trimmed);
    Ok(buf)
}

fn init_logging(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            listen,
            max_concurrent_calls,
            max_calls_per_minute,
        } => {
            init_logging("info");

            let mut config = load_config();
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(n) = max_concurrent_calls {
                config.max_concurrent_calls = n;
            }
            if let Some(n) = max_calls_per_minute {
                config.max_calls_per_minute = n;
            }

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(hebfix::server::serve(config))?;
        }
        Command::Convert { text } => {
            init_logging("warn");
            let text = input_text(text)?;
            println!("{}", convert_last_language(&text));
        }
        Command::Detect { text } => {
            init_logging("warn");
            let text = input_text(text)?;
            let (converted, kind) = MajorityDetector::with_defaults().convert_text(&text);
            println!("{}", converted);
            eprintln!("conversion: {}", kind);
        }
        #[cfg(feature = "desktop")]
        Command::Watch { clipboard_only } => {
            init_logging("info");
            hebfix::platform::run(!clipboard_only)?;
        }
    }

    Ok(())
}

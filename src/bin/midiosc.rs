//! midiosc - MIDI to OSC.

use clap::{ArgAction, Parser};
use midiosc::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, trace};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "midiosc", version, about = "MIDI to OSC", long_about = None)]
struct Cli {
    /// Configuration file, read after $XDG_CONFIG_HOME/midiosc/default.cfg
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Connect to the MIDI input whose name contains this
    #[arg(short, long, value_name = "PORT-NAME")]
    input: Option<String>,

    /// OSC destination, host:port or a port on localhost
    #[arg(short, long, value_name = "ADDR")]
    osc: Option<Destination>,

    /// Event timing: Immediate, Relative or Absolute (prefixes accepted)
    #[arg(short, long = "syncmode", value_name = "MODE")]
    sync_mode: Option<SyncMode>,

    /// Print configuration and traffic; repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Frames per quantum reported for hardware input (Relative lookahead)
    #[arg(long, default_value_t = 256, value_name = "FRAMES")]
    period: u32,

    /// Nominal frame clock rate
    #[arg(long, default_value_t = midiosc::DEFAULT_SAMPLE_RATE, value_name = "HZ")]
    sample_rate: u32,

    /// List MIDI inputs and exit
    #[arg(short, long)]
    list_ports: bool,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;
    Some(base.join("midiosc").join("default.cfg"))
}

fn read_config(path: &Path) -> Result<ParsedConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Reading config '{}'", path.display());
    Ok(parse_config(&text)?)
}

fn load_config(cli: &Cli) -> Result<ParsedConfig> {
    let mut config = ParsedConfig::default();

    if let Some(path) = default_config_path().filter(|path| path.is_file()) {
        config.merge(read_config(&path)?);
    }
    if let Some(path) = &cli.config {
        config.merge(read_config(path)?);
    }

    if let Some(destination) = &cli.osc {
        config.settings.destination = Some(destination.clone());
    }
    if let Some(input) = &cli.input {
        config.settings.input = Some(input.clone());
    }
    if let Some(mode) = cli.sync_mode {
        config.settings.sync_mode = Some(mode);
    }
    Ok(config)
}

#[cfg(feature = "midi-io")]
fn list_ports() -> Result<()> {
    for name in HardwareInput::list_ports()? {
        println!("{}", name);
    }
    Ok(())
}

#[cfg(not(feature = "midi-io"))]
fn list_ports() -> Result<()> {
    Err(Error::NoMidiBackend)
}

#[cfg(feature = "midi-io")]
fn connect_input(
    source: Option<&str>,
    capture: EventCapture,
    clock: Arc<dyn FrameClock>,
    period: u32,
) -> Result<HardwareInput> {
    Ok(HardwareInput::connect(source, capture, clock, period)?)
}

#[cfg(not(feature = "midi-io"))]
fn connect_input(
    _source: Option<&str>,
    _capture: EventCapture,
    _clock: Arc<dyn FrameClock>,
    _period: u32,
) -> Result<()> {
    Err(Error::NoMidiBackend)
}

async fn run(cli: Cli) -> Result<()> {
    if cli.list_ports {
        return list_ports();
    }

    let config = load_config(&cli)?;
    let input = config.settings.input.clone();

    debug!(
        rules = config.rules.len(),
        destination = %config.settings.destination.clone().unwrap_or_default().url(),
        "configuration loaded"
    );
    trace!("\n{}", config);

    let clock: Arc<dyn FrameClock> = Arc::new(SystemClock::new(cli.sample_rate)?);
    let mut bridge = Bridge::builder()
        .config(config)
        .clock(Arc::clone(&clock))
        .build()?;

    let capture = bridge.take_capture().ok_or(Error::CaptureTaken)?;
    let _input = connect_input(input.as_deref(), capture, clock, cli.period)?;

    bridge.start()?;
    info!("Press Ctrl+C to terminate");

    tokio::signal::ctrl_c().await?;
    info!("caught signal - shutting down");
    bridge.stop();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

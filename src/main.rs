use std::cell::RefCell;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rppal::gpio::Gpio;
use rppal::hal::Delay;
use tracing::info;
use tracing_subscriber::EnvFilter;

use r502_console::config::Settings;
use r502_console::{
    open_serial, Console, FingerprintSensor, Indicator, Led, NoLed, SerialReader, SerialWriter, R502,
};

/// Enroll, find and delete fingerprints on an R502 fingerprint module.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Settings file, on top of config/default
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port the module is connected to
    #[arg(long)]
    port: Option<String>,

    #[arg(long)]
    baud_rate: Option<u32>,

    /// Run without the status LED
    #[arg(long)]
    no_led: bool,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.list_ports {
        return print_ports();
    }

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        settings.serial.port = port;
    }
    if let Some(baud_rate) = cli.baud_rate {
        settings.serial.baud_rate = baud_rate;
    }
    if cli.no_led {
        settings.led.gpio_pin = None;
    }
    info!(port = %settings.serial.port, baud_rate = settings.serial.baud_rate, "using serial port");

    let port = open_serial(&settings.serial.port, settings.serial.baud_rate, settings.serial.timeout())
        .with_context(|| format!("Failed to open serial port {}", settings.serial.port))?;
    let port_cell = RefCell::new(port);

    let mut r502 = R502::new(SerialWriter(&port_cell), SerialReader(&port_cell), settings.sensor.address);
    let params = r502
        .handshake(settings.sensor.password)
        .context("Failed to find sensor, check wiring!")?;
    let (_, template_count) = r502.template_count()?;
    info!(
        library_size = params.finger_library_size,
        security_level = params.security_level,
        template_count,
        "sensor ready"
    );

    match settings.led.gpio_pin {
        Some(pin) => {
            let pin = Gpio::new()
                .and_then(|gpio| gpio.get(pin))
                .with_context(|| format!("Failed to open GPIO pin {} for the LED", pin))?
                .into_output();
            run(r502, Led::new(pin, Delay::new()), &settings)
        }
        None => run(r502, NoLed, &settings),
    }
}

fn run<S, I>(sensor: S, indicator: I, settings: &Settings) -> Result<()>
where
    S: FingerprintSensor,
    I: Indicator,
{
    let stdin = io::stdin();
    let mut console = Console::new(
        sensor,
        indicator,
        stdin.lock(),
        io::stdout(),
        settings.lockout.initial_state(),
        settings.library.slots(),
    );
    console.run()?;
    Ok(())
}

fn print_ports() -> Result<()> {
    let ports = serialport::available_ports().context("Failed to list serial ports")?;
    for port in ports {
        println!("Available port: {} ({:?})", port.port_name, port.port_type);
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

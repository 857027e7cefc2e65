use clap::Parser;
use embedded_hal_nb::serial::{self, ErrorKind, ErrorType};
use embedded_onewire::{OneWireBus, OneWireResult, OneWireSearch, OneWireSearchKind};
use linux_embedded_hal::{Delay, Serial, SerialError};
use onewire_uart::{SetBaudRate, UartError, UartOneWire, UartOneWireBuilder};
use serialport::SerialPort;
use std::process::ExitCode;

/// List the 1-Wire devices on a bus wired to a serial port
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the serial port (e.g., /dev/ttyUSB0)
    #[arg(short, long)]
    port: String,
    /// Baud rate of the reset pulse
    #[arg(long, default_value_t = 9600)]
    reset_baud: u32,
    /// Baud rate of the data slots
    #[arg(long, default_value_t = 115200)]
    data_baud: u32,
    /// Polls of the receiver before a character counts as lost
    #[arg(short, long, default_value_t = 100)]
    retries: u8,
    /// Only list devices of this family code (hex, e.g. 28)
    #[arg(short, long, value_parser = parse_family)]
    family: Option<u8>,
    /// Also list the devices with their alarm flag set
    #[arg(short, long)]
    alarmed: bool,
}

fn parse_family(arg: &str) -> Result<u8, String> {
    u8::from_str_radix(arg.trim_start_matches("0x"), 16).map_err(|e| e.to_string())
}

/// Serial port of `linux-embedded-hal` with runtime baud rate changes.
struct TtyPort(Serial);

#[derive(Debug)]
enum PortError {
    Serial(SerialError),
    Config(serialport::Error),
}

impl serial::Error for PortError {
    fn kind(&self) -> ErrorKind {
        match self {
            PortError::Serial(e) => e.kind(),
            PortError::Config(_) => ErrorKind::Other,
        }
    }
}

impl ErrorType for TtyPort {
    type Error = PortError;
}

impl serial::Read<u8> for TtyPort {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.0.read().map_err(|e| e.map(PortError::Serial))
    }
}

impl serial::Write<u8> for TtyPort {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.0.write(word).map_err(|e| e.map(PortError::Serial))
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.0.flush().map_err(|e| e.map(PortError::Serial))
    }
}

impl SetBaudRate for TtyPort {
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Self::Error> {
        self.0.0.set_baud_rate(baud).map_err(PortError::Config)
    }
}

type Bus = OneWireBus<UartOneWire<onewire_uart::SerialTransport<TtyPort, Delay>>, 64>;

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Open the serial port
    let serial = match Serial::open(args.port.clone(), args.data_baud) {
        Ok(serial) => serial,
        Err(e) => {
            log::error!("Failed to open {}: {e}", args.port);
            return ExitCode::FAILURE;
        }
    };
    let onewire = match UartOneWireBuilder::default()
        .with_reset_baud(args.reset_baud)
        .with_data_baud(args.data_baud)
        .with_retries(args.retries)
        .build(TtyPort(serial), Delay)
    {
        Ok(onewire) => onewire,
        Err(e) => {
            log::error!("Failed to configure {}: {e:?}", args.port);
            return ExitCode::FAILURE;
        }
    };
    let mut bus = Bus::new(onewire);
    match enumerate(&mut bus, &args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            log::error!("{}", bus.last_error().message());
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("1-Wire bus failure: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn enumerate(bus: &mut Bus, args: &Args) -> OneWireResult<bool, UartError<PortError>> {
    if !bus.initialize()? {
        return Ok(false);
    }
    log::info!("Found {} devices", bus.device_count());
    match args.family {
        Some(family) => {
            let mut search =
                OneWireSearch::with_family(bus.bus_mut(), OneWireSearchKind::Normal, family);
            while let Some(rom) = search.next()? {
                println!("{rom}");
            }
        }
        None => {
            for (idx, rom) in bus.devices().iter().enumerate() {
                println!("{idx:3}: {rom} (family 0x{:02x})", rom.family());
            }
        }
    }
    if args.alarmed {
        let mut search = bus.search(OneWireSearchKind::Alarmed);
        while let Some(rom) = search.next()? {
            println!("alarm: {rom}");
        }
    }
    Ok(true)
}

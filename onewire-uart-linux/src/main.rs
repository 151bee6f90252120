use std::io::{Read, Write};
use std::time::Duration;

use clap::Parser;
use onewire_uart::{Baudrate, RomSearch, SearchKind, UartOneWire, UartTransport};

/// Enumerate the devices on a UART-attached 1-Wire bus
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the serial port (e.g., /dev/ttyUSB0)
    #[arg(short, long)]
    port: String,

    /// Search only for devices in alarm state
    #[arg(long)]
    alarm: bool,
}

/// Serial port speaking the transport contract: a blocking write of the
/// slot buffer followed by a blocking read of the bytes echoed back through
/// the 1-Wire pin.
struct HostSerial {
    port: Box<dyn serialport::SerialPort>,
}

impl UartTransport for HostSerial {
    type Error = serialport::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.port.set_baud_rate(Baudrate::Data.hz())?;
        self.port.set_data_bits(serialport::DataBits::Eight)?;
        self.port.set_parity(serialport::Parity::None)?;
        self.port.set_stop_bits(serialport::StopBits::One)?;
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_baudrate(&mut self, baudrate: Baudrate) -> Result<(), Self::Error> {
        self.port.set_baud_rate(baudrate.hz())
    }

    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        // TX and RX are tied together on the 1-Wire pin, so the echo of
        // every transmitted byte arrives while it is being sent.
        self.port.write_all(buf)?;
        self.port.read_exact(buf)?;
        Ok(())
    }
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Open the serial port
    let port = serialport::new(&args.port, Baudrate::Data.hz())
        .timeout(Duration::from_secs(1))
        .open()
        .expect("Failed to open serial port");
    // Bring up the bus master
    let mut bus = UartOneWire::new(HostSerial { port }).expect("Failed to init 1-Wire bus");

    let kind = if args.alarm {
        SearchKind::Alarm
    } else {
        SearchKind::Normal
    };
    // Walk the bus, logging every device as it is discovered
    let found = RomSearch::new(&mut bus, kind)
        .for_each(|rom, index| {
            if let Some(rom) = rom {
                let bytes = rom.to_le_bytes();
                log::info!(
                    "device {}: rom {:016x} (family 0x{:02x})",
                    index,
                    rom,
                    bytes[0]
                );
            }
            Ok(())
        })
        .expect("Search failed");
    log::info!("Found {} device(s)", found);
}

//! ArduEye driver
//!
//! [`ArduEye`] ties the device link, the relay link, the dataset registry
//! and the inbound command ring together. Submodules split the work:
//!
//! - `device`: SPI transactions with the sensor
//! - `relay`: binary and monitor rendering toward the UI
//! - `flow`: the GO/ACK handshake
//! - `inbound`: draining the serial port and dispatching UI commands
//! - `acquire`: the per-pass dataset loop

mod acquire;
mod device;
mod flow;
mod inbound;
mod relay;

use embedded_hal::delay::DelayNs;
use heapless::Deque;

use ardueye_core::config::{ConfigError, DriverConfig, MAX_IN_SERIAL, MAX_SPI_PACKET_SIZE};
use ardueye_core::dataset::{Activation, DatasetRegistry};
use ardueye_hal::{InputPin, OutputPin, SerialPort, SpiBus};
use ardueye_protocol::{CommandBytes, CommandRing, DeviceCommand, DisplayHint};

pub use acquire::Transfer;
pub use device::DeviceLink;
pub use relay::RelayLink;

use crate::error::DriverError;

/// Commands received mid-transfer, held until the transfer finishes
pub const MAX_DEFERRED_COMMANDS: usize = 8;

/// Result of a driver operation
pub type DriverResult<T, SPI, SER> =
    Result<T, DriverError<<SPI as SpiBus>::Error, <SER as SerialPort>::Error>>;

/// ArduEye sensor driver
///
/// Owns the SPI bus, chip select, data-ready input, relay serial port and a
/// delay source.
pub struct ArduEye<SPI, CS, RDY, SER, D> {
    device: DeviceLink<SPI, CS>,
    ready: RDY,
    relay: RelayLink<SER>,
    delay: D,
    registry: DatasetRegistry,
    ring: CommandRing<MAX_IN_SERIAL>,
    deferred: Deque<CommandBytes, MAX_DEFERRED_COMMANDS>,
    chunk: [u8; MAX_SPI_PACKET_SIZE],
    config: DriverConfig,
}

impl<SPI, CS, RDY, SER, D> ArduEye<SPI, CS, RDY, SER, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    RDY: InputPin,
    SER: SerialPort,
    D: DelayNs,
{
    /// Create a driver with the default dataset table
    ///
    /// Chip select is released immediately.
    pub fn new(
        spi: SPI,
        cs: CS,
        ready: RDY,
        serial: SER,
        delay: D,
        config: DriverConfig,
    ) -> Result<Self, ConfigError> {
        Self::with_registry(spi, cs, ready, serial, delay, config, DatasetRegistry::default())
    }

    /// Create a driver with a custom dataset table
    pub fn with_registry(
        spi: SPI,
        cs: CS,
        ready: RDY,
        serial: SER,
        delay: D,
        config: DriverConfig,
        registry: DatasetRegistry,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            device: DeviceLink::new(spi, cs),
            ready,
            relay: RelayLink::new(serial, config.relay_enabled, config.monitor_mode),
            delay,
            registry,
            ring: CommandRing::new(),
            deferred: Deque::new(),
            chunk: [0; MAX_SPI_PACKET_SIZE],
            config,
        })
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Start streaming a dataset
    ///
    /// The command always goes to the sensor; the id joins the active set
    /// only if it names a known dataset.
    pub fn start(&mut self, id: u8) -> DriverResult<(), SPI, SER> {
        self.command(DeviceCommand::Display(id))?;
        match self.registry.activate(id) {
            Activation::Activated => {
                #[cfg(feature = "defmt")]
                defmt::info!("dataset {} started", id);
            }
            Activation::Unknown => {
                #[cfg(feature = "defmt")]
                defmt::debug!("start: unknown dataset {}", id);
            }
            Activation::AlreadyActive => {}
        }
        self.report_active_set()
    }

    /// Stop streaming a dataset
    pub fn stop(&mut self, id: u8) -> DriverResult<(), SPI, SER> {
        self.command(DeviceCommand::Stop(id))?;
        if self.registry.deactivate(id) {
            #[cfg(feature = "defmt")]
            defmt::info!("dataset {} stopped", id);
        }
        self.report_active_set()
    }

    fn report_active_set(&mut self) -> DriverResult<(), SPI, SER> {
        let registry = &self.registry;
        self.relay
            .text(|w| {
                w.write_str("active:")?;
                for id in registry.active_ids() {
                    write!(w, " {}", id)?;
                }
                Ok(())
            })
            .map_err(DriverError::Relay)
    }

    /// Ids of the active datasets, in activation order
    pub fn active_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.registry.active_ids()
    }

    /// Send a typed command to the sensor
    pub fn command(&mut self, command: DeviceCommand<'_>) -> DriverResult<(), SPI, SER> {
        command.with_bytes(|code, params| self.send_command(code, params))
    }

    /// Send a raw command byte and parameters to the sensor
    pub fn send_command(&mut self, code: u8, params: &[u8]) -> DriverResult<(), SPI, SER> {
        self.device
            .send_command(code, params)
            .map_err(DriverError::Device)?;
        self.relay
            .text(|w| {
                write!(w, "cmd {}", code)?;
                for param in params {
                    write!(w, " {}", param)?;
                }
                w.write_str(" sent")
            })
            .map_err(DriverError::Relay)
    }

    /// Capture a new fixed-pattern-noise mask
    pub fn calibrate(&mut self) -> DriverResult<(), SPI, SER> {
        self.command(DeviceCommand::Calibrate)
    }

    pub fn set_resolution(&mut self, rows: u8, cols: u8) -> DriverResult<(), SPI, SER> {
        self.command(DeviceCommand::Resolution { rows, cols })
    }

    pub fn set_flow_resolution(&mut self, rows: u8, cols: u8) -> DriverResult<(), SPI, SER> {
        self.command(DeviceCommand::FlowResolution { rows, cols })
    }

    pub fn set_flow_smoothing(&mut self, alpha: u8) -> DriverResult<(), SPI, SER> {
        self.command(DeviceCommand::FlowSmoothing(alpha))
    }

    /// Change how the UI renders a dataset; false for unknown ids
    pub fn set_display_hint(&mut self, id: u8, hint: DisplayHint) -> bool {
        self.registry.set_hint(id, hint)
    }

    pub fn display_hint(&self, id: u8) -> Option<DisplayHint> {
        self.registry.hint(id)
    }

    /// Sensor has a new frame (data-ready line high)
    pub fn data_ready(&mut self) -> bool {
        self.ready.is_high()
    }

    /// Sensor has finished booting and accepts commands
    ///
    /// Same line as [`data_ready`](Self::data_ready): the sensor raises it
    /// once it is up.
    pub fn sensor_ready(&mut self) -> bool {
        self.ready.is_high()
    }

    /// Turn relay transmission on or off
    ///
    /// Re-enabling also clears a stall left by an unanswered handshake.
    pub fn enable_relay(&mut self, on: bool) {
        self.relay.set_enabled(on);
    }

    pub fn relay_enabled(&self) -> bool {
        self.relay.is_enabled()
    }

    /// Relay was disabled because the UI stopped answering
    pub fn relay_stalled(&self) -> bool {
        self.relay.is_stalled()
    }

    /// Switch the relay between binary packets and text lines
    pub fn set_monitor_mode(&mut self, on: bool) {
        self.relay.set_monitor(on);
    }

    pub fn monitor_mode(&self) -> bool {
        self.relay.is_monitor()
    }

    /// Tear down the driver and return its collaborators
    pub fn into_parts(self) -> (SPI, CS, RDY, SER, D) {
        let (spi, cs) = self.device.release();
        (spi, cs, self.ready, self.relay.release(), self.delay)
    }
}

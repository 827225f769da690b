//! Test doubles for the driver's collaborators

use std::collections::{BTreeMap, VecDeque};
use std::string::String;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use ardueye_core::config::DriverConfig;
use ardueye_hal::{InputPin, OutputPin, SerialPort, SpiBus};
use ardueye_protocol::codes::{ACK, EOD, ESC, GO, SOD, SOH};
use ardueye_protocol::{DataHeader, Decoded, LinkMode, PacketDecoder, Token, Unescaper};

use crate::ArduEye;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLinkError;

/// Emulates the sensor end of the device link
///
/// Decodes write-mode traffic, answers SOH/SOD requests with canned data
/// once the host switches to read mode, and records everything else.
pub struct MockSensor {
    /// Bytes written in write mode
    pub wire: Vec<u8>,
    /// Command packets other than requests
    pub commands: Vec<Vec<u8>>,
    pub header_requests: Vec<u8>,
    pub payload_requests: Vec<u8>,
    pub end_of_data: usize,
    pub fail: bool,
    datasets: BTreeMap<u8, (DataHeader, Vec<u8>)>,
    decoder: PacketDecoder<64>,
    mode: LinkMode,
    response: VecDeque<u8>,
}

impl Default for MockSensor {
    fn default() -> Self {
        Self {
            wire: Vec::new(),
            commands: Vec::new(),
            header_requests: Vec::new(),
            payload_requests: Vec::new(),
            end_of_data: 0,
            fail: false,
            datasets: BTreeMap::new(),
            decoder: PacketDecoder::new(),
            mode: LinkMode::Write,
            response: VecDeque::new(),
        }
    }
}

impl MockSensor {
    pub fn add_dataset(&mut self, id: u8, rows: u16, cols: u16, payload: &[u8]) {
        let header = DataHeader { id, rows, cols };
        self.datasets.insert(id, (header, payload.to_vec()));
    }

    /// Response bytes not yet clocked out
    pub fn pending_response(&self) -> usize {
        self.response.len()
    }

    fn handle(&mut self, packet: &[u8]) {
        self.response.clear();
        match packet {
            [SOH, id] => {
                self.header_requests.push(*id);
                let header = self
                    .datasets
                    .get(id)
                    .map_or(DataHeader { id: *id, rows: 0, cols: 0 }, |(h, _)| *h);
                self.response.extend(header.to_bytes());
            }
            [SOD, id] => {
                self.payload_requests.push(*id);
                if let Some((_, payload)) = self.datasets.get(id) {
                    self.response.extend(payload.iter().copied());
                }
            }
            [EOD] => self.end_of_data += 1,
            _ => self.commands.push(packet.to_vec()),
        }
    }
}

impl SpiBus for MockSensor {
    type Error = MockLinkError;

    fn transfer_byte(&mut self, byte: u8) -> Result<u8, MockLinkError> {
        if self.fail {
            return Err(MockLinkError);
        }
        if self.mode == LinkMode::Read && byte == 0 {
            return Ok(self.response.pop_front().unwrap_or(0));
        }
        self.wire.push(byte);
        match self.decoder.feed(byte) {
            Ok(Some(Decoded::Signal(code))) => {
                if let Some(mode) = LinkMode::from_byte(code) {
                    self.mode = mode;
                }
            }
            Ok(Some(Decoded::Packet(packet))) => self.handle(&packet),
            _ => {}
        }
        Ok(0)
    }
}

/// How the mock UI answers `ESC GO`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoReply {
    /// Never answer
    Silent,
    /// Answer every GO with `ESC ACK`
    Ack,
    /// Answer with a noise byte until the nth GO, then ACK
    AckAfter(usize),
    /// ACK the first n GOs, then go silent
    AckFirst(usize),
}

/// Emulates the UI end of the relay link
pub struct MockSerial {
    pub inbound: VecDeque<u8>,
    pub outbound: Vec<u8>,
    pub go_reply: GoReply,
    /// GO signals seen
    pub gos: usize,
    pub fail: bool,
    unescaper: Unescaper,
}

impl Default for MockSerial {
    fn default() -> Self {
        Self {
            inbound: VecDeque::new(),
            outbound: Vec::new(),
            go_reply: GoReply::Silent,
            gos: 0,
            fail: false,
            unescaper: Unescaper::new(),
        }
    }
}

impl MockSerial {
    fn answer_go(&mut self) {
        self.gos += 1;
        let ack = match self.go_reply {
            GoReply::Silent => false,
            GoReply::Ack => true,
            GoReply::AckAfter(n) => {
                if self.gos < n {
                    self.inbound.push_back(0x55);
                }
                self.gos >= n
            }
            GoReply::AckFirst(n) => self.gos <= n,
        };
        if ack {
            self.inbound.extend([ESC, ACK]);
        }
    }
}

impl SerialPort for MockSerial {
    type Error = MockLinkError;

    fn available(&mut self) -> usize {
        self.inbound.len()
    }

    fn read_byte(&mut self) -> Result<u8, MockLinkError> {
        self.inbound.pop_front().ok_or(MockLinkError)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), MockLinkError> {
        if self.fail {
            return Err(MockLinkError);
        }
        for &byte in data {
            self.outbound.push(byte);
            if self.unescaper.feed(byte) == Some(Token::Marker(GO)) {
                self.answer_go();
            }
        }
        Ok(())
    }
}

/// Chip select
#[derive(Default)]
pub struct MockCs {
    pub high: bool,
    pub selections: usize,
}

impl OutputPin for MockCs {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        self.high = false;
        self.selections += 1;
    }
}

/// Data-ready line
#[derive(Default)]
pub struct MockReady {
    pub level: bool,
}

impl InputPin for MockReady {
    fn is_high(&mut self) -> bool {
        self.level
    }
}

/// Records requested delays instead of sleeping
#[derive(Default)]
pub struct MockDelay {
    pub ns: u64,
    pub us: u64,
    pub ms: Vec<u32>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.us += u64::from(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}

pub type TestEye = ArduEye<MockSensor, MockCs, MockReady, MockSerial, MockDelay>;

pub fn driver(config: DriverConfig) -> TestEye {
    ArduEye::new(
        MockSensor::default(),
        MockCs::default(),
        MockReady::default(),
        MockSerial::default(),
        MockDelay::default(),
        config,
    )
    .unwrap()
}

/// Split relay output into packets and signals
pub fn decode_relay(bytes: &[u8]) -> Vec<Decoded<1024>> {
    let mut decoder = PacketDecoder::new();
    bytes
        .iter()
        .filter_map(|&b| decoder.feed(b).ok().flatten())
        .collect()
}

pub fn monitor_text(port: &mut MockSerial) -> String {
    String::from_utf8_lossy(&port.outbound).into_owned()
}

//! # xbee
//!
//! A Rust library for Digi XBee radios in API mode.
//!
//! This library speaks the escaped API frame protocol (`AP=2`) over
//! USB/Serial and supports both 802.15.4 (Series 1) and ZigBee mesh
//! (Series 2) hardware.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Listener/filter dispatch for solicited and unsolicited frames
//! - Type-safe request and response frame implementations
//! - Opportunistic 64-bit to 16-bit address resolution for mesh networks
//! - Comprehensive error handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use xbee::{SerialNumber, XBee};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), xbee::Error> {
//!     // Open the local radio and read its configuration
//!     let device = XBee::open_port("/dev/ttyUSB0").await?;
//!     println!("Local serial: {}", device.serial_number());
//!
//!     // Send data to a remote radio and wait for the delivery report
//!     let remote: SerialNumber = "0013A20040A12345".parse()?;
//!     device
//!         .send_data(remote, &b"hello"[..])
//!         .deliver(Duration::from_secs(5))
//!         .await?;
//!
//!     // Receive data pushed by other nodes
//!     let mut incoming = device.incoming_data();
//!     let frame = incoming.next(Duration::from_secs(30)).await?;
//!     println!("{:?} sent {:?}", frame.source(), frame.payload());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Wire framing: escaping, checksums, API-IDs, frame-ids
//! - [`request`] / [`response`] - Typed transmit and receive frames
//! - [`address`] - Serial numbers, network addresses and the lookup cache
//! - [`dispatch`] / [`filter`] - Listener registration and frame routing
//! - [`parser`] - Push-based byte stream to response bridge
//! - [`transport`] - Transport implementations (currently USB/Serial)
//! - [`config`] - Device configuration and node discovery records
//! - [`client`] - High-level [`XBee`] device handle

pub mod address;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod parser;
pub mod protocol;
pub mod request;
pub mod response;
pub mod transport;

// Re-exports for convenience
pub use address::{AddressCache, NetworkAddress, SerialNumber, XBeeAddress};
pub use client::{
    AsyncSendResult, AtCommandBuilder, DEFAULT_COMMAND_TIMEOUT, ResetMode, SendDataBuilder, XBee,
};
pub use config::{ApiMode, DiscoveredNode, HardwareSeries, XBeeConfiguration, commands};
pub use dispatch::{ListenerId, ListenerTable, PacketListener};
pub use error::{Error, FrameError, Result};
pub use filter::ResponseFilter;
pub use parser::PacketParser;
pub use protocol::{ApiId, AtStatus, DeliveryStatus, ModemStatus};
pub use request::{
    AtCommandName, AtCommandRequest, ExplicitTxRequest, RemoteAtCommandRequest, TransmitRequest,
    Tx16Request, Tx64Request, XBeeRequest, tx_options,
};
pub use response::{
    AtResponse, ExplicitRxResponse, IoSampleResponse, ModemStatusResponse,
    NodeIdentificationResponse, RemoteAtResponse, Rx16Response, Rx64Response,
    TransmitStatusResponse, TxStatusResponse, XBeeResponse, ZigbeeRxResponse,
};
pub use transport::{SerialTransport, serial::list_ports};

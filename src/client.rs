//! High-level device handle.
//!
//! [`XBee`] owns the transport, the packet parser and the background read
//! task, and exposes the request/response cycle as async calls: a send
//! registers a correlation listener before the frame leaves the host, so the
//! response cannot be lost to the gap between write and await.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::address::{AddressCache, NetworkAddress, SerialNumber, XBeeAddress};
use crate::config::{
    ApiMode, DiscoveredNode, HardwareSeries, XBeeConfiguration, commands, register_value,
};
use crate::dispatch::{ListenerId, PacketListener};
use crate::error::{Error, Result};
use crate::filter::ResponseFilter;
use crate::parser::PacketParser;
use crate::protocol::{ApiId, FrameIdGenerator, ModemStatus, NO_REPLY_FRAME_ID, encode_packet};
use crate::request::{
    AtCommandName, AtCommandRequest, RemoteAtCommandRequest, TransmitRequest, Tx16Request,
    Tx64Request, XBeeRequest,
};
use crate::response::XBeeResponse;
use crate::transport::serial::SerialConfig;
use crate::transport::{SerialTransport, Transport};

/// Default deadline for a local command round trip.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Deadline for the modem status that follows a software reset.
const RESET_TIMEOUT: Duration = Duration::from_secs(5);

/// Discovery window used when the `NT` register cannot be read.
const DEFAULT_DISCOVERY_WINDOW: Duration = Duration::from_secs(7);

/// Attempts for each configuration register read at open time.
const CONFIG_READ_ATTEMPTS: u32 = 3;

/// How to reset the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Reboot the module (`FR`). Confirmed by a watchdog-reset modem status.
    Software,
    /// Leave and rejoin the network (`NR`) without rebooting.
    Network,
}

/// In-flight request handle returned by [`XBee::send`].
///
/// The correlation listener is already registered; await
/// [`AsyncSendResult::response`] to consume the reply, or
/// [`AsyncSendResult::discard`] the handle to stop caring.
pub struct AsyncSendResult {
    frame_id: u8,
    listener: PacketListener,
}

impl AsyncSendResult {
    /// The frame-id the request went out under.
    #[must_use]
    pub const fn frame_id(&self) -> u8 {
        self.frame_id
    }

    /// Waits for the correlated response.
    ///
    /// Device-reported failures are surfaced as errors: a non-OK AT status
    /// becomes [`Error::At`] and a failed delivery becomes
    /// [`Error::Delivery`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no response arrived within the deadline.
    pub async fn response(mut self, timeout: Duration) -> Result<Arc<XBeeResponse>> {
        let response = match self.listener.next(timeout).await {
            Ok(response) => response,
            Err(e) => {
                self.listener.remove();
                return Err(e);
            }
        };

        match &*response {
            XBeeResponse::At(at) if !at.status.is_ok() => Err(Error::At {
                command: at.command.to_string(),
                status: at.status,
            }),
            XBeeResponse::RemoteAt(at) if !at.status.is_ok() => Err(Error::At {
                command: at.command.to_string(),
                status: at.status,
            }),
            XBeeResponse::TxStatus(status) if !status.status.is_success() => {
                Err(Error::Delivery(status.status))
            }
            XBeeResponse::TransmitStatus(status) if !status.status.is_success() => {
                Err(Error::Delivery(status.status))
            }
            _ => Ok(response),
        }
    }

    /// Deregisters the correlation listener without waiting.
    pub fn discard(self) {
        self.listener.remove();
    }
}

/// Handle to an opened radio.
///
/// Cloning is intentionally not provided; share the handle behind an `Arc`
/// if multiple tasks need it. All methods take `&self`.
pub struct XBee<T: Transport = SerialTransport> {
    transport: Arc<Mutex<T>>,
    parser: Arc<PacketParser>,
    frame_ids: FrameIdGenerator,
    cache: Arc<AddressCache>,
    configuration: XBeeConfiguration,
    command_timeout: Duration,
    read_task: Option<JoinHandle<()>>,
}

impl XBee<SerialTransport> {
    /// Opens a serial port, starts the read loop and reads the device
    /// configuration.
    ///
    /// Each configuration register is read with up to three attempts before
    /// the open fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be opened or the device does not
    /// answer the configuration reads.
    pub async fn open(config: SerialConfig) -> Result<Self> {
        let mut transport = SerialTransport::new(config);
        transport.connect().await?;
        let reader = transport.take_reader().ok_or(Error::NotConnected)?;

        let parser = Arc::new(PacketParser::new());
        let read_task = tokio::spawn({
            let parser = Arc::clone(&parser);
            async move {
                if let Err(e) = SerialTransport::run_read_loop(reader, parser).await {
                    tracing::warn!("read loop stopped: {e}");
                }
            }
        });

        // Configuration is not known yet; AT commands are series-agnostic,
        // so the reads below work under this placeholder.
        let placeholder = XBeeConfiguration {
            hardware_version: 0,
            firmware_version: 0,
            series: HardwareSeries::Series2,
            serial_number: SerialNumber(0),
            node_identifier: String::new(),
            api_mode: ApiMode::EnabledWithEscaping,
        };
        let mut device = Self::assemble(transport, parser, placeholder, Some(read_task));

        device.configuration = device.read_configuration().await?;
        tracing::info!(
            serial = %device.configuration.serial_number,
            series = ?device.configuration.series,
            "device configured"
        );

        device.register_default_listeners();
        Ok(device)
    }

    /// Opens a port by path with default serial settings.
    ///
    /// # Errors
    ///
    /// See [`XBee::open`].
    pub async fn open_port(port: impl Into<String>) -> Result<Self> {
        Self::open(SerialConfig::new(port)).await
    }
}

impl<T: Transport + 'static> XBee<T> {
    /// Wraps an already-connected transport with a known configuration.
    ///
    /// The caller is responsible for feeding received bytes into the parser;
    /// no read task is spawned.
    #[must_use]
    pub fn with_transport(transport: T, configuration: XBeeConfiguration) -> Self {
        let parser = Arc::new(PacketParser::new());
        let device = Self::assemble(transport, parser, configuration, None);
        device.register_default_listeners();
        device
    }

    fn assemble(
        transport: T,
        parser: Arc<PacketParser>,
        configuration: XBeeConfiguration,
        read_task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            parser,
            frame_ids: FrameIdGenerator::new(),
            cache: Arc::new(AddressCache::new()),
            configuration,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            read_task,
        }
    }

    fn register_default_listeners(&self) {
        self.parser.listeners().subscribe(
            ResponseFilter::api_ids(vec![ApiId::ModemStatus]),
            |response| {
                if let XBeeResponse::ModemStatus(status) = &**response {
                    tracing::info!(status = %status.status, "modem status");
                }
            },
        );

        // Point-to-point radios carry no usable 16-bit routing hints.
        if self.configuration.series.is_mesh_capable() {
            let cache = Arc::clone(&self.cache);
            self.parser
                .listeners()
                .subscribe(ResponseFilter::any(), move |response| {
                    if let Some(address) = response.source() {
                        cache.record(address.serial, address.network);
                    }
                });
        }
    }

    /// Stops the read loop and disconnects the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails to disconnect.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
        self.parser.listeners().clear();
        self.parser.reset();
        self.transport.lock().await.disconnect().await
    }

    /// The configuration read at open time.
    #[must_use]
    pub const fn configuration(&self) -> &XBeeConfiguration {
        &self.configuration
    }

    /// The local radio's serial number.
    #[must_use]
    pub const fn serial_number(&self) -> SerialNumber {
        self.configuration.serial_number
    }

    /// Cached 16-bit address for a remote radio, or the unknown sentinel.
    #[must_use]
    pub fn network_address(&self, serial: SerialNumber) -> NetworkAddress {
        self.cache.network_address(serial)
    }

    /// Number of corrupt packets dropped by the decoder so far.
    #[must_use]
    pub fn dropped_packets(&self) -> u64 {
        self.parser.dropped_packets()
    }

    /// Returns true while the transport is connected.
    pub async fn is_connected(&self) -> bool {
        self.transport.lock().await.is_connected()
    }

    /// Sets the deadline used for internal command round trips.
    pub const fn set_command_timeout(&mut self, timeout: Duration) {
        self.command_timeout = timeout;
    }

    /// Writes a new node identifier to the device (`NI`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::At`] if the device rejects the value.
    pub async fn set_node_identifier(&mut self, identifier: &str) -> Result<()> {
        self.at_command(commands::NODE_IDENTIFIER)
            .parameter(Bytes::copy_from_slice(identifier.as_bytes()))
            .execute(self.command_timeout)
            .await?;
        self.configuration.node_identifier = identifier.to_string();
        Ok(())
    }

    /// Writes a new API mode to the device (`AP`).
    ///
    /// Switching away from [`ApiMode::EnabledWithEscaping`] makes the device
    /// stop speaking the framing this library produces; the change still
    /// goes through, the caller is assumed to know what it is doing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::At`] if the device rejects the value.
    pub async fn set_api_mode(&mut self, mode: ApiMode) -> Result<()> {
        self.at_command(commands::API_ENABLE)
            .parameter(vec![mode.as_byte()])
            .execute(self.command_timeout)
            .await?;
        self.configuration.api_mode = mode;
        Ok(())
    }

    /// Checks whether the configured hardware accepts this request kind.
    #[must_use]
    pub const fn is_request_supported(&self, request: &XBeeRequest) -> bool {
        match request {
            XBeeRequest::Tx64(_) | XBeeRequest::Tx16(_) => {
                matches!(self.configuration.series, HardwareSeries::Series1)
            }
            XBeeRequest::Transmit(_) | XBeeRequest::ExplicitTx(_) => {
                self.configuration.series.is_mesh_capable()
            }
            XBeeRequest::At(_) | XBeeRequest::RemoteAt(_) => true,
        }
    }

    fn check_supported(&self, request: &XBeeRequest) -> Result<()> {
        if self.is_request_supported(request) {
            Ok(())
        } else {
            Err(Error::Unsupported {
                reason: format!(
                    "{:?} frames are not accepted by {:?} hardware",
                    request.api_id(),
                    self.configuration.series
                ),
            })
        }
    }

    async fn write_frame(&self, request: &XBeeRequest) -> Result<()> {
        let packet = encode_packet(&request.frame_data())?;
        tracing::debug!(
            api_id = ?request.api_id(),
            frame_id = request.frame_id(),
            bytes = packet.len(),
            "sending frame"
        );
        self.transport.lock().await.send(packet).await
    }

    /// Sends a request and returns a handle on the correlated response.
    ///
    /// A fresh frame-id is assigned and the listener for it is registered
    /// before the frame is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for a request kind the hardware series
    /// does not accept, or a transport error if the write fails.
    pub async fn send(&self, request: impl Into<XBeeRequest>) -> Result<AsyncSendResult> {
        let mut request = request.into();
        self.check_supported(&request)?;

        let frame_id = self.frame_ids.next_id();
        request.set_frame_id(frame_id);

        let filter = ResponseFilter::api_ids(request.response_api_ids()).with_frame_id(frame_id);
        let listener = self.parser.listeners().listen(filter, Some(1));

        self.watch_delivery(&request, frame_id);

        if let Err(e) = self.write_frame(&request).await {
            listener.remove();
            return Err(e);
        }
        Ok(AsyncSendResult { frame_id, listener })
    }

    /// Sends a request with frame-id zero; the device sends no response.
    ///
    /// # Errors
    ///
    /// Same as [`XBee::send`].
    pub async fn send_no_reply(&self, request: impl Into<XBeeRequest>) -> Result<()> {
        let mut request = request.into();
        self.check_supported(&request)?;
        request.set_frame_id(NO_REPLY_FRAME_ID);
        self.write_frame(&request).await
    }

    /// Learns the delivered-to network address from the transmit status of a
    /// mesh unicast.
    fn watch_delivery(&self, request: &XBeeRequest, frame_id: u8) {
        let destination = match request {
            XBeeRequest::Transmit(r) => r.destination.serial,
            XBeeRequest::ExplicitTx(r) => r.destination.serial,
            _ => return,
        };
        if destination == SerialNumber::BROADCAST {
            return;
        }

        let cache = Arc::clone(&self.cache);
        let mut listener = self.parser.listeners().listen(
            ResponseFilter::api_ids(vec![ApiId::ZigbeeTransmitStatus]).with_frame_id(frame_id),
            Some(1),
        );
        let timeout = self.command_timeout;
        tokio::spawn(async move {
            match listener.next(timeout).await {
                Ok(response) => {
                    if let XBeeResponse::TransmitStatus(status) = &*response {
                        if status.status.is_success() {
                            cache.record(destination, status.destination);
                        }
                    }
                }
                Err(_) => listener.remove(),
            }
        });
    }

    /// Starts building a data transmission.
    ///
    /// The request variant is chosen by hardware series: mesh radios get a
    /// ZigBee transmit with the cached routing hint filled in, 802.15.4
    /// radios a 64-bit transmit (or 16-bit when only the network half of the
    /// destination is set).
    pub fn send_data(
        &self,
        destination: impl Into<XBeeAddress>,
        payload: impl Into<Bytes>,
    ) -> SendDataBuilder<'_, T> {
        SendDataBuilder {
            device: self,
            destination: destination.into(),
            options: 0,
            broadcast_radius: 0,
            payload: payload.into(),
        }
    }

    /// Starts building an AT command.
    pub fn at_command(&self, command: impl Into<AtCommandName>) -> AtCommandBuilder<'_, T> {
        AtCommandBuilder {
            device: self,
            command: command.into(),
            parameter: Bytes::new(),
            queued: false,
            destination: None,
        }
    }

    /// Discovers reachable nodes, sizing the collection window from the
    /// device's `NT` register.
    ///
    /// # Errors
    ///
    /// Returns an error if the discovery broadcast cannot be sent or the
    /// device reports a failure.
    pub async fn discover_nodes(&self) -> Result<Vec<DiscoveredNode>> {
        let window = match self
            .at_command(commands::DISCOVERY_TIMEOUT)
            .value(self.command_timeout)
            .await
        {
            Ok(value) => {
                let tenths = register_value(commands::DISCOVERY_TIMEOUT, &value)?;
                // Grace second on top of the device-side window.
                Duration::from_millis(tenths * 100 + 1000)
            }
            Err(e) => {
                tracing::warn!("NT read failed ({e}), using default discovery window");
                DEFAULT_DISCOVERY_WINDOW
            }
        };
        self.discover_nodes_with(window).await
    }

    /// Discovers reachable nodes, collecting records for the given window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::At`] if the device rejects the discovery command.
    pub async fn discover_nodes_with(&self, window: Duration) -> Result<Vec<DiscoveredNode>> {
        let mut nodes = Vec::new();
        self.discover_nodes_each(window, |node| nodes.push(node))
            .await?;
        Ok(nodes)
    }

    /// Discovers reachable nodes, handing each record to the callback as it
    /// arrives instead of collecting.
    ///
    /// Every valid record also feeds the address cache. Malformed records
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::At`] if the device rejects the discovery command.
    pub async fn discover_nodes_each(
        &self,
        window: Duration,
        mut on_node: impl FnMut(DiscoveredNode),
    ) -> Result<()> {
        let frame_id = self.frame_ids.next_id();
        let mut request = AtCommandRequest::read(commands::NODE_DISCOVER);
        request.frame_id = frame_id;

        let mut listener = self
            .parser
            .listeners()
            .listen(ResponseFilter::node_discovery(frame_id), None);

        if let Err(e) = self.write_frame(&XBeeRequest::At(request)).await {
            listener.remove();
            return Err(e);
        }

        let deadline = Instant::now() + window;
        let outcome = loop {
            let now = Instant::now();
            if now >= deadline {
                break Ok(());
            }
            match listener.next(deadline - now).await {
                Ok(response) => {
                    let XBeeResponse::At(at) = &*response else {
                        continue;
                    };
                    if !at.status.is_ok() {
                        break Err(Error::At {
                            command: at.command.to_string(),
                            status: at.status,
                        });
                    }
                    // An empty record is the end-of-list marker.
                    if at.value.is_empty() {
                        break Ok(());
                    }
                    match DiscoveredNode::parse(&at.value) {
                        Ok(node) => {
                            self.cache.record(node.address.serial, node.address.network);
                            tracing::debug!(address = %node.address, identifier = %node.node_identifier, "discovered node");
                            on_node(node);
                        }
                        Err(e) => tracing::warn!("skipping malformed discovery record: {e}"),
                    }
                }
                Err(Error::Timeout { .. }) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        listener.remove();
        outcome
    }

    /// Resets the radio and waits for the modem status that confirms it.
    ///
    /// A software reset must be confirmed by the watchdog-reset status the
    /// module emits when it comes back up; a network reset is confirmed by
    /// whatever status the rejoin produces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedModemStatus`] if a software reset produces
    /// a different status, or [`Error::Timeout`] if none arrives.
    pub async fn reset(&self, mode: ResetMode) -> Result<()> {
        let mut status = self
            .parser
            .listeners()
            .listen(ResponseFilter::api_ids(vec![ApiId::ModemStatus]), Some(1));

        // Frame-id zero: the module acts before it could answer.
        let command = match mode {
            ResetMode::Software => AtCommandRequest::read(commands::SOFTWARE_RESET),
            ResetMode::Network => AtCommandRequest::write(commands::NETWORK_RESET, vec![0x00]),
        };
        if let Err(e) = self.send_no_reply(command).await {
            status.remove();
            return Err(e);
        }

        match status.next(RESET_TIMEOUT).await {
            Ok(response) => match &*response {
                XBeeResponse::ModemStatus(modem) => match mode {
                    ResetMode::Network => Ok(()),
                    ResetMode::Software if modem.status == ModemStatus::WatchdogReset => Ok(()),
                    ResetMode::Software => Err(Error::UnexpectedModemStatus(modem.status)),
                },
                _ => Err(Error::Protocol {
                    message: "modem status listener yielded another frame kind".into(),
                }),
            },
            Err(e) => {
                status.remove();
                Err(e)
            }
        }
    }

    /// Long-lived listener over all inbound data frames.
    #[must_use]
    pub fn incoming_data(&self) -> PacketListener {
        self.parser
            .listeners()
            .listen(ResponseFilter::incoming_data(), None)
    }

    /// Long-lived listener over modem status frames.
    #[must_use]
    pub fn modem_status(&self) -> PacketListener {
        self.parser
            .listeners()
            .listen(ResponseFilter::api_ids(vec![ApiId::ModemStatus]), None)
    }

    /// Registers a listener with an arbitrary filter.
    #[must_use]
    pub fn listen(&self, filter: ResponseFilter, max_count: Option<usize>) -> PacketListener {
        self.parser.listeners().listen(filter, max_count)
    }

    /// Registers an inline handler; see
    /// [`ListenerTable::subscribe`](crate::dispatch::ListenerTable::subscribe)
    /// for the constraints it runs under.
    pub fn subscribe(
        &self,
        filter: ResponseFilter,
        handler: impl Fn(&Arc<XBeeResponse>) + Send + Sync + 'static,
    ) -> ListenerId {
        self.parser.listeners().subscribe(filter, handler)
    }

    /// Removes a subscription registered with [`XBee::subscribe`].
    pub fn remove_listener(&self, id: ListenerId) {
        self.parser.listeners().remove(id);
    }

    async fn read_register(&self, command: AtCommandName) -> Result<Bytes> {
        let mut last = None;
        for attempt in 1..=CONFIG_READ_ATTEMPTS {
            match self.at_command(command).value(self.command_timeout).await {
                Ok(value) => return Ok(value),
                Err(e @ Error::Timeout { .. }) => {
                    tracing::warn!(%command, attempt, "register read timed out");
                    last = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last.unwrap_or(Error::NotConnected))
    }

    async fn read_configuration(&self) -> Result<XBeeConfiguration> {
        let hardware_version = register_value(
            commands::HARDWARE_VERSION,
            &self.read_register(commands::HARDWARE_VERSION).await?,
        )? as u16;
        let firmware_version = register_value(
            commands::FIRMWARE_VERSION,
            &self.read_register(commands::FIRMWARE_VERSION).await?,
        )? as u16;
        let serial_high = register_value(
            commands::SERIAL_HIGH,
            &self.read_register(commands::SERIAL_HIGH).await?,
        )?;
        let serial_low = register_value(
            commands::SERIAL_LOW,
            &self.read_register(commands::SERIAL_LOW).await?,
        )?;
        let identifier_bytes = self.read_register(commands::NODE_IDENTIFIER).await?;
        let api_mode = register_value(
            commands::API_ENABLE,
            &self.read_register(commands::API_ENABLE).await?,
        )? as u8;

        Ok(XBeeConfiguration {
            hardware_version,
            firmware_version,
            series: HardwareSeries::from_hardware_version(hardware_version),
            serial_number: SerialNumber((serial_high << 32) | serial_low),
            node_identifier: String::from_utf8_lossy(&identifier_bytes)
                .trim()
                .to_string(),
            api_mode: ApiMode::from_byte(api_mode),
        })
    }
}

impl<T: Transport> Drop for XBee<T> {
    fn drop(&mut self) {
        if let Some(task) = self.read_task.take() {
            task.abort();
        }
    }
}

/// Builder for a data transmission; see [`XBee::send_data`].
pub struct SendDataBuilder<'a, T: Transport> {
    device: &'a XBee<T>,
    destination: XBeeAddress,
    options: u8,
    broadcast_radius: u8,
    payload: Bytes,
}

impl<T: Transport + 'static> SendDataBuilder<'_, T> {
    /// Sets the transmit options bitfield.
    #[must_use]
    pub const fn options(mut self, options: u8) -> Self {
        self.options = options;
        self
    }

    /// Sets the maximum broadcast hop count (mesh only).
    #[must_use]
    pub const fn broadcast_radius(mut self, radius: u8) -> Self {
        self.broadcast_radius = radius;
        self
    }

    fn build(&self) -> XBeeRequest {
        match self.device.configuration.series {
            HardwareSeries::Series1 => {
                // Serial zero with a known network half means the caller
                // addressed by 16-bit address alone.
                if self.destination.serial == SerialNumber(0)
                    && !self.destination.network.is_unknown()
                {
                    Tx16Request {
                        frame_id: 0,
                        destination: self.destination.network,
                        options: self.options,
                        payload: self.payload.clone(),
                    }
                    .into()
                } else {
                    Tx64Request {
                        frame_id: 0,
                        destination: self.destination.serial,
                        options: self.options,
                        payload: self.payload.clone(),
                    }
                    .into()
                }
            }
            HardwareSeries::Series2 => {
                let mut destination = self.destination;
                if destination.network.is_unknown() {
                    destination.network = self.device.cache.network_address(destination.serial);
                }
                TransmitRequest {
                    frame_id: 0,
                    destination,
                    broadcast_radius: self.broadcast_radius,
                    options: self.options,
                    payload: self.payload.clone(),
                }
                .into()
            }
        }
    }

    /// Sends and returns the in-flight handle.
    ///
    /// # Errors
    ///
    /// See [`XBee::send`].
    pub async fn begin(self) -> Result<AsyncSendResult> {
        self.device.send(self.build()).await
    }

    /// Sends and waits for the delivery confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Delivery`] if the radio reports the packet was not
    /// delivered, [`Error::Timeout`] if no confirmation arrives.
    pub async fn deliver(self, timeout: Duration) -> Result<()> {
        let result = self.device.send(self.build()).await?;
        result.response(timeout).await.map(|_| ())
    }

    /// Sends without requesting a delivery confirmation.
    ///
    /// # Errors
    ///
    /// See [`XBee::send_no_reply`].
    pub async fn send_no_reply(self) -> Result<()> {
        self.device.send_no_reply(self.build()).await
    }
}

/// Builder for a local or remote AT command; see [`XBee::at_command`].
pub struct AtCommandBuilder<'a, T: Transport> {
    device: &'a XBee<T>,
    command: AtCommandName,
    parameter: Bytes,
    queued: bool,
    destination: Option<XBeeAddress>,
}

impl<T: Transport + 'static> AtCommandBuilder<'_, T> {
    /// Sets the parameter, turning the read into a write.
    #[must_use]
    pub fn parameter(mut self, parameter: impl Into<Bytes>) -> Self {
        self.parameter = parameter.into();
        self
    }

    /// Queues the change instead of applying it immediately.
    #[must_use]
    pub const fn queued(mut self) -> Self {
        self.queued = true;
        self
    }

    /// Addresses the command to a remote radio.
    #[must_use]
    pub fn remote(mut self, destination: impl Into<XBeeAddress>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    fn build(&self) -> XBeeRequest {
        if let Some(destination) = self.destination {
            RemoteAtCommandRequest {
                frame_id: 0,
                destination,
                apply_changes: !self.queued,
                command: self.command,
                parameter: self.parameter.clone(),
            }
            .into()
        } else {
            AtCommandRequest {
                frame_id: 0,
                command: self.command,
                parameter: self.parameter.clone(),
                queued: self.queued,
            }
            .into()
        }
    }

    /// Sends and returns the in-flight handle.
    ///
    /// # Errors
    ///
    /// See [`XBee::send`].
    pub async fn begin(self) -> Result<AsyncSendResult> {
        self.device.send(self.build()).await
    }

    /// Sends and returns the register value from the response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::At`] for a non-OK command status.
    pub async fn value(self, timeout: Duration) -> Result<Bytes> {
        let result = self.device.send(self.build()).await?;
        let response = result.response(timeout).await?;
        match &*response {
            XBeeResponse::At(at) => Ok(at.value.clone()),
            XBeeResponse::RemoteAt(at) => Ok(at.value.clone()),
            _ => Err(Error::Protocol {
                message: "AT correlation listener yielded another frame kind".into(),
            }),
        }
    }

    /// Sends and waits for the command to be acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::At`] for a non-OK command status.
    pub async fn execute(self, timeout: Duration) -> Result<()> {
        self.value(timeout).await.map(|_| ())
    }

    /// Sends with frame-id zero; the device stays silent.
    ///
    /// # Errors
    ///
    /// See [`XBee::send_no_reply`].
    pub async fn send_no_reply(self) -> Result<()> {
        self.device.send_no_reply(self.build()).await
    }
}

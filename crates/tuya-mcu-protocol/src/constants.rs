//! Protocol constants
//!
//! These constants define the frame layout, command codes, datapoint type
//! tags and network status codes used on the Tuya MCU serial link.

// ============================================================================
// Frame Layout
// ============================================================================

/// First byte of every frame.
pub const FRAME_HEADER_HI: u8 = 0x55;
/// Second byte of every frame.
pub const FRAME_HEADER_LO: u8 = 0xAA;
/// Header, version, command and the two length bytes.
pub const FRAME_PREAMBLE_LEN: usize = 6;
/// Size of the trailing checksum.
pub const FRAME_CHECKSUM_LEN: usize = 1;
/// Maximum payload carried by a single frame.
pub const MAX_PAYLOAD_LEN: usize = 1024;
/// Largest possible frame on the wire.
pub const MAX_FRAME_LEN: usize = FRAME_PREAMBLE_LEN + MAX_PAYLOAD_LEN + FRAME_CHECKSUM_LEN;

// ============================================================================
// Device Types (version byte)
// ============================================================================

/// Frame sent by the module (host controller).
pub const DEVICE_TYPE_MODULE: u8 = 0x00;
/// Frame sent by the MCU (peripheral).
pub const DEVICE_TYPE_MCU: u8 = 0x03;

// ============================================================================
// Command Codes
// ============================================================================

/// Heartbeat, sent by the module and answered by the MCU.
pub const CMD_HEARTBEATS: u8 = 0x00;
/// Query product information (JSON payload in the reply).
pub const CMD_QUERY_PRODUCT_INFO: u8 = 0x01;
/// Query the MCU working mode.
pub const CMD_QUERY_WORKING_MODE: u8 = 0x02;
/// Report the module network status.
pub const CMD_REPORT_NETWORK_STATUS: u8 = 0x03;
/// Reset Wi-Fi.
pub const CMD_RESET_WIFI: u8 = 0x04;
/// Reset Wi-Fi and select a pairing mode.
pub const CMD_RESET_WIFI_PAIR_MODE: u8 = 0x05;
/// Deliver datapoint commands to the MCU.
pub const CMD_SEND_COMMAND: u8 = 0x06;
/// Asynchronous datapoint status report from the MCU.
pub const CMD_REPORT_STATUS_ASYNC: u8 = 0x07;
/// Ask the MCU to report all datapoints.
pub const CMD_QUERY_DP_STATUS: u8 = 0x08;
/// Start an OTA upgrade.
pub const CMD_START_OTA: u8 = 0x0A;
/// Transmit an OTA data block.
pub const CMD_TRANSMIT_OTA_DATA: u8 = 0x0B;
/// Get GMT time.
pub const CMD_GET_GMT_TIME: u8 = 0x0C;
/// Wi-Fi scanning self test.
pub const CMD_TEST_WIFI_SCANNING: u8 = 0x0E;
/// Get module free memory.
pub const CMD_GET_MODULE_MEMORY: u8 = 0x0F;
/// Get local time.
pub const CMD_GET_LOCAL_TIME: u8 = 0x1C;
/// Enable weather services.
pub const CMD_ENABLE_WEATHER_SERVICES: u8 = 0x20;
/// Weather data delivery.
pub const CMD_SEND_WEATHER_DATA: u8 = 0x21;
/// Synchronous datapoint status report from the MCU.
pub const CMD_REPORT_STATUS_SYNC: u8 = 0x22;
/// Result of a synchronous status report.
pub const CMD_RESPONSE_STATUS_SYNC: u8 = 0x23;
/// Get Wi-Fi signal strength.
pub const CMD_GET_WIFI_SIGNAL_STRENGTH: u8 = 0x24;
/// Disable heartbeats.
pub const CMD_DISABLE_HEARTBEATS: u8 = 0x25;
/// Pair through the serial port.
pub const CMD_PAIR_VIA_SERIAL_PORT: u8 = 0x2A;
/// MCU asks for the current network status.
pub const CMD_GET_CURRENT_NETWORK_STATUS: u8 = 0x2B;
/// Wi-Fi connection self test.
pub const CMD_TEST_WIFI_CONNECTION: u8 = 0x2C;
/// Get the module MAC address.
pub const CMD_GET_MODULE_MAC_ADDRESS: u8 = 0x2D;
/// Extended services.
pub const CMD_EXTENDED_SERVICES: u8 = 0x34;
/// Bluetooth pairing.
pub const CMD_BLUETOOTH_PAIRING: u8 = 0x35;
/// Report or send extended datapoints.
pub const CMD_REPORT_SEND_EXTENDED_DP: u8 = 0x36;
/// New feature setting.
pub const CMD_NEW_FEATURE_SETTING: u8 = 0x37;

// ============================================================================
// Datapoint Type Tags
// ============================================================================

/// Raw bytes.
pub const DP_TYPE_RAW: u8 = 0x00;
/// Boolean, one byte.
pub const DP_TYPE_BOOLEAN: u8 = 0x01;
/// Signed 32-bit integer, big-endian.
pub const DP_TYPE_VALUE: u8 = 0x02;
/// UTF-8 string.
pub const DP_TYPE_STRING: u8 = 0x03;
/// Enumeration, one byte.
pub const DP_TYPE_ENUM: u8 = 0x04;
/// Bitmap, one, two or four bytes big-endian.
pub const DP_TYPE_BITMAP: u8 = 0x05;

/// Datapoint id, type tag and two length bytes.
pub const DP_HEADER_LEN: usize = 4;
/// Body length of a `Value` datapoint.
pub const DP_VALUE_LEN: usize = 4;

// ============================================================================
// Network Status
// ============================================================================

/// Smart config (EZ) pairing.
pub const NET_STATUS_PAIRING_EZ_MODE: u8 = 0x00;
/// Access point pairing.
pub const NET_STATUS_PAIRING_AP_MODE: u8 = 0x01;
/// Wi-Fi configured but not connected.
pub const NET_STATUS_WIFI_NOT_CONNECTED: u8 = 0x02;
/// Connected to the router.
pub const NET_STATUS_WIFI_CONNECTED: u8 = 0x03;
/// Connected to the cloud.
pub const NET_STATUS_CLOUD_CONNECTED: u8 = 0x04;
/// Low power mode.
pub const NET_STATUS_LOW_POWER_MODE: u8 = 0x05;
/// EZ and AP pairing at once.
pub const NET_STATUS_EZ_AP_CONFIG_MODE: u8 = 0x06;

// ============================================================================
// Sync Report Results
// ============================================================================

/// Payload of a `ResponseStatusSync` rejecting the report.
pub const SYNC_REPORT_FAILED: u8 = 0x00;
/// Payload of a `ResponseStatusSync` accepting the report.
pub const SYNC_REPORT_OK: u8 = 0x01;

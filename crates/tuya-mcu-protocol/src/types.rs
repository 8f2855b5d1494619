//! Common types used in the protocol.

use crate::constants::*;
use crate::error::ProtocolError;

/// Command carried in the fourth byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Heartbeat.
    Heartbeats,
    /// Query product information.
    QueryProductInfo,
    /// Query working mode.
    QueryWorkingMode,
    /// Network status report.
    ReportNetworkStatus,
    /// Reset Wi-Fi.
    ResetWiFi,
    /// Reset Wi-Fi and select pairing mode.
    ResetWiFiPairMode,
    /// Datapoint commands for the MCU.
    SendCommand,
    /// Asynchronous datapoint report.
    ReportStatusAsync,
    /// Query all datapoints.
    QueryDpStatus,
    /// Start OTA.
    StartOta,
    /// OTA data block.
    TransmitOtaData,
    /// GMT time.
    GetGmtTime,
    /// Wi-Fi scanning test.
    TestWiFiScanning,
    /// Module memory.
    GetModuleMemory,
    /// Local time.
    GetLocalTime,
    /// Enable weather services.
    EnableWeatherServices,
    /// Weather data.
    SendWeatherData,
    /// Synchronous datapoint report.
    ReportStatusSync,
    /// Result of a synchronous report.
    ResponseStatusSync,
    /// Wi-Fi signal strength.
    GetWiFiSignalStrength,
    /// Disable heartbeats.
    DisableHeartbeats,
    /// Serial port pairing.
    PairViaSerialPort,
    /// Current network status request.
    GetCurrentNetworkStatus,
    /// Wi-Fi connection test.
    TestWiFiConnection,
    /// Module MAC address.
    GetModuleMacAddress,
    /// Extended services.
    ExtendedServices,
    /// Bluetooth pairing.
    BluetoothPairing,
    /// Extended datapoints.
    ReportSendExtendedDp,
    /// New feature setting.
    NewFeatureSetting,
    /// A command byte this crate does not know.
    Unknown(u8),
}

impl From<u8> for Command {
    fn from(value: u8) -> Self {
        match value {
            CMD_HEARTBEATS => Command::Heartbeats,
            CMD_QUERY_PRODUCT_INFO => Command::QueryProductInfo,
            CMD_QUERY_WORKING_MODE => Command::QueryWorkingMode,
            CMD_REPORT_NETWORK_STATUS => Command::ReportNetworkStatus,
            CMD_RESET_WIFI => Command::ResetWiFi,
            CMD_RESET_WIFI_PAIR_MODE => Command::ResetWiFiPairMode,
            CMD_SEND_COMMAND => Command::SendCommand,
            CMD_REPORT_STATUS_ASYNC => Command::ReportStatusAsync,
            CMD_QUERY_DP_STATUS => Command::QueryDpStatus,
            CMD_START_OTA => Command::StartOta,
            CMD_TRANSMIT_OTA_DATA => Command::TransmitOtaData,
            CMD_GET_GMT_TIME => Command::GetGmtTime,
            CMD_TEST_WIFI_SCANNING => Command::TestWiFiScanning,
            CMD_GET_MODULE_MEMORY => Command::GetModuleMemory,
            CMD_GET_LOCAL_TIME => Command::GetLocalTime,
            CMD_ENABLE_WEATHER_SERVICES => Command::EnableWeatherServices,
            CMD_SEND_WEATHER_DATA => Command::SendWeatherData,
            CMD_REPORT_STATUS_SYNC => Command::ReportStatusSync,
            CMD_RESPONSE_STATUS_SYNC => Command::ResponseStatusSync,
            CMD_GET_WIFI_SIGNAL_STRENGTH => Command::GetWiFiSignalStrength,
            CMD_DISABLE_HEARTBEATS => Command::DisableHeartbeats,
            CMD_PAIR_VIA_SERIAL_PORT => Command::PairViaSerialPort,
            CMD_GET_CURRENT_NETWORK_STATUS => Command::GetCurrentNetworkStatus,
            CMD_TEST_WIFI_CONNECTION => Command::TestWiFiConnection,
            CMD_GET_MODULE_MAC_ADDRESS => Command::GetModuleMacAddress,
            CMD_EXTENDED_SERVICES => Command::ExtendedServices,
            CMD_BLUETOOTH_PAIRING => Command::BluetoothPairing,
            CMD_REPORT_SEND_EXTENDED_DP => Command::ReportSendExtendedDp,
            CMD_NEW_FEATURE_SETTING => Command::NewFeatureSetting,
            _ => Command::Unknown(value),
        }
    }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self {
        match value {
            Command::Heartbeats => CMD_HEARTBEATS,
            Command::QueryProductInfo => CMD_QUERY_PRODUCT_INFO,
            Command::QueryWorkingMode => CMD_QUERY_WORKING_MODE,
            Command::ReportNetworkStatus => CMD_REPORT_NETWORK_STATUS,
            Command::ResetWiFi => CMD_RESET_WIFI,
            Command::ResetWiFiPairMode => CMD_RESET_WIFI_PAIR_MODE,
            Command::SendCommand => CMD_SEND_COMMAND,
            Command::ReportStatusAsync => CMD_REPORT_STATUS_ASYNC,
            Command::QueryDpStatus => CMD_QUERY_DP_STATUS,
            Command::StartOta => CMD_START_OTA,
            Command::TransmitOtaData => CMD_TRANSMIT_OTA_DATA,
            Command::GetGmtTime => CMD_GET_GMT_TIME,
            Command::TestWiFiScanning => CMD_TEST_WIFI_SCANNING,
            Command::GetModuleMemory => CMD_GET_MODULE_MEMORY,
            Command::GetLocalTime => CMD_GET_LOCAL_TIME,
            Command::EnableWeatherServices => CMD_ENABLE_WEATHER_SERVICES,
            Command::SendWeatherData => CMD_SEND_WEATHER_DATA,
            Command::ReportStatusSync => CMD_REPORT_STATUS_SYNC,
            Command::ResponseStatusSync => CMD_RESPONSE_STATUS_SYNC,
            Command::GetWiFiSignalStrength => CMD_GET_WIFI_SIGNAL_STRENGTH,
            Command::DisableHeartbeats => CMD_DISABLE_HEARTBEATS,
            Command::PairViaSerialPort => CMD_PAIR_VIA_SERIAL_PORT,
            Command::GetCurrentNetworkStatus => CMD_GET_CURRENT_NETWORK_STATUS,
            Command::TestWiFiConnection => CMD_TEST_WIFI_CONNECTION,
            Command::GetModuleMacAddress => CMD_GET_MODULE_MAC_ADDRESS,
            Command::ExtendedServices => CMD_EXTENDED_SERVICES,
            Command::BluetoothPairing => CMD_BLUETOOTH_PAIRING,
            Command::ReportSendExtendedDp => CMD_REPORT_SEND_EXTENDED_DP,
            Command::NewFeatureSetting => CMD_NEW_FEATURE_SETTING,
            Command::Unknown(code) => code,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Unknown(code) => write!(f, "Unknown(0x{:02X})", code),
            other => write!(f, "{:?}(0x{:02X})", other, u8::from(*other)),
        }
    }
}

/// Sender recorded in the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    /// The module (host controller).
    Module,
    /// The MCU (peripheral).
    Mcu,
    /// Anything else.
    Unknown(u8),
}

impl From<u8> for DeviceType {
    fn from(value: u8) -> Self {
        match value {
            DEVICE_TYPE_MODULE => DeviceType::Module,
            DEVICE_TYPE_MCU => DeviceType::Mcu,
            _ => DeviceType::Unknown(value),
        }
    }
}

impl From<DeviceType> for u8 {
    fn from(value: DeviceType) -> Self {
        match value {
            DeviceType::Module => DEVICE_TYPE_MODULE,
            DeviceType::Mcu => DEVICE_TYPE_MCU,
            DeviceType::Unknown(v) => v,
        }
    }
}

/// Datapoint type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Raw bytes.
    Raw,
    /// Boolean.
    Boolean,
    /// Signed 32-bit integer.
    Value,
    /// UTF-8 string.
    String,
    /// Enumeration.
    Enum,
    /// Bitmap.
    Bitmap,
    /// Unknown type tag.
    Unknown(u8),
}

impl From<u8> for DataType {
    fn from(value: u8) -> Self {
        match value {
            DP_TYPE_RAW => DataType::Raw,
            DP_TYPE_BOOLEAN => DataType::Boolean,
            DP_TYPE_VALUE => DataType::Value,
            DP_TYPE_STRING => DataType::String,
            DP_TYPE_ENUM => DataType::Enum,
            DP_TYPE_BITMAP => DataType::Bitmap,
            _ => DataType::Unknown(value),
        }
    }
}

impl From<DataType> for u8 {
    fn from(value: DataType) -> Self {
        match value {
            DataType::Raw => DP_TYPE_RAW,
            DataType::Boolean => DP_TYPE_BOOLEAN,
            DataType::Value => DP_TYPE_VALUE,
            DataType::String => DP_TYPE_STRING,
            DataType::Enum => DP_TYPE_ENUM,
            DataType::Bitmap => DP_TYPE_BITMAP,
            DataType::Unknown(v) => v,
        }
    }
}

/// Network status of the module, as reported to the MCU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkStatus {
    /// Smart config pairing.
    PairingEzMode,
    /// Access point pairing.
    PairingApMode,
    /// Wi-Fi configured but not connected.
    #[default]
    WiFiNotConnected,
    /// Connected to the router.
    WiFiConnected,
    /// Connected to the cloud.
    CloudConnected,
    /// Low power mode.
    LowPowerMode,
    /// EZ and AP pairing at once.
    EzApConfigMode,
    /// Unknown status code.
    Unknown(u8),
}

impl From<u8> for NetworkStatus {
    fn from(value: u8) -> Self {
        match value {
            NET_STATUS_PAIRING_EZ_MODE => NetworkStatus::PairingEzMode,
            NET_STATUS_PAIRING_AP_MODE => NetworkStatus::PairingApMode,
            NET_STATUS_WIFI_NOT_CONNECTED => NetworkStatus::WiFiNotConnected,
            NET_STATUS_WIFI_CONNECTED => NetworkStatus::WiFiConnected,
            NET_STATUS_CLOUD_CONNECTED => NetworkStatus::CloudConnected,
            NET_STATUS_LOW_POWER_MODE => NetworkStatus::LowPowerMode,
            NET_STATUS_EZ_AP_CONFIG_MODE => NetworkStatus::EzApConfigMode,
            _ => NetworkStatus::Unknown(value),
        }
    }
}

impl From<NetworkStatus> for u8 {
    fn from(value: NetworkStatus) -> Self {
        match value {
            NetworkStatus::PairingEzMode => NET_STATUS_PAIRING_EZ_MODE,
            NetworkStatus::PairingApMode => NET_STATUS_PAIRING_AP_MODE,
            NetworkStatus::WiFiNotConnected => NET_STATUS_WIFI_NOT_CONNECTED,
            NetworkStatus::WiFiConnected => NET_STATUS_WIFI_CONNECTED,
            NetworkStatus::CloudConnected => NET_STATUS_CLOUD_CONNECTED,
            NetworkStatus::LowPowerMode => NET_STATUS_LOW_POWER_MODE,
            NetworkStatus::EzApConfigMode => NET_STATUS_EZ_AP_CONFIG_MODE,
            NetworkStatus::Unknown(v) => v,
        }
    }
}

/// Product information returned by `QueryProductInfo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductInfo {
    /// Product id assigned by the platform.
    pub product_id: String,
    /// MCU firmware version.
    pub version: String,
    /// Operation mode reported by the MCU.
    pub operation_mode: u16,
}

impl ProductInfo {
    /// Decode the JSON document carried in a product info reply.
    ///
    /// Missing keys, or keys holding the wrong JSON type, fall back to their
    /// defaults. The payload itself must be UTF-8 and valid JSON.
    pub fn from_json(payload: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(payload).map_err(|_| ProtocolError::InvalidUtf8)?;
        let document: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ProtocolError::InvalidProductInfo(e.to_string()))?;

        let string_field = |key: &str| {
            document
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Ok(ProductInfo {
            product_id: string_field("product_id"),
            version: string_field("version"),
            operation_mode: document
                .get("operation_mode")
                .and_then(|v| v.as_u64())
                .and_then(|v| u16::try_from(v).ok())
                .unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_codes_round_trip() {
        for code in 0..=u8::MAX {
            assert_eq!(u8::from(Command::from(code)), code);
        }
        assert_eq!(Command::from(0x07), Command::ReportStatusAsync);
        assert_eq!(Command::from(0x2B), Command::GetCurrentNetworkStatus);
        assert_eq!(Command::from(0x09), Command::Unknown(0x09));
    }

    #[test]
    fn test_network_status_default() {
        assert_eq!(NetworkStatus::default(), NetworkStatus::WiFiNotConnected);
        assert_eq!(u8::from(NetworkStatus::CloudConnected), 0x04);
    }

    #[test]
    fn test_product_info_from_json() {
        let info =
            ProductInfo::from_json(br#"{"product_id":"wq01","version":"1.2.0","operation_mode":1}"#)
                .expect("valid product info");
        assert_eq!(info.product_id, "wq01");
        assert_eq!(info.version, "1.2.0");
        assert_eq!(info.operation_mode, 1);
    }

    #[test]
    fn test_product_info_defaults() {
        let info = ProductInfo::from_json(br#"{"version":3}"#).expect("valid json");
        assert_eq!(info, ProductInfo::default());
    }

    #[test]
    fn test_product_info_malformed() {
        assert!(matches!(
            ProductInfo::from_json(b"{\"product_id\":"),
            Err(ProtocolError::InvalidProductInfo(_))
        ));
        assert_eq!(
            ProductInfo::from_json(&[0xFF, 0xFE]),
            Err(ProtocolError::InvalidUtf8)
        );
    }
}

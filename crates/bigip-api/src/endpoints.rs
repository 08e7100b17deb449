// Fixed management REST endpoints on the device.

pub const SYSTEM_CONFIGURATION: &str = "/mgmt/tm/sys/config";
pub const GLOBAL_SETTINGS: &str = "/mgmt/tm/sys/global-settings";
pub const DNS_SETTINGS: &str = "/mgmt/tm/sys/dns";
pub const NTP_SETTINGS: &str = "/mgmt/tm/sys/ntp";
pub const SYSLOG_SETTINGS: &str = "/mgmt/tm/sys/syslog";
pub const LICENSE_ACTIVATION: &str = "/mgmt/tm/shared/licensing/activation";
pub const LICENSE_REGISTRATION: &str = "/mgmt/tm/shared/licensing/registration";
pub const DEVICES: &str = "/mgmt/tm/cm/device";
pub const SETUP_UTILITY_STATUS: &str = "/mgmt/tm/sys/db/setup.run";
pub const SAVE_CONFIGURATION: &str = "/mgmt/shared/save-config";

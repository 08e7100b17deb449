// Device reads and the concurrent settings fan-out

use bigip_api::{DeviceProxy, GlobalSettingsUpdate};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};

use super::diff::{Change, CurrentSettings, plan};
use crate::error::CoreError;
use crate::task::{DnsProperties, InputProperties, NtpProperties};

/// Read global, NTP, DNS and syslog settings concurrently.
pub(crate) async fn read_current(proxy: &DeviceProxy) -> Result<CurrentSettings, CoreError> {
    let (global, ntp, dns, syslog) = tokio::try_join!(
        proxy.get_global_settings(),
        proxy.get_ntp_settings(),
        proxy.get_dns_settings(),
        proxy.get_syslog_settings(),
    )?;
    Ok(CurrentSettings {
        global,
        ntp,
        dns,
        syslog,
    })
}

/// Overwrite `props` with what the device actually has.
pub(crate) async fn read_back(
    proxy: &DeviceProxy,
    mut props: InputProperties,
) -> Result<InputProperties, CoreError> {
    let current = read_current(proxy).await?;

    props.hostname = current.global.hostname;
    props.ntp = NtpProperties {
        servers: current.ntp.servers,
        timezone: current.ntp.timezone,
    };
    props.dns = DnsProperties {
        servers: current.dns.servers,
        search: current.dns.search,
    };
    props.syslog.servers = current
        .syslog
        .servers()
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(props)
}

/// Push every changed settings domain to the device.
///
/// All calls run concurrently. Every started call is driven to
/// completion; the first failure observed is returned. Updates that
/// already landed are not rolled back.
pub(crate) async fn apply_settings(
    proxy: &DeviceProxy,
    desired: &InputProperties,
    default_device_name: &str,
) -> Result<(), CoreError> {
    let current = read_current(proxy).await?;
    let changes = plan(&current, desired, proxy.context().default_timezone());
    info!(changes = changes.len(), "applying settings");

    let mut pending: FuturesUnordered<BoxFuture<'_, Result<(), CoreError>>> = changes
        .into_iter()
        .map(|change| apply_change(proxy, change, default_device_name).boxed())
        .collect();

    let mut first_error = None;
    while let Some(result) = pending.next().await {
        if let Err(e) = result {
            debug!(error = %e, "settings update failed");
            first_error.get_or_insert(e);
        }
    }

    first_error.map_or(Ok(()), Err)
}

async fn apply_change(
    proxy: &DeviceProxy,
    change: Change,
    default_device_name: &str,
) -> Result<(), CoreError> {
    match change {
        Change::Hostname(hostname) => change_hostname(proxy, &hostname, default_device_name).await,
        Change::Ntp { servers, timezone } => {
            Ok(proxy.set_ntp_settings(&servers, Some(&timezone)).await?)
        }
        Change::Dns { servers, search } => Ok(proxy.set_dns_settings(&servers, &search).await?),
        Change::Syslog { servers } => Ok(proxy.set_syslog_settings(&servers).await?),
        Change::SetupUtility(display) => Ok(proxy.set_setup_utility_status(display).await?),
    }
}

/// Set the hostname, then rename the self device record to match.
///
/// The rename is skipped when the record already carries the target
/// name. An empty hostname targets `default_device_name`.
async fn change_hostname(
    proxy: &DeviceProxy,
    hostname: &str,
    default_device_name: &str,
) -> Result<(), CoreError> {
    proxy
        .update_global_settings(&GlobalSettingsUpdate {
            hostname: Some(hostname.to_owned()),
        })
        .await?;

    let current_name = proxy.self_device_name().await?;
    let target = if hostname.is_empty() {
        default_device_name
    } else {
        hostname
    };
    if target == current_name {
        debug!(name = target, "device name already matches");
        return Ok(());
    }
    Ok(proxy.change_device_name(&current_name, target).await?)
}

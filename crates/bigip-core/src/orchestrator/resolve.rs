// Device reference resolution

use bigip_api::{BasicCredential, DeviceProxy, LOCAL_HOST, ProxyContext};
use tracing::debug;

use crate::error::CoreError;
use crate::task::DeviceReference;

/// Build the proxy a device reference points at.
///
/// The local sentinel maps straight to a basic-auth proxy. Any other link
/// is looked up on the local device first to learn the member's address
/// and device group, which then get a trust-based proxy.
pub(crate) async fn resolve_proxy(
    ctx: &ProxyContext,
    reference: &DeviceReference,
    credential: Option<BasicCredential>,
) -> Result<DeviceProxy, CoreError> {
    if reference.link == LOCAL_HOST {
        debug!("device reference targets the local device");
        return Ok(DeviceProxy::local(ctx, credential));
    }

    let local = DeviceProxy::local(ctx, credential.clone());
    let record = local
        .lookup_device(&reference.link)
        .await
        .map_err(|e| {
            if e.is_not_found() || e.device_message_contains("not registered") {
                CoreError::InvalidDeviceReference {
                    reference: reference.link.clone(),
                }
            } else {
                CoreError::from(e)
            }
        })?;

    debug!(
        address = %record.address,
        group = ?record.group_name,
        "resolved device reference"
    );
    Ok(DeviceProxy::new(
        ctx,
        record.address,
        record.group_name,
        credential,
    )?)
}

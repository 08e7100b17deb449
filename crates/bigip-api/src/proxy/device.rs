// Cluster device records

use reqwest::Method;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::DeviceProxy;
use crate::endpoints;
use crate::error::Error;
use crate::models::{DeviceCollection, DeviceInfo, DeviceRecord};

impl DeviceProxy {
    /// All device records known to the cluster this device belongs to.
    pub async fn get_device_infos(&self) -> Result<Vec<DeviceInfo>, Error> {
        let collection: DeviceCollection = self.get(endpoints::DEVICES).await?;
        Ok(collection.items)
    }

    /// Name of the record flagged as this device.
    pub async fn self_device_name(&self) -> Result<String, Error> {
        self.get_device_infos()
            .await?
            .into_iter()
            .find(DeviceInfo::is_self)
            .map(|d| d.name)
            .ok_or(Error::SelfDeviceNotFound)
    }

    /// Rename the device record `from` to `to`.
    pub async fn change_device_name(&self, from: &str, to: &str) -> Result<(), Error> {
        debug!(device = %self.address, from, to, "renaming device");
        self.execute(
            Method::POST,
            endpoints::DEVICES,
            &json!({ "command": "mv", "name": from, "target": to }),
        )
        .await
    }

    /// Fetch the device group member record a reference link points at.
    ///
    /// Only the path and query of `link` are used; they are resolved
    /// against this proxy, which is expected to be the local device.
    pub async fn lookup_device(&self, link: &str) -> Result<DeviceRecord, Error> {
        let path_and_query = match Url::parse(link) {
            Ok(url) => match url.query() {
                Some(query) => format!("{}?{query}", url.path()),
                None => url.path().to_owned(),
            },
            Err(_) if link.starts_with('/') => link.to_owned(),
            Err(_) => format!("/{link}"),
        };
        debug!(link, "looking up device reference");
        self.get(&path_and_query).await
    }
}

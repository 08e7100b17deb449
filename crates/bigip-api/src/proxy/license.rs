// License activation and registration

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::DeviceProxy;
use crate::endpoints;
use crate::error::Error;
use crate::models::{
    ActivationRequest, ActivationStatus, LicenseActivationStatus, LicenseInfo,
    RegistrationResponse,
};
use crate::poll::repeat_while;

/// Vendor string the registration endpoint reports for a valid license.
const LICENSE_VENDOR: &str = "F5 Networks, Inc.";

#[derive(Debug, Default, Deserialize)]
struct SubmissionResponse {
    #[serde(default)]
    status: Option<ActivationStatus>,
}

impl DeviceProxy {
    /// Submit a license for activation and wait for a terminal status.
    ///
    /// Returns the signed license text on `LICENSING_COMPLETE`. A device
    /// that wants the EULA accepted first yields [`Error::EulaRequired`]
    /// carrying the EULA text. Polling is bounded by the context's
    /// [`LicensePolling`](super::LicensePolling) and has no cancellation.
    pub async fn activate_license(&self, license: &LicenseInfo) -> Result<String, Error> {
        info!(device = %self.address, "submitting license for activation");

        let submission: SubmissionResponse = self
            .send(
                Method::POST,
                endpoints::LICENSE_ACTIVATION,
                &ActivationRequest::from(license),
            )
            .await?;

        match submission.status {
            Some(ActivationStatus::InProgress) => {
                debug!(device = %self.address, "license submitted for activation");
            }
            other => {
                return Err(Error::LicenseSubmission {
                    status: other.map(|s| s.to_string()).unwrap_or_default(),
                });
            }
        }

        let polling = self.ctx.license_polling;
        let result = repeat_while(
            move || self.get_license_activation_status(),
            LicenseActivationStatus::is_in_progress,
            polling.max_attempts,
            polling.interval,
        )
        .await?;

        match result.status {
            ActivationStatus::Complete => {
                info!(device = %self.address, "license activation complete");
                Ok(result.license_text.unwrap_or_default())
            }
            ActivationStatus::NeedEulaAccept => {
                info!(device = %self.address, "license activation requires EULA acceptance");
                Err(Error::EulaRequired {
                    eula_text: result.eula_text.unwrap_or_default(),
                })
            }
            ActivationStatus::InProgress | ActivationStatus::Other(_) => {
                let detail = result
                    .error_text
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| result.status.to_string());
                Err(Error::LicenseActivation { detail })
            }
        }
    }

    /// One poll of the activation endpoint.
    pub async fn get_license_activation_status(&self) -> Result<LicenseActivationStatus, Error> {
        self.get(endpoints::LICENSE_ACTIVATION).await
    }

    /// Register signed license text with the device.
    pub async fn register_license(&self, license_text: &str) -> Result<(), Error> {
        info!(device = %self.address, "registering license");

        let response: RegistrationResponse = self
            .send(
                Method::PUT,
                endpoints::LICENSE_REGISTRATION,
                &json!({ "licenseText": license_text }),
            )
            .await?;

        if response.vendor.as_deref() == Some(LICENSE_VENDOR) {
            Ok(())
        } else {
            debug!(device = %self.address, vendor = ?response.vendor, "unexpected registration vendor");
            Err(Error::LicenseRegistration)
        }
    }
}

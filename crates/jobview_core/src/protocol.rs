//! The two remote job view protocol flavors, both mapped onto the canonical job API.
use serde::{Deserialize, Serialize};

use crate::fields::local_file_or_url;
use crate::job::{Finish, Job};
use crate::properties::Properties;

/// Calls of the legacy (V2) job view interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacyCall {
    SetPercent(u32),
    SetTotalAmount { amount: u64, unit: String },
    SetProcessedAmount { amount: u64, unit: String },
    SetSpeed(u64),
    SetInfoMessage(String),
    SetDescriptionField { number: u32, name: String, value: String },
    ClearDescriptionField(u32),
    SetDestUrl(String),
    SetSuspended(bool),
    SetError(u32),
    /// Stops the job using the error code set earlier through `SetError`.
    Terminate { error_message: String },
}

/// Calls of the current (V3) job view interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    Legacy(LegacyCall),
    Terminate {
        error_code: u32,
        error_message: String,
        /// Reserved for future extension.
        #[serde(default)]
        hints: Properties,
    },
    Update(Properties),
}

impl LegacyCall {
    pub fn is_terminate(&self) -> bool {
        matches!(self, LegacyCall::Terminate { .. })
    }
}

impl Call {
    pub fn is_terminate(&self) -> bool {
        match self {
            Call::Legacy(call) => call.is_terminate(),
            Call::Terminate { .. } => true,
            Call::Update(_) => false,
        }
    }
}

impl From<LegacyCall> for Call {
    fn from(call: LegacyCall) -> Self {
        Call::Legacy(call)
    }
}

impl Job {
    /// Applies a legacy call. Returns how the job finished if the call terminated it.
    pub fn handle_legacy(&mut self, call: LegacyCall) -> Option<Finish> {
        match call {
            LegacyCall::SetPercent(percent) => self.set_percent(percent),
            LegacyCall::SetTotalAmount { amount, unit } => self.set_total_amount(amount, &unit),
            LegacyCall::SetProcessedAmount { amount, unit } => {
                self.set_processed_amount(amount, &unit)
            }
            LegacyCall::SetSpeed(speed) => self.set_speed(speed),
            // Legacy peers send the job heading through setInfoMessage.
            LegacyCall::SetInfoMessage(message) => self.set_summary(&message),
            LegacyCall::SetDescriptionField {
                number,
                name,
                value,
            } => self.set_description_field(number, &name, &value),
            LegacyCall::ClearDescriptionField(number) => self.clear_description_field(number),
            LegacyCall::SetDestUrl(url) => self.set_dest_url(local_file_or_url(&url)),
            LegacyCall::SetSuspended(suspended) => self.set_suspended(suspended),
            LegacyCall::SetError(code) => self.set_error(code),
            LegacyCall::Terminate { error_message } => {
                return self.terminate(None, &error_message, &Properties::new());
            }
        }
        None
    }

    /// Applies a current-protocol call. Returns how the job finished if the call terminated it.
    pub fn handle(&mut self, call: Call) -> Option<Finish> {
        match call {
            Call::Legacy(call) => self.handle_legacy(call),
            Call::Terminate {
                error_code,
                error_message,
                hints,
            } => self.terminate(Some(error_code), &error_message, &hints),
            Call::Update(properties) => {
                self.apply_properties(&properties);
                None
            }
        }
    }
}

//! Request Facade: named methods with a string-valued argument map.
//!
//! | Method              | Arguments            | Result          |
//! |---------------------|----------------------|-----------------|
//! | `getTPMStatus`      |                      | integer         |
//! | `getBiometryStatus` |                      | integer         |
//! | `generateKey`       | `tag`                | null            |
//! | `deleteKey`         | `tag`                | null            |
//! | `encrypt`           | `tag`, `data`        | base64 string   |
//! | `decrypt`           | `tag`, `data`        | plaintext       |
//! | `configure`         | `windowsDataToSign`  | null            |

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CipherError, ErrorCode};
use crate::service::CipherService;

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Methods the facade dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodName {
    GetTpmStatus,
    GetBiometryStatus,
    GenerateKey,
    DeleteKey,
    Encrypt,
    Decrypt,
    Configure,
}

impl MethodName {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GetTpmStatus => "getTPMStatus",
            Self::GetBiometryStatus => "getBiometryStatus",
            Self::GenerateKey => "generateKey",
            Self::DeleteKey => "deleteKey",
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
            Self::Configure => "configure",
        }
    }

    /// Arguments that must be present and string-typed.
    #[must_use]
    pub const fn required_arguments(&self) -> &'static [ArgumentName] {
        match self {
            Self::GetTpmStatus | Self::GetBiometryStatus => &[],
            Self::GenerateKey | Self::DeleteKey => &[ArgumentName::Tag],
            Self::Encrypt | Self::Decrypt => &[ArgumentName::Tag, ArgumentName::Data],
            Self::Configure => &[ArgumentName::WindowsDataToSign],
        }
    }
}

impl FromStr for MethodName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "getTPMStatus" => Ok(Self::GetTpmStatus),
            "getBiometryStatus" => Ok(Self::GetBiometryStatus),
            "generateKey" => Ok(Self::GenerateKey),
            "deleteKey" => Ok(Self::DeleteKey),
            "encrypt" => Ok(Self::Encrypt),
            "decrypt" => Ok(Self::Decrypt),
            "configure" => Ok(Self::Configure),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Argument keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentName {
    Tag,
    Data,
    WindowsDataToSign,
}

impl ArgumentName {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Data => "data",
            Self::WindowsDataToSign => "windowsDataToSign",
        }
    }
}

impl fmt::Display for ArgumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

/// Outcome of one facade call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResult {
    Success { result: Value },
    Error { code: ErrorCode, message: String },
    NotImplemented,
}

impl MethodResult {
    fn from_error(method: MethodName, err: &CipherError) -> Self {
        let code = err.code();
        tracing::debug!(%method, %code, "method failed");
        Self::Error {
            code,
            message: err.to_string(),
        }
    }

    /// The error code, if this is an error.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Error { code, .. } => Some(*code),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Argument validation
// ---------------------------------------------------------------------------

struct Arguments<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Arguments<'a> {
    fn parse(method: MethodName, raw: Option<&'a Value>) -> Result<Self, CipherError> {
        if method.required_arguments().is_empty() {
            return Ok(Self {
                map: raw.and_then(Value::as_object),
            });
        }
        match raw {
            None | Some(Value::Null) => {
                Err(CipherError::InvalidArgument("Arguments are null.".into()))
            }
            Some(Value::Object(map)) => {
                for name in method.required_arguments() {
                    match map.get(name.as_str()) {
                        None => {
                            return Err(CipherError::InvalidArgument(format!(
                                "Argument {name} is missing."
                            )))
                        }
                        Some(Value::String(_)) => {}
                        Some(_) => {
                            return Err(CipherError::InvalidArgument(format!(
                                "Argument {name} must be a string."
                            )))
                        }
                    }
                }
                Ok(Self { map: Some(map) })
            }
            Some(_) => Err(CipherError::InvalidArgument(
                "Arguments must be a map.".into(),
            )),
        }
    }

    fn string(&self, name: ArgumentName) -> Result<&'a str, CipherError> {
        self.map
            .and_then(|map| map.get(name.as_str()))
            .and_then(Value::as_str)
            .ok_or_else(|| CipherError::InvalidArgument(format!("Argument {name} is missing.")))
    }
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

/// Dispatches named requests to a [`CipherService`].
#[derive(Clone)]
pub struct RequestFacade {
    service: CipherService,
}

impl RequestFacade {
    #[must_use]
    pub const fn new(service: CipherService) -> Self {
        Self { service }
    }

    /// Handle one request. Never fails: errors become [`MethodResult::Error`]
    /// and unknown methods become [`MethodResult::NotImplemented`].
    pub async fn handle(&self, method: &str, arguments: Option<&Value>) -> MethodResult {
        let Ok(method) = method.parse::<MethodName>() else {
            tracing::debug!(method, "method not implemented");
            return MethodResult::NotImplemented;
        };
        tracing::debug!(%method, "handling method call");

        match self.dispatch(method, arguments).await {
            Ok(result) => MethodResult::Success { result },
            Err(err) => MethodResult::from_error(method, &err),
        }
    }

    async fn dispatch(
        &self,
        method: MethodName,
        arguments: Option<&Value>,
    ) -> Result<Value, CipherError> {
        let args = Arguments::parse(method, arguments)?;
        match method {
            MethodName::GetTpmStatus => Ok(Value::from(self.service.get_tpm_status().await?)),
            MethodName::GetBiometryStatus => {
                Ok(Value::from(self.service.get_biometry_status().await?))
            }
            MethodName::GenerateKey => {
                self.service.generate_key(args.string(ArgumentName::Tag)?).await?;
                Ok(Value::Null)
            }
            MethodName::DeleteKey => {
                self.service.delete_key(args.string(ArgumentName::Tag)?).await?;
                Ok(Value::Null)
            }
            MethodName::Encrypt => {
                let tag = args.string(ArgumentName::Tag)?;
                let data = args.string(ArgumentName::Data)?;
                Ok(Value::String(self.service.encrypt(tag, data).await?))
            }
            MethodName::Decrypt => {
                let tag = args.string(ArgumentName::Tag)?;
                let data = args.string(ArgumentName::Data)?;
                Ok(Value::String(self.service.decrypt(tag, data).await?))
            }
            MethodName::Configure => {
                self.service
                    .configure(args.string(ArgumentName::WindowsDataToSign)?)?;
                Ok(Value::Null)
            }
        }
    }
}

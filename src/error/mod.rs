use std::num::TryFromIntError;

use thiserror::Error;

use crate::{kmip_1_4::kmip_types::ResultReason, ttlv::TtlvError};

pub mod result;

/// The crate-level error.
///
/// Errors that already carry a KMIP [`ResultReason`] pass through the
/// dispatch pipeline verbatim; everything else is translated to
/// `GeneralFailure` at the protocol boundary.
#[derive(Error, Debug)]
pub enum KmipError {
    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("{0}")]
    Default(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("{0}: {1}")]
    Kmip(ResultReason, String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    TryFromSliceError(#[from] std::array::TryFromSliceError),
}

impl KmipError {
    /// Attach (or replace) the KMIP result reason carried by this error.
    #[must_use]
    pub fn reason(&self, reason: ResultReason) -> Self {
        match self {
            Self::Kmip(_r, e) => Self::Kmip(reason, e.clone()),
            e => Self::Kmip(reason, e.to_string()),
        }
    }

    /// The KMIP result reason this error maps to at the protocol boundary.
    #[must_use]
    pub const fn result_reason(&self) -> ResultReason {
        match self {
            Self::Kmip(reason, _) => *reason,
            Self::Deserialization(_) | Self::InvalidMessage(_) | Self::InvalidTag(_) => {
                ResultReason::InvalidMessage
            }
            Self::NotSupported(_) => ResultReason::OperationNotSupported,
            Self::Conversion(_)
            | Self::Default(_)
            | Self::Serialization(_)
            | Self::TryFromSliceError(_) => ResultReason::GeneralFailure,
        }
    }
}

impl From<TtlvError> for KmipError {
    fn from(e: TtlvError) -> Self {
        Self::Kmip(ResultReason::InvalidMessage, e.to_string())
    }
}

impl From<TryFromIntError> for KmipError {
    fn from(e: TryFromIntError) -> Self {
        Self::Conversion(e.to_string())
    }
}

/// Construct a [`KmipError`] with `GeneralFailure` from a format string.
#[macro_export]
macro_rules! kmip_error {
    ($msg:literal) => {
        $crate::error::KmipError::Kmip(
            $crate::kmip_1_4::kmip_types::ResultReason::GeneralFailure,
            ::core::format_args!($msg).to_string(),
        )
    };
    ($err:expr $(,)?) => {
        $crate::error::KmipError::Kmip(
            $crate::kmip_1_4::kmip_types::ResultReason::GeneralFailure,
            $err.to_string(),
        )
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::KmipError::Kmip(
            $crate::kmip_1_4::kmip_types::ResultReason::GeneralFailure,
            ::core::format_args!($fmt, $($arg)*).to_string(),
        )
    };
}

/// Return early with a [`KmipError`].
#[macro_export]
macro_rules! kmip_bail {
    ($msg:literal) => {
        return ::core::result::Result::Err($crate::kmip_error!($msg))
    };
    ($err:expr $(,)?) => {
        return ::core::result::Result::Err($err)
    };
    ($fmt:expr, $($arg:tt)*) => {
        return ::core::result::Result::Err($crate::kmip_error!($fmt, $($arg)*))
    };
}

/// Return early with an error if a condition is not satisfied.
#[macro_export]
macro_rules! kmip_ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($crate::kmip_error!($msg));
        }
    };
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::core::result::Result::Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return ::core::result::Result::Err($crate::kmip_error!($fmt, $($arg)*));
        }
    };
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::KmipError;

    #[test]
    fn test_kmip_error_interpolation() {
        let var = 42;
        let err = kmip_error!("interpolate {var}");
        assert_eq!("GeneralFailure: interpolate 42", err.to_string());

        let err = bail();
        assert_eq!(
            "GeneralFailure: interpolate 43",
            err.unwrap_err().to_string()
        );

        let err = ensure();
        assert_eq!(
            "GeneralFailure: interpolate 44",
            err.unwrap_err().to_string()
        );
    }

    fn bail() -> Result<(), KmipError> {
        let var = 43;
        kmip_bail!("interpolate {var}");
    }

    fn ensure() -> Result<(), KmipError> {
        let var = 44;
        kmip_ensure!(false, "interpolate {var}");
        Ok(())
    }
}

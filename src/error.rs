use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while configuring a controller.
///
/// Control cycles never fail. Only construction and parameter loading do.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParam {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unable to read the parameter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse the parameter file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParam {
            name,
            value,
            reason,
        }
    }
}

/// Rejects NaN and infinite values.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(name, value, "must be finite"))
    }
}

pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, value, "must be positive"))
    }
}

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::invalid(name, value, "must not be negative"))
    }
}

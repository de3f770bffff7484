use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Loading state driven by the [`Engine`](crate::Engine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error,
}

impl LoadingState {
    pub fn as_str(self) -> &'static str {
        match self {
            LoadingState::Idle => "idle",
            LoadingState::Loading => "loading",
            LoadingState::Loaded => "loaded",
            LoadingState::Error => "error",
        }
    }

    #[inline]
    pub fn is_loading(self) -> bool {
        self == LoadingState::Loading
    }
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadingState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(LoadingState::Idle),
            "loading" => Ok(LoadingState::Loading),
            "loaded" => Ok(LoadingState::Loaded),
            "error" => Ok(LoadingState::Error),
            other => Err(ConfigError::UnknownState(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(LoadingState::default(), LoadingState::Idle);
    }

    #[test]
    fn test_names_parse_back() {
        for state in [
            LoadingState::Idle,
            LoadingState::Loading,
            LoadingState::Loaded,
            LoadingState::Error,
        ] {
            assert_eq!(state.to_string().parse::<LoadingState>(), Ok(state));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        assert_eq!(
            "done".parse::<LoadingState>(),
            Err(ConfigError::UnknownState("done".into()))
        );
    }
}

//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot find the software root directory: {0}")]
    SwRootNotFound(std::io::Error),

    #[error("Cannot load the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// Relative paths are resolved against the `params` directory inside the software root, absolute
/// paths are used as given.
pub fn load<P, F>(param_file_path: F) -> Result<P, LoadError> 
where
    P: DeserializeOwned,
    F: AsRef<Path>
{
    let path = if param_file_path.as_ref().is_absolute() {
        param_file_path.as_ref().to_path_buf()
    }
    else {
        let mut path = crate::host::get_sw_root()
            .map_err(LoadError::SwRootNotFound)?;
        path.push("params");
        path.push(param_file_path);
        path
    };

    // Load the file into a string
    let params_str = match read_to_string(&path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(path, e))
    };

    parse(params_str.as_str())
}

/// Parse parameters from the contents of a TOML file.
pub fn parse<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestParams {
        period_s: f64,
        #[serde(default)]
        enabled: bool,
    }

    #[test]
    fn test_parse() {
        let p: TestParams = parse("period_s = 0.5\nenabled = true").unwrap();
        assert_eq!(p, TestParams { period_s: 0.5, enabled: true });

        let p: TestParams = parse("period_s = 0.25").unwrap();
        assert!(!p.enabled);

        assert!(matches!(
            parse::<TestParams>("period_s = \"fast\""),
            Err(LoadError::DeserialiseError(_))
        ));
    }

    #[test]
    fn test_load_absolute() {
        let path = std::env::temp_dir().join(format!("util_params_test_{}.toml", std::process::id()));
        std::fs::write(&path, "period_s = 0.01").unwrap();

        let p: TestParams = load(&path).unwrap();
        assert_eq!(p.period_s, 0.01);

        std::fs::remove_file(&path).unwrap();

        assert!(matches!(
            load::<TestParams, _>(&path),
            Err(LoadError::FileLoadError(_, _))
        ));
    }
}

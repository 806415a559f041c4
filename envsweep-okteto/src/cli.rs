//! `okteto` process wrapper.

use std::process::Command;

use envsweep_core::PreviewEnv;
use envsweep_engine::{DeleteError, EnvironmentDestroyer};

use crate::{error::OktetoError, listing};

/// The two preview operations the reconciler needs from the okteto CLI.
pub trait PreviewCommand {
    /// Raw stdout of `okteto preview list`.
    fn list(&self) -> Result<String, OktetoError>;

    /// Run `okteto preview destroy <name>`; success is a clean exit.
    fn destroy(&self, name: &str) -> Result<(), OktetoError>;
}

/// Runs the real `okteto` binary from `PATH`.
#[derive(Debug, Clone, Default)]
pub struct OktetoBinary;

impl OktetoBinary {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, args: &[&str]) -> Result<String, OktetoError> {
        let joined = args.join(" ");
        let output = Command::new("okteto")
            .args(args)
            .output()
            .map_err(|source| OktetoError::Spawn {
                args: joined.clone(),
                source,
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(OktetoError::CommandFailed {
                args: joined,
                status: output.status.to_string(),
                stderr,
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl PreviewCommand for OktetoBinary {
    fn list(&self) -> Result<String, OktetoError> {
        self.run(&["preview", "list"])
    }

    fn destroy(&self, name: &str) -> Result<(), OktetoError> {
        tracing::debug!(environment = name, "okteto preview destroy");
        self.run(&["preview", "destroy", name]).map(|_| ())
    }
}

impl EnvironmentDestroyer for OktetoBinary {
    fn destroy_environment(&self, name: &str) -> Result<(), DeleteError> {
        self.destroy(name).map_err(Into::into)
    }
}

/// The environment catalog: list, then parse.
pub fn fetch_environments(cli: &impl PreviewCommand) -> Result<Vec<PreviewEnv>, OktetoError> {
    let output = cli.list()?;
    listing::parse_listing(&output)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedListing(&'static str);

    impl PreviewCommand for CannedListing {
        fn list(&self) -> Result<String, OktetoError> {
            Ok(self.0.to_string())
        }

        fn destroy(&self, _name: &str) -> Result<(), OktetoError> {
            Ok(())
        }
    }

    #[test]
    fn fetch_environments_parses_the_listing() {
        let cli = CannedListing("Name Scope Sleeping\napp-x personal false\n");
        let envs = fetch_environments(&cli).expect("fetch");
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].name, "app-x");
    }

    #[test]
    fn fetch_environments_surfaces_parse_errors() {
        let cli = CannedListing("no recognizable table here");
        assert!(matches!(
            fetch_environments(&cli),
            Err(OktetoError::MalformedListing { .. })
        ));
    }
}

use crate::gate::GateConfig;
use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_PROTECTED_PREFIX: &str = "protected-prefix";
pub const ARG_AUTH_ONLY_PATH: &str = "auth-only-path";

#[derive(Debug)]
pub struct Options {
    pub protected_prefixes: Vec<String>,
    pub auth_only_paths: Vec<String>,
}

impl Options {
    /// Parse gate arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a path does not start with `/`.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_paths = |id: &str| -> anyhow::Result<Vec<String>> {
            let paths: Vec<String> = matches
                .get_many::<String>(id)
                .map(|values| {
                    values
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            if let Some(bad) = paths.iter().find(|path| !path.starts_with('/')) {
                anyhow::bail!("invalid --{id}: {bad} (must start with '/')");
            }
            Ok(paths)
        };

        Ok(Self {
            protected_prefixes: read_paths(ARG_PROTECTED_PREFIX)?,
            auth_only_paths: read_paths(ARG_AUTH_ONLY_PATH)?,
        })
    }

    #[must_use]
    pub fn into_config(self) -> GateConfig {
        GateConfig::new()
            .with_protected_prefixes(self.protected_prefixes)
            .with_auth_only_paths(self.auth_only_paths)
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PROTECTED_PREFIX)
                .long(ARG_PROTECTED_PREFIX)
                .help("Path prefix that requires a signed-in user (repeatable)")
                .env("TESSERA_PROTECTED_PREFIXES")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .default_value("/dashboard"),
        )
        .arg(
            Arg::new(ARG_AUTH_ONLY_PATH)
                .long(ARG_AUTH_ONLY_PATH)
                .help("Path only for anonymous users; signed-in users go to the landing page (repeatable)")
                .env("TESSERA_AUTH_ONLY_PATHS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .default_values(["/login", "/register"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        with_args(Command::new("tessera"))
    }

    #[test]
    fn defaults() -> anyhow::Result<()> {
        temp_env::with_vars_unset(["TESSERA_PROTECTED_PREFIXES", "TESSERA_AUTH_ONLY_PATHS"], || {
            let matches = command().get_matches_from(vec!["tessera"]);
            let options = Options::parse(&matches)?;
            assert_eq!(options.protected_prefixes, vec!["/dashboard"]);
            assert_eq!(options.auth_only_paths, vec!["/login", "/register"]);
            assert_eq!(options.into_config(), GateConfig::default());
            Ok(())
        })
    }

    #[test]
    fn repeated_flags_replace_defaults() -> anyhow::Result<()> {
        temp_env::with_vars_unset(["TESSERA_PROTECTED_PREFIXES", "TESSERA_AUTH_ONLY_PATHS"], || {
            let matches = command().get_matches_from(vec![
                "tessera",
                "--protected-prefix",
                "/dashboard",
                "--protected-prefix",
                "/account",
                "--auth-only-path",
                "/signin",
            ]);
            let options = Options::parse(&matches)?;
            assert_eq!(options.protected_prefixes, vec!["/dashboard", "/account"]);
            assert_eq!(options.auth_only_paths, vec!["/signin"]);
            Ok(())
        })
    }

    #[test]
    fn env_list_is_comma_separated() -> anyhow::Result<()> {
        temp_env::with_var("TESSERA_PROTECTED_PREFIXES", Some("/dashboard,/billing"), || {
            let matches = command().get_matches_from(vec!["tessera"]);
            let options = Options::parse(&matches)?;
            assert_eq!(options.protected_prefixes, vec!["/dashboard", "/billing"]);
            Ok(())
        })
    }

    #[test]
    fn relative_paths_are_rejected() {
        temp_env::with_vars_unset(["TESSERA_PROTECTED_PREFIXES", "TESSERA_AUTH_ONLY_PATHS"], || {
            let matches =
                command().get_matches_from(vec!["tessera", "--protected-prefix", "dashboard"]);
            assert!(Options::parse(&matches).is_err());
        });
    }
}

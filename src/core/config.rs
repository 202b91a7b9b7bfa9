// This module defines CompilerConfig, the process-wide compiler settings a job consults once
// while deriving its flags. The configuration is an explicit value handed to the job
// constructors, so two jobs built from the same inputs always derive the same flags. Settings
// can be parsed from command-line style switches: "--name" enables a boolean, "--no-name"
// disables it, and "--trace-turbo-filter=pattern" sets the tracing filter. Underscores and
// dashes are interchangeable in switch names. from_env reads the same switches from the
// OPTJOB_FLAGS environment variable for embedders that have no command line.

//! Compiler configuration consulted during flag derivation.

use thiserror::Error;

/// Environment variable read by [`CompilerConfig::from_env`].
pub const FLAGS_ENV_VAR: &str = "OPTJOB_FLAGS";

/// Errors while parsing configuration switches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown compiler flag: {0}")]
    UnknownFlag(String),

    #[error("flag --{name} takes no value (got {value:?})")]
    UnexpectedValue { name: String, value: String },

    #[error("flag --{0} requires a value")]
    MissingValue(String),

    #[error("expected a switch starting with --, got {0:?}")]
    NotASwitch(String),
}

/// Process-wide settings consulted by `derive_flags`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    pub function_context_specialization: bool,
    pub turbo_inlining: bool,
    pub turbo_loop_peeling: bool,
    pub turbo_allocation_folding: bool,
    pub analyze_environment_liveness: bool,
    pub turbo_splitting: bool,
    pub untrusted_code_mitigations: bool,
    pub concurrent_inlining: bool,
    pub turbo_control_flow_aware_allocation: bool,
    pub trace_turbo: bool,
    pub trace_turbo_graph: bool,
    pub trace_turbo_scheduled: bool,
    pub trace_turbo_alloc: bool,
    pub trace_heap_broker: bool,
    /// Filter over job names selecting which jobs may trace.
    pub trace_turbo_filter: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            function_context_specialization: false,
            turbo_inlining: true,
            turbo_loop_peeling: true,
            turbo_allocation_folding: true,
            analyze_environment_liveness: true,
            turbo_splitting: true,
            untrusted_code_mitigations: false,
            concurrent_inlining: false,
            turbo_control_flow_aware_allocation: true,
            trace_turbo: false,
            trace_turbo_graph: false,
            trace_turbo_scheduled: false,
            trace_turbo_alloc: false,
            trace_heap_broker: false,
            trace_turbo_filter: "*".to_string(),
        }
    }
}

type BoolField = fn(&mut CompilerConfig) -> &mut bool;

const BOOL_SWITCHES: &[(&str, BoolField)] = &[
    ("function_context_specialization", |c| &mut c.function_context_specialization),
    ("turbo_inlining", |c| &mut c.turbo_inlining),
    ("turbo_loop_peeling", |c| &mut c.turbo_loop_peeling),
    ("turbo_allocation_folding", |c| &mut c.turbo_allocation_folding),
    ("analyze_environment_liveness", |c| &mut c.analyze_environment_liveness),
    ("turbo_splitting", |c| &mut c.turbo_splitting),
    ("untrusted_code_mitigations", |c| &mut c.untrusted_code_mitigations),
    ("concurrent_inlining", |c| &mut c.concurrent_inlining),
    ("turbo_control_flow_aware_allocation", |c| &mut c.turbo_control_flow_aware_allocation),
    ("trace_turbo", |c| &mut c.trace_turbo),
    ("trace_turbo_graph", |c| &mut c.trace_turbo_graph),
    ("trace_turbo_scheduled", |c| &mut c.trace_turbo_scheduled),
    ("trace_turbo_alloc", |c| &mut c.trace_turbo_alloc),
    ("trace_heap_broker", |c| &mut c.trace_heap_broker),
];

impl CompilerConfig {
    /// Defaults with `switches` applied in order.
    pub fn from_args<I, S>(switches: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for switch in switches {
            config.apply(switch.as_ref())?;
        }
        Ok(config)
    }

    /// Defaults with the whitespace separated switches of `OPTJOB_FLAGS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(FLAGS_ENV_VAR) {
            Ok(value) => Self::from_args(value.split_whitespace()),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Apply one switch.
    ///
    /// Accepts `--name`, `--no-name` and `--trace-turbo-filter=value`, with
    /// `-` and `_` interchangeable. The same grammar is read from
    /// `OPTJOB_FLAGS` and from the command line, so it is parsed here rather
    /// than by a command line parser.
    pub fn apply(&mut self, switch: &str) -> Result<(), ConfigError> {
        let body = switch
            .strip_prefix("--")
            .ok_or_else(|| ConfigError::NotASwitch(switch.to_string()))?;
        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let name = name.replace('-', "_");

        if name == "trace_turbo_filter" {
            let value = value.ok_or_else(|| ConfigError::MissingValue(name.clone()))?;
            self.trace_turbo_filter = value.to_string();
            return Ok(());
        }

        let (key, enable) = match name.strip_prefix("no_") {
            Some(rest) => (rest, false),
            None => (name.as_str(), true),
        };
        let field = BOOL_SWITCHES
            .iter()
            .find(|(switch_name, _)| *switch_name == key)
            .map(|(_, field)| *field)
            .ok_or_else(|| ConfigError::UnknownFlag(switch.to_string()))?;

        if let Some(value) = value {
            return Err(ConfigError::UnexpectedValue {
                name,
                value: value.to_string(),
            });
        }

        *field(self) = enable;
        log::trace!("compiler flag {} = {}", key, enable);
        Ok(())
    }
}

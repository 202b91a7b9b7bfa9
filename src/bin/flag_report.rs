//! Flag report binary.
//!
//! Builds a compilation job for a code kind and name under the given
//! compiler switches and prints the flags the job derived, together with
//! whether each flag may currently be read or written.

use bumpalo::Bump;
use clap::Parser;
use optjob::core::{CodeKind, CompilationJob, CompilerConfig, ConfigError, Flag, FunctionTarget};
use optjob::heap::{HandleScope, ObjectId, Runtime};

#[derive(Parser)]
#[command(name = "flag_report")]
#[command(about = "Print the flags a compilation job derives", long_about = None)]
struct Cli {
    /// Code kind of a stub job (ignored with --function)
    #[arg(long, default_value = "stub")]
    kind: CodeKind,

    /// Stub or function name
    #[arg(long, default_value = "Stub")]
    name: String,

    /// Build a job optimizing a function instead of a stub job
    #[arg(long)]
    function: bool,

    /// Treat the function as having no bytecode
    #[arg(long, requires = "function")]
    no_bytecode: bool,

    /// Compile native-context-independent code
    #[arg(long, requires = "function")]
    native_context_independent: bool,

    /// Compiler switches, e.g. `-- --no-turbo-inlining --trace-turbo`
    #[arg(last = true, value_parser = parse_switch)]
    switches: Vec<String>,
}

/// Validate a compiler switch while the command line is parsed, so a bad
/// switch is reported as a usage error.
fn parse_switch(switch: &str) -> Result<String, ConfigError> {
    CompilerConfig::default().apply(switch)?;
    Ok(switch.to_string())
}

const SHARED: ObjectId = ObjectId(1);
const BYTECODE: ObjectId = ObjectId(2);
const CLOSURE: ObjectId = ObjectId(3);

/// Runtime knowing exactly one function.
struct SingleFunctionRuntime {
    name: String,
    has_bytecode: bool,
}

impl Runtime for SingleFunctionRuntime {
    fn function_name(&self, shared: ObjectId) -> Option<String> {
        (shared == SHARED && !self.name.is_empty()).then(|| self.name.clone())
    }

    fn bytecode_array(&self, shared: ObjectId) -> Option<ObjectId> {
        (shared == SHARED && self.has_bytecode).then_some(BYTECODE)
    }

    fn context(&self, _closure: ObjectId) -> Option<ObjectId> {
        None
    }

    fn native_context(&self, _closure: ObjectId) -> Option<ObjectId> {
        None
    }

    fn global_object(&self, _native_context: ObjectId) -> Option<ObjectId> {
        None
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_report(job: &CompilationJob<'_>) {
    println!(
        "job: {} ({}), optimization id {}, frame type {:?}",
        job.debug_name(),
        job.code_kind(),
        job.optimization_id(),
        job.output_stack_frame_type()
    );
    println!("flags: {:#08x} ({} set)", job.flags().bits(), job.flags().len());
    println!();
    println!("{:<40} {:>4} {:>4} {:>6}", "flag", "get", "set", "value");
    for &flag in Flag::ALL {
        let value = match job.try_flag(flag) {
            Ok(true) => "on",
            Ok(false) => "off",
            Err(_) => "-",
        };
        println!(
            "{:<40} {:>4} {:>4} {:>6}",
            flag.name(),
            yes_no(job.flag_get_is_valid(flag)),
            yes_no(job.flag_set_is_valid(flag)),
            value
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = CompilerConfig::from_env()?;
    for switch in &cli.switches {
        config.apply(switch)?;
    }

    let mut zone = Bump::new();
    if cli.function {
        let runtime = SingleFunctionRuntime {
            name: cli.name.clone(),
            has_bytecode: !cli.no_bytecode,
        };
        let mut scope = HandleScope::open();
        let target = FunctionTarget {
            shared: scope.handle(SHARED)?,
            closure: scope.handle(CLOSURE)?,
            native_context_independent: cli.native_context_independent,
        };
        let job = CompilationJob::for_function(&mut zone, &runtime, &config, &scope, target)?;
        print_report(&job);
    } else {
        let job = CompilationJob::for_stub(&mut zone, &config, &cli.name, cli.kind)?;
        print_report(&job);
    }
    Ok(())
}

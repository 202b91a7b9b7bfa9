//! Test flag read/write validity for every flag and every code kind.

use bumpalo::Bump;
use optjob::core::{
    CodeKind, CompilationJob, CompilerConfig, Flag, FlagAccess, FunctionTarget, JobError,
};
use optjob::heap::{HandleScope, ObjectId, Runtime};

const SHARED: ObjectId = ObjectId(1);
const CLOSURE: ObjectId = ObjectId(2);

/// Flags only meaningful when optimizing a function.
const OPTIMIZING_ONLY: &[Flag] = &[
    Flag::FunctionContextSpecializing,
    Flag::Inlining,
    Flag::DisableFutureOptimization,
    Flag::BailoutOnUninitialized,
    Flag::LoopPeeling,
    Flag::AllocationFolding,
    Flag::AnalyzeEnvironmentLiveness,
    Flag::ConcurrentInlining,
    Flag::NativeContextIndependent,
];

const TRACING: &[Flag] = &[
    Flag::TraceTurboJson,
    Flag::TraceTurboGraph,
    Flag::TraceTurboScheduled,
    Flag::TraceTurboAllocation,
    Flag::TraceHeapBroker,
];

struct TestRuntime;

impl Runtime for TestRuntime {
    fn function_name(&self, _shared: ObjectId) -> Option<String> {
        Some("f".to_string())
    }

    fn bytecode_array(&self, _shared: ObjectId) -> Option<ObjectId> {
        Some(ObjectId(3))
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

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn job_for<'zone>(
    zone: &'zone mut Bump,
    config: &CompilerConfig,
    code_kind: CodeKind,
) -> CompilationJob<'zone> {
    if code_kind == CodeKind::OptimizedFunction {
        let mut scope = HandleScope::open();
        let target = FunctionTarget {
            shared: scope.handle(SHARED).unwrap(),
            closure: scope.handle(CLOSURE).unwrap(),
            native_context_independent: false,
        };
        CompilationJob::for_function(zone, &TestRuntime, config, &scope, target).unwrap()
    } else {
        CompilationJob::for_stub(zone, config, "Stub", code_kind).unwrap()
    }
}

#[test]
fn test_every_flag_for_every_kind() {
    init_logging();
    let config = CompilerConfig::default();

    for code_kind in CodeKind::ALL {
        let mut zone = Bump::new();
        let mut job = job_for(&mut zone, &config, code_kind);
        let optimizing = code_kind == CodeKind::OptimizedFunction;
        let wasm = code_kind == CodeKind::WasmFunction;

        for &flag in Flag::ALL {
            let (get, set) = if OPTIMIZING_ONLY.contains(&flag) {
                (optimizing, optimizing)
            } else if flag == Flag::WasmRuntimeExceptionSupport {
                (wasm, wasm)
            } else if flag == Flag::PoisonRegisterArguments {
                // Not set, and mitigations are off.
                (true, false)
            } else {
                (true, true)
            };
            assert_eq!(job.flag_get_is_valid(flag), get, "get {} on {}", flag, code_kind);
            assert_eq!(job.flag_set_is_valid(flag), set, "set {} on {}", flag, code_kind);

            if get {
                assert!(job.try_flag(flag).is_ok());
            } else {
                assert_eq!(
                    job.try_flag(flag),
                    Err(JobError::InvalidFlagAccess {
                        flag,
                        access: FlagAccess::Get,
                        code_kind,
                    })
                );
            }
        }

        for &flag in Flag::ALL {
            let before = job.flags();
            match job.try_set_flag(flag) {
                Ok(()) => assert!(job.flags().contains(flag)),
                Err(JobError::InvalidFlagAccess { access, .. }) => {
                    assert_eq!(access, FlagAccess::Set);
                    assert_eq!(job.flags(), before, "rejected set of {} changed flags", flag);
                }
                Err(err) => panic!("unexpected error {}", err),
            }
        }
    }
}

#[test]
fn test_tracing_flags_follow_filter() {
    init_logging();
    let config = CompilerConfig {
        trace_turbo_filter: "-Stub".to_string(),
        ..CompilerConfig::default()
    };
    let mut zone = Bump::new();
    let mut job = job_for(&mut zone, &config, CodeKind::Builtin);
    assert!(!job.passes_tracing_filter());
    for &flag in TRACING {
        assert!(job.flag_get_is_valid(flag));
        assert!(!job.flag(flag));
        assert!(job.try_set_flag(flag).is_err());
    }
}

#[test]
fn test_register_poisoning_under_mitigations() {
    init_logging();
    let config = CompilerConfig {
        untrusted_code_mitigations: true,
        ..CompilerConfig::default()
    };

    let mut zone = Bump::new();
    let mut job = job_for(&mut zone, &config, CodeKind::Stub);
    assert!(job.flag_set_is_valid(Flag::PoisonRegisterArguments));
    // Without the code-start register the flag becomes unreadable once set.
    job.set_flag(Flag::PoisonRegisterArguments);
    assert!(!job.flag_get_is_valid(Flag::PoisonRegisterArguments));

    let mut zone = Bump::new();
    let job = job_for(&mut zone, &config, CodeKind::BytecodeHandler);
    assert!(job.flag(Flag::CalledWithCodeStartRegister));
    assert!(job.flag(Flag::PoisonRegisterArguments));
}

#[test]
fn test_config_switches_reach_the_job() {
    init_logging();
    let config = CompilerConfig::from_args([
        "--no-turbo-splitting",
        "--no-turbo-control-flow-aware-allocation",
        "--trace-turbo-graph",
    ])
    .unwrap();
    let mut zone = Bump::new();
    let job = job_for(&mut zone, &config, CodeKind::Builtin);
    assert!(!job.flag(Flag::Splitting));
    assert!(job.flag(Flag::TurboPreprocessRanges));
    assert!(job.flag(Flag::TraceTurboGraph));
}

//! Test moving a compilation job to a worker thread and back.

use bumpalo::Bump;
use optjob::core::{
    compile_on_worker, BailoutReason, CompilationJob, CompilationState, CompilerConfig, Flag,
    FunctionTarget, JobError, SourcePosition,
};
use optjob::heap::{HandleScope, HeapError, HeapObject, ObjectId, PersistentHandles, Runtime};

const SHARED: ObjectId = ObjectId(10);
const BYTECODE: ObjectId = ObjectId(11);
const CLOSURE: ObjectId = ObjectId(12);
const CALLEE_SHARED: ObjectId = ObjectId(20);
const CALLEE_BYTECODE: ObjectId = ObjectId(21);

/// Runtime with one function `outer` that has bytecode.
struct TestRuntime;

impl Runtime for TestRuntime {
    fn function_name(&self, shared: ObjectId) -> Option<String> {
        (shared == SHARED).then(|| "outer".to_string())
    }

    fn bytecode_array(&self, shared: ObjectId) -> Option<ObjectId> {
        (shared == SHARED).then_some(BYTECODE)
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

fn build_job<'zone>(zone: &'zone mut Bump, runtime: &TestRuntime) -> CompilationJob<'zone> {
    let config = CompilerConfig::default();
    let mut scope = HandleScope::open();
    let target = FunctionTarget {
        shared: scope.handle(SHARED).unwrap(),
        closure: scope.handle(CLOSURE).unwrap(),
        native_context_independent: false,
    };
    CompilationJob::for_function(zone, runtime, &config, &scope, target).unwrap()
}

#[test]
fn test_full_round_trip() {
    init_logging();
    let runtime = TestRuntime;
    let mut zone = Bump::new();
    let mut job = build_job(&mut zone, &runtime);
    assert!(job.flag(Flag::Inlining));

    let mut bundle = Box::new(PersistentHandles::new());
    let callee_shared = bundle.new_handle(CALLEE_SHARED);
    let callee_bytecode = bundle.new_handle(CALLEE_BYTECODE);
    let bundle_id = bundle.id();
    job.attach_persistent_handles(bundle).unwrap();

    let (mut job, result) = compile_on_worker(job, &runtime, |job, _| {
        let first =
            job.add_inlined_function(callee_shared, callee_bytecode, SourcePosition::new(4))?;
        let second =
            job.add_inlined_function(callee_shared, callee_bytecode, SourcePosition::inlined(9, 0))?;
        assert_eq!((first, second), (0, 1));
        job.tick_counter_mut().tick();
        let code = job.make_handle(ObjectId(99))?;
        job.set_code(code)
    });
    result.unwrap();

    assert!(job.has_code());
    assert_eq!(job.bailout_reason(), BailoutReason::NoReason);
    assert_eq!(job.state(), CompilationState::Running);
    let ids: Vec<i32> = job
        .inlined_functions()
        .iter()
        .map(|holder| holder.position.inlined_function_id)
        .collect();
    assert_eq!(ids, vec![0, 1]);
    for holder in job.inlined_functions() {
        assert_eq!(job.resolve(holder.shared_info), Ok(CALLEE_SHARED));
    }
    assert_eq!(job.resolve(job.code().unwrap()), Ok(ObjectId(99)));
    assert_eq!(job.resolve(job.shared_info().unwrap()), Ok(SHARED));
    assert_eq!(job.tick_counter().current_tick_count(), 1);

    let bundle = job.detach_persistent_handles().unwrap();
    assert_eq!(bundle.id(), bundle_id);
    assert_eq!(bundle.resolve(callee_shared), Ok(CALLEE_SHARED));
}

#[test]
fn test_handles_do_not_resolve_before_reopen() {
    init_logging();
    let runtime = TestRuntime;
    let mut zone = Bump::new();
    let mut job = build_job(&mut zone, &runtime);
    let mut bundle = Box::new(PersistentHandles::new());
    let persistent = bundle.new_handle::<HeapObject>(ObjectId(7));
    job.attach_persistent_handles(bundle).unwrap();

    std::thread::scope(|s| {
        s.spawn(|| {
            let shared = job.shared_info().unwrap();
            assert!(matches!(
                job.resolve(shared),
                Err(JobError::Heap(HeapError::WrongThread { .. }))
            ));
            assert!(matches!(
                job.resolve(persistent),
                Err(JobError::Heap(HeapError::WrongThread { .. }))
            ));

            job.reopen_handles_in_new_scope(&runtime).unwrap();
            let shared = job.shared_info().unwrap();
            assert_eq!(job.resolve(shared), Ok(SHARED));
            assert_eq!(job.resolve(persistent), Ok(ObjectId(7)));
        });
    });

    // Still bound to the worker until reopened here.
    let shared = job.shared_info().unwrap();
    assert!(job.resolve(shared).is_err());
    job.reopen_handles_in_new_scope(&runtime).unwrap();
    assert_eq!(job.resolve(job.shared_info().unwrap()), Ok(SHARED));
}

#[test]
fn test_abort_on_worker_disables_future_optimization() {
    init_logging();
    let runtime = TestRuntime;
    let mut zone = Bump::new();
    let job = build_job(&mut zone, &runtime);

    let (mut job, result) = compile_on_worker(job, &runtime, |job, _| {
        job.abort_optimization(BailoutReason::FunctionBeingDebugged);
        assert!(job.is_aborted());
        Ok(())
    });
    assert_eq!(result, Ok(()));
    assert!(!job.has_code());
    assert!(job.flag(Flag::DisableFutureOptimization));
    assert_eq!(
        job.state(),
        CompilationState::Aborted(BailoutReason::FunctionBeingDebugged)
    );

    job.retry_optimization(BailoutReason::BailedOutDueToDependencyChange);
    assert!(job.flag(Flag::DisableFutureOptimization));
    assert!(!job.can_retry());
}

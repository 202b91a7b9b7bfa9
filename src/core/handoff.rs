// This module moves a compilation job to a background worker and back, the way a compile
// dispatcher does. The job travels by value: the worker reopens the job's handles in a scope
// of its own before running the pipeline work, and once the worker returns the job the
// requesting thread reopens them again so it can publish the result. The helper uses scoped
// threads, so the job may keep borrowing an arena that lives on the requesting thread's stack.
// Errors from the work closure come back alongside the job; the job itself is never lost.

//! Hand-off of a job between the requesting thread and a worker.

use super::error::JobResult;
use super::job::CompilationJob;
use crate::heap::Runtime;

/// Run `work` on a worker thread, then bring the job back.
///
/// The worker reopens the job's handles before calling `work`; if that
/// fails `work` is skipped. Back on the calling thread the handles are
/// reopened again. The first error is returned next to the job.
///
/// # Panics
///
/// Propagates a panic raised on the worker.
pub fn compile_on_worker<'zone, F>(
    job: CompilationJob<'zone>,
    runtime: &dyn Runtime,
    work: F,
) -> (CompilationJob<'zone>, JobResult<()>)
where
    F: FnOnce(&mut CompilationJob<'zone>, &dyn Runtime) -> JobResult<()> + Send,
{
    log::debug!("{}: handing job to worker", job.debug_name());

    let (mut job, worker_result) = std::thread::scope(|s| {
        let worker = s.spawn(move || {
            let mut job = job;
            let result = job
                .reopen_handles_in_new_scope(runtime)
                .and_then(|()| work(&mut job, runtime));
            (job, result)
        });
        match worker.join() {
            Ok(outcome) => outcome,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    });

    if let Err(err) = &worker_result {
        log::debug!("{}: worker failed: {}", job.debug_name(), err);
    }

    let result = worker_result.and(job.reopen_handles_in_new_scope(runtime));
    log::debug!("{}: job returned from worker ({:?})", job.debug_name(), job.state());
    (job, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bailout::{BailoutReason, CompilationState};
    use crate::core::error::JobError;
    use crate::core::test_utils::test::{with_test_context, SHARED};
    use crate::heap::{ObjectId, PersistentHandles};

    #[test]
    fn test_round_trip_keeps_work_results() {
        with_test_context(|ctx| {
            let (mut job, runtime) = ctx.function_job();
            let mut bundle = Box::new(PersistentHandles::new());
            let persistent = bundle.new_handle::<crate::heap::HeapObject>(ObjectId(500));
            job.attach_persistent_handles(bundle).unwrap();

            let (mut job, result) = compile_on_worker(job, runtime, |job, _| {
                assert_eq!(job.resolve(persistent), Ok(ObjectId(500)));
                let code = job.make_handle(ObjectId(900))?;
                job.set_code(code)
            });
            result.unwrap();

            assert!(job.has_code());
            assert_eq!(job.resolve(job.code().unwrap()), Ok(ObjectId(900)));
            assert_eq!(job.resolve(job.shared_info().unwrap()), Ok(SHARED));
            assert_eq!(job.state(), CompilationState::Running);
            let bundle = job.detach_persistent_handles().unwrap();
            assert_eq!(bundle.resolve(persistent), Ok(ObjectId(500)));
        });
    }

    #[test]
    fn test_worker_bailout_comes_back() {
        with_test_context(|ctx| {
            let (job, runtime) = ctx.function_job();
            let (job, result) = compile_on_worker(job, runtime, |job, _| {
                job.abort_optimization(BailoutReason::FunctionTooBig);
                Ok(())
            });
            assert_eq!(result, Ok(()));
            assert_eq!(job.state(), CompilationState::Aborted(BailoutReason::FunctionTooBig));
        });
    }

    #[test]
    fn test_unavailable_runtime_skips_work() {
        with_test_context(|ctx| {
            let (job, runtime) = ctx.function_job();
            runtime.set_available(false);
            let (job, result) = compile_on_worker(job, runtime, |_, _| {
                panic!("work must not run");
            });
            assert_eq!(result, Err(JobError::RuntimeUnavailable));
            assert_eq!(
                job.state(),
                CompilationState::Retrying(BailoutReason::RuntimeUnavailable)
            );
        });
    }
}

//! Deferred handlers on the tokio scheduler

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::RecordingHost;
use common::TestActor;
use tokio::sync::mpsc;
use trellis::CommandFramework;
use trellis::CommandMeta;
use trellis::CommandSet;
use trellis::Declarations;
use trellis::DispatchOutcome;
use trellis::FrameworkError;
use trellis::ParamSpec;
use trellis::TokioScheduler;

struct Backup {
	done: mpsc::UnboundedSender<String>,
}

impl CommandSet for Backup {
	fn declare(d: &mut Declarations<Self>) {
		d.command(CommandMeta::new("backup.run").asynchronous())
			.handler(|b, args, _| {
				std::thread::sleep(Duration::from_millis(20));
				b.done.send(args.concat_arguments())?;
				Ok(())
			});
		d.command(CommandMeta::new("backup.fail").asynchronous())
			.handler(|b, _, _| {
				b.done.send("failing".to_string())?;
				Err("disk full".into())
			});
		d.command(CommandMeta::new("backup.crash").asynchronous())
			.handler(|b, _, _| {
				b.done.send("crashing".to_string())?;
				panic!("tape jammed");
			});
		d.command(CommandMeta::new("backup.restore").asynchronous())
			.param(ParamSpec::of::<String>().named("snapshot"))
			.handler(|_, _, _| Ok(()));
	}
}

fn framework(done: mpsc::UnboundedSender<String>) -> CommandFramework {
	let scheduler = TokioScheduler::current().expect("inside a runtime");
	let mut framework = CommandFramework::new(Arc::new(RecordingHost::default()), Arc::new(scheduler));
	framework.register(Backup { done });
	framework
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_handler_is_deferred() {
	let (tx, mut rx) = mpsc::unbounded_channel();
	let framework = framework(tx);

	let outcome = framework
		.execute(TestActor::player("alice"), "backup", &["run", "world", "nether"])
		.unwrap();
	assert_eq!(outcome, DispatchOutcome::Deferred);

	let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
		.await
		.expect("handler ran")
		.expect("channel open");
	assert_eq!(received, "world nether");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_failure_is_contained() {
	let (tx, mut rx) = mpsc::unbounded_channel();
	let framework = framework(tx);

	let outcome = framework
		.execute(TestActor::player("alice"), "backup", &["fail"])
		.unwrap();
	assert_eq!(outcome, DispatchOutcome::Deferred);

	let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
		.await
		.unwrap();
	assert_eq!(received.as_deref(), Some("failing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_async_panic_is_contained() {
	let (tx, mut rx) = mpsc::unbounded_channel();
	let framework = framework(tx);
	let alice = TestActor::player("alice");

	let outcome = framework.execute(alice.clone(), "backup", &["crash"]).unwrap();
	assert_eq!(outcome, DispatchOutcome::Deferred);
	let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
		.await
		.unwrap();
	assert_eq!(received.as_deref(), Some("crashing"));

	framework.execute(alice, "backup", &["run", "after"]).unwrap();
	let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
		.await
		.unwrap();
	assert_eq!(received.as_deref(), Some("after"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_configuration_errors_surface_before_submission() {
	let (tx, _rx) = mpsc::unbounded_channel();
	let framework = framework(tx);

	let err = framework
		.execute(TestActor::player("alice"), "backup", &["restore"])
		.unwrap_err();
	assert!(matches!(err, FrameworkError::MissingKeyedProvider { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatch_from_many_actors() {
	let (tx, mut rx) = mpsc::unbounded_channel();
	let framework = Arc::new(framework(tx));

	let mut handles = Vec::new();
	for i in 0..16 {
		let framework = framework.clone();
		handles.push(tokio::spawn(async move {
			let actor = TestActor::player(&format!("actor-{i}"));
			framework
				.execute(actor, "backup", &["run".to_string(), i.to_string()])
				.unwrap()
		}));
	}
	for handle in handles {
		assert_eq!(handle.await.unwrap(), DispatchOutcome::Deferred);
	}

	let mut seen = Vec::new();
	for _ in 0..16 {
		let value = tokio::time::timeout(Duration::from_secs(5), rx.recv())
			.await
			.unwrap()
			.unwrap();
		seen.push(value.parse::<u32>().unwrap());
	}
	seen.sort();
	assert_eq!(seen, (0..16).collect::<Vec<u32>>());
}

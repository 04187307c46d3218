//! Interception protocol behavior observed from the caller's side.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hookscope::prelude::*;

/// One service method whose body counts its own executions
fn echo_image(counter: Arc<AtomicUsize>) -> Arc<LoadedImage> {
    ImageBuilder::new("1.0")
        .with_class(
            ClassSpec::new("svc").with_method(
                MethodSpec::new("echo", 1)
                    .with_string_ref("echo-marker")
                    .with_body(move |_, args| {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(args[0].clone())
                    }),
            ),
        )
        .build()
}

fn echo_ref() -> SymbolRef {
    SymbolRef::new(Fingerprint::method("echo").with_string_ref("echo-marker"))
}

#[test]
fn test_noop_hooks_are_transparent() {
    let counter = Arc::new(AtomicUsize::new(0));
    let session = PatchSession::new(Arc::new(Dispatcher::new(echo_image(counter.clone()))));

    let reference = echo_ref();
    session
        .hook(
            &reference,
            HookPair::new()
                .with_before(|_| Ok(()))
                .with_after(|_| Ok(())),
        )
        .unwrap();

    let token = reference.peek().unwrap().token();
    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("payload")])
        .unwrap();

    // result and body execution count are exactly those of an unhooked call
    assert_eq!(out, Value::from("payload"));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_short_circuit_skips_the_original_body() {
    let counter = Arc::new(AtomicUsize::new(0));
    let session = PatchSession::new(Arc::new(Dispatcher::new(echo_image(counter.clone()))));

    let reference = echo_ref();
    session
        .hook_before(&reference, |ctx| {
            ctx.set_result(Value::from("forced"));
            Ok(())
        })
        .unwrap();

    let token = reference.peek().unwrap().token();
    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("ignored")])
        .unwrap();

    assert_eq!(out, Value::from("forced"));
    // the body, and its side effect, never ran
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_after_hook_observes_a_short_circuit_result() {
    let counter = Arc::new(AtomicUsize::new(0));
    let session = PatchSession::new(Arc::new(Dispatcher::new(echo_image(counter.clone()))));

    let reference = echo_ref();
    session
        .hook(
            &reference,
            HookPair::new()
                .with_before(|ctx| {
                    ctx.set_result(Value::from("supplied"));
                    Ok(())
                })
                .with_after(|ctx| {
                    let tagged = format!("{}+after", ctx.result().as_str()?);
                    ctx.set_result(Value::from(tagged));
                    Ok(())
                }),
        )
        .unwrap();

    let token = reference.peek().unwrap().token();
    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("ignored")])
        .unwrap();

    // the after-hook saw the before-supplied result, not the body's
    assert_eq!(out, Value::from("supplied+after"));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_after_hooks_compose_in_installation_order() {
    let counter = Arc::new(AtomicUsize::new(0));
    let session = PatchSession::new(Arc::new(Dispatcher::new(echo_image(counter))));

    let reference = echo_ref();
    session
        .hook_after(&reference, |ctx| {
            let tagged = format!("{}+first", ctx.result().as_str()?);
            ctx.set_result(Value::from(tagged));
            Ok(())
        })
        .unwrap();
    session
        .hook_after(&reference, |ctx| {
            let tagged = format!("{}+second", ctx.result().as_str()?);
            ctx.set_result(Value::from(tagged));
            Ok(())
        })
        .unwrap();

    let token = reference.peek().unwrap().token();
    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("x")])
        .unwrap();

    // each after-hook observed its predecessor's output
    assert_eq!(out, Value::from("x+first+second"));
}

#[test]
fn test_argument_rewrite_reaches_the_body() {
    let counter = Arc::new(AtomicUsize::new(0));
    let session = PatchSession::new(Arc::new(Dispatcher::new(echo_image(counter))));

    let reference = echo_ref();
    session
        .hook_before(&reference, |ctx| {
            ctx.set_arg(0, Value::from("rewritten"))?;
            Ok(())
        })
        .unwrap();

    let token = reference.peek().unwrap().token();
    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("original")])
        .unwrap();
    assert_eq!(out, Value::from("rewritten"));
}

#[test]
fn test_declared_error_reaches_the_caller() {
    let counter = Arc::new(AtomicUsize::new(0));
    let session = PatchSession::new(Arc::new(Dispatcher::new(echo_image(counter.clone()))));

    let reference = echo_ref();
    session
        .hook_before(&reference, |ctx| {
            ctx.set_error(Error::CallFault("not available".to_string()));
            Ok(())
        })
        .unwrap();

    let token = reference.peek().unwrap().token();
    let out = session.dispatcher().invoke(token, None, &[Value::Null]);

    assert!(matches!(out, Err(Error::CallFault(_))));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_callback_fault_leaves_the_call_untouched() {
    let counter = Arc::new(AtomicUsize::new(0));
    let session = PatchSession::new(Arc::new(Dispatcher::new(echo_image(counter.clone()))));

    let reference = echo_ref();
    session
        .hook_before(&reference, |ctx| {
            // fails before reaching set_result; the fault must be swallowed
            ctx.arg(7)?;
            ctx.set_result(Value::Null);
            Ok(())
        })
        .unwrap();

    let token = reference.peek().unwrap().token();
    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::Int(3)])
        .unwrap();

    assert_eq!(out, Value::Int(3));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

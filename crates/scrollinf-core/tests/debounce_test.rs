use std::cell::RefCell;
use std::rc::Rc;

use scrollinf_core::Debouncer;
use scrollinf_testing::FakeHost;

fn log_into(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> impl FnOnce() + 'static {
    let log = Rc::clone(log);
    move || log.borrow_mut().push(label)
}

#[test]
fn test_only_latest_task_runs() {
    let host = Rc::new(FakeHost::new());
    let debouncer = Debouncer::new(Rc::clone(&host), 100);
    let log = Rc::new(RefCell::new(Vec::new()));

    debouncer.schedule(log_into(&log, "first"));
    host.advance_time(50);
    debouncer.schedule(log_into(&log, "second"));
    host.advance_time(99);
    assert!(log.borrow().is_empty());
    assert!(debouncer.is_pending());

    host.advance_time(1);
    assert_eq!(*log.borrow(), vec!["second"]);
    assert!(!debouncer.is_pending());
    assert_eq!(host.stats().timers_cleared, 1);
}

#[test]
fn test_cancel_discards_pending_task() {
    let host = Rc::new(FakeHost::new());
    let debouncer = Debouncer::new(Rc::clone(&host), 10);
    let log = Rc::new(RefCell::new(Vec::new()));

    debouncer.schedule(log_into(&log, "never"));
    debouncer.cancel();
    host.advance_time(100);

    assert!(log.borrow().is_empty());
    assert_eq!(host.pending_timers(), 0);
}

#[test]
fn test_drop_cancels() {
    let host = Rc::new(FakeHost::new());
    let log = Rc::new(RefCell::new(Vec::new()));
    {
        let debouncer = Debouncer::new(Rc::clone(&host), 10);
        debouncer.schedule(log_into(&log, "never"));
    }
    host.advance_time(100);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_task_may_reschedule_itself() {
    let host = Rc::new(FakeHost::new());
    let debouncer = Rc::new(Debouncer::new(Rc::clone(&host), 10));
    let log = Rc::new(RefCell::new(Vec::new()));

    let again = Rc::clone(&debouncer);
    let next = log_into(&log, "second");
    let first = log_into(&log, "first");
    debouncer.schedule(move || {
        first();
        again.schedule(next);
    });

    host.advance_time(10);
    assert_eq!(*log.borrow(), vec!["first"]);
    host.advance_time(10);
    assert_eq!(*log.borrow(), vec!["first", "second"]);
}

#[test]
fn test_timer_failure_drops_task() {
    let host = Rc::new(FakeHost::new());
    host.fail_timers(true);
    let debouncer = Debouncer::new(Rc::clone(&host), 10);
    let log = Rc::new(RefCell::new(Vec::new()));

    debouncer.schedule(log_into(&log, "dropped"));
    host.advance_time(100);

    assert!(!debouncer.is_pending());
    assert!(log.borrow().is_empty());
    assert_eq!(debouncer.delay_ms(), 10);
}

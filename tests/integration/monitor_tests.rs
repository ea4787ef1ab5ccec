//! Integration tests: report → store → sampler → fail-safe.

use envctl::MonitorError;
use envctl::fault::{FaultCode, FaultRecord, Severity};
use envctl::monitor::FaultStatus;

use crate::mock_ports::{
    HISTORY_SIZE, MAX_ACTIVE_FAULTS, ManualClock, RecordingFailSafe, ScriptedTasks, TOTAL_FAULT_IDS,
    TestMonitor, initialised_monitor, test_config,
};

#[test]
fn medium_fault_visible_in_status() {
    let monitor = initialised_monitor();
    monitor.report_fault(3, Severity::Medium, 42).unwrap();

    let mut status = FaultStatus::default();
    monitor.get_fault_status(&mut status).unwrap();
    assert_eq!(status.active_fault_count, 1);
    assert_eq!(status.historical_fault_count, 1);
    let fault = status.active_faults[0];
    assert_eq!(fault.id, 3);
    assert_eq!(fault.severity, Severity::Medium);
    assert_eq!(fault.data, 42);
    assert!(fault.is_active);
}

#[test]
fn low_then_high_same_id_escalates() {
    let monitor = initialised_monitor();
    monitor.report_fault(3, Severity::Low, 1).unwrap();
    monitor.report_fault(3, Severity::High, 2).unwrap();

    let status = monitor.fault_status().unwrap();
    assert_eq!(status.active_fault_count, 1);
    assert_eq!(status.active_faults[0].severity, Severity::High);
    assert_eq!(status.active_faults[0].data, 2);
}

#[test]
fn timestamps_come_from_the_clock() {
    let clock = ManualClock::default();
    clock.set(10_000);
    let monitor = TestMonitor::new(test_config(), clock);
    monitor.init().unwrap();

    monitor.report_fault(1, Severity::Low, 0).unwrap();
    assert_eq!(monitor.fault_status().unwrap().active_faults[0].timestamp_ms, 10_000);
}

#[test]
fn history_keeps_only_the_latest_reports() {
    let monitor = initialised_monitor();
    let total = HISTORY_SIZE as u32 + 5;
    for i in 0..total {
        monitor.report_fault(i % TOTAL_FAULT_IDS, Severity::Low, i).unwrap();
    }

    let status = monitor.fault_status().unwrap();
    assert_eq!(status.historical_fault_count as usize, HISTORY_SIZE);

    let data: Vec<u32> = monitor
        .history_snapshot()
        .unwrap()
        .iter()
        .map(|r| r.data)
        .collect();
    let expected: Vec<u32> = (5..total).collect();
    assert_eq!(data, expected);
}

#[test]
fn full_active_table_evicts_first_entry() {
    let monitor = initialised_monitor();
    for id in 0..MAX_ACTIVE_FAULTS as u32 {
        monitor.report_fault(id, Severity::Critical, 0).unwrap();
    }
    let newcomer = MAX_ACTIVE_FAULTS as u32 + 10;
    monitor.report_fault(newcomer, Severity::Low, 7).unwrap();

    let status = monitor.fault_status().unwrap();
    let ids: Vec<u32> = status.active_faults.iter().map(|r| r.id).collect();
    let mut expected: Vec<u32> = (1..MAX_ACTIVE_FAULTS as u32).collect();
    expected.push(newcomer);
    assert_eq!(ids, expected);
    assert_eq!(status.active_fault_count as usize, MAX_ACTIVE_FAULTS);
}

#[test]
fn invalid_reports_leave_counts_untouched() {
    let monitor = initialised_monitor();
    monitor.report_fault(1, Severity::Low, 0).unwrap();

    assert_eq!(
        monitor.report_fault(TOTAL_FAULT_IDS, Severity::Low, 0),
        Err(MonitorError::InvalidArgument)
    );
    assert_eq!(
        monitor.report_fault(0, Severity::None, 0),
        Err(MonitorError::InvalidArgument)
    );

    let status = monitor.fault_status().unwrap();
    assert_eq!(status.active_fault_count, 1);
    assert_eq!(status.historical_fault_count, 1);
}

#[test]
fn everything_guarded_before_init() {
    let monitor = TestMonitor::new(test_config(), ManualClock::default());
    let mut status = FaultStatus::default();
    let mut fail_safe = RecordingFailSafe::default();

    assert_eq!(
        monitor.report_fault(1, Severity::High, 0),
        Err(MonitorError::NotInitialized)
    );
    assert_eq!(
        monitor.get_fault_status(&mut status),
        Err(MonitorError::NotInitialized)
    );
    assert_eq!(monitor.get_cpu_load(), 0);
    assert_eq!(monitor.get_min_free_stack(), 0);
    monitor.sample_and_evaluate(&ScriptedTasks::controller(), &mut fail_safe);
    assert!(fail_safe.calls.is_empty());

    monitor.init().unwrap();
    assert_eq!(monitor.fault_status().unwrap().historical_fault_count, 0);
}

#[test]
fn high_fault_drives_fail_safe_each_cycle() {
    let monitor = initialised_monitor();
    monitor
        .report_code(FaultCode::HeaterOverTemperature, Severity::High, 95)
        .unwrap();

    let tasks = ScriptedTasks::controller();
    let mut fail_safe = RecordingFailSafe::default();
    for _ in 0..3 {
        monitor.sample_and_evaluate(&tasks, &mut fail_safe);
    }
    assert_eq!(fail_safe.calls, [true, true, true]);

    monitor
        .clear_fault(FaultCode::HeaterOverTemperature.id())
        .unwrap();
    monitor.sample_and_evaluate(&tasks, &mut fail_safe);
    assert_eq!(fail_safe.calls.len(), 3, "no call once the fault is resolved");
}

#[test]
fn sampler_tracks_stack_and_cpu() {
    let monitor = initialised_monitor();
    let tasks = ScriptedTasks::controller();
    monitor.sample_and_evaluate(&tasks, &mut RecordingFailSafe::default());

    assert_eq!(monitor.get_min_free_stack(), 300 * 4);
    // 5_000 busy of 10_000 total task run time.
    assert_eq!(monitor.get_cpu_load(), 50);

    tasks.set_total_runtime(0);
    monitor.sample_and_evaluate(&tasks, &mut RecordingFailSafe::default());
    assert_eq!(monitor.get_min_free_stack(), u32::MAX);
    assert_eq!(monitor.get_cpu_load(), 50, "load keeps its last value");
}

#[test]
fn diagnostics_survive_the_bridge() {
    let monitor = initialised_monitor();
    monitor.report_fault(6, Severity::Medium, 0xC0FFEE).unwrap();
    monitor.sample_and_evaluate(&ScriptedTasks::controller(), &mut RecordingFailSafe::default());

    let report = monitor.diagnostics().unwrap();
    let bytes = report.encode().unwrap();
    let decoded = envctl::diagnostics::DiagnosticsReport::<MAX_ACTIVE_FAULTS>::decode(&bytes).unwrap();
    assert_eq!(decoded, report);
    assert_eq!(
        decoded.status.active_faults[0],
        FaultRecord::active(6, Severity::Medium, 0, 0xC0FFEE)
    );
    assert!(decoded.stack_sampled());
}

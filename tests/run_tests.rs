use alloc_trace_studio::run::{verify_same_run, LabeledTrace, RunToken};
use pretty_assertions::assert_eq;
use std::path::Path;

#[test]
fn test_scenario_b() {
    let tlsf = Path::new("traces/20180808T021350Z_tlsf_mem_trace_out.csv");
    let native = Path::new("traces/20180808T021400Z_native_mem_trace_out.csv");
    let traces = [
        LabeledTrace::new("tlsf", tlsf),
        LabeledTrace::new("native", native),
    ];

    let err = verify_same_run(&traces, true).unwrap_err();
    assert_eq!(err.tokens.len(), 2);
    assert_eq!(err.tokens[1].1, RunToken::new("20180808T021400Z"));

    let token = verify_same_run(&traces, false).unwrap();
    assert_eq!(token.as_str(), "20180808T021350Z");
}

#[test]
fn test_three_matching_traces() {
    let traces = [
        LabeledTrace::new("tlsf", Path::new("20180808T021350Z_tlsf.csv")),
        LabeledTrace::new("tlsf_ori", Path::new("20180808T021350Z_tlsf_ori.csv")),
        LabeledTrace::new("native", Path::new("/data/20180808T021350Z_native.csv")),
    ];

    let token = verify_same_run(&traces, true).unwrap();
    assert_eq!(token, RunToken::new("20180808T021350Z"));
}

#[test]
fn test_mismatch_message_names_labels() {
    let traces = [
        LabeledTrace::new("tlsf", Path::new("a_tlsf.csv")),
        LabeledTrace::new("native", Path::new("b_native.csv")),
    ];

    let message = verify_same_run(&traces, true).unwrap_err().to_string();
    assert!(message.contains("tlsf=a"));
    assert!(message.contains("native=b"));
}

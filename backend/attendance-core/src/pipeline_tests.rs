// src/pipeline_tests.rs

#[cfg(test)]
mod tests {
    use crate::normalizer::{RawPunch, ReportingPeriod, UserId};
    use crate::pipeline::*;
    use crate::policy::{AttendancePolicy, AttendanceStatus};
    use crate::punch_source::read_raw_device_log;
    use crate::report_export::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;

    fn september_2024() -> ReportingPeriod {
        ReportingPeriod::new(2024, 9).unwrap()
    }

    fn names() -> HashMap<UserId, String> {
        let mut names = HashMap::new();
        names.insert(101, "Asha Rao".to_string());
        names
    }

    fn sample_report() -> AttendanceReport {
        let punches = vec![
            RawPunch::new(101, "2024-09-02 09:00:00"),
            RawPunch::new(101, "2024-09-02 18:00:00"),
            RawPunch::new(102, "2024-09-02 10:30:00"),
        ];
        match process_attendance(&punches, september_2024(), &names(), &AttendancePolicy::default()) {
            ReportOutcome::Report(report) => report,
            other => panic!("expected a report, got {:?}", other),
        }
    }

    // Helper to get a test-specific output directory
    fn test_output_dir(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("attendance_core_test_{}_{}", test_name, std::process::id()))
    }

    // --- Pipeline ---

    #[test]
    fn test_punches_outside_period_report_no_data() {
        let punches = vec![
            RawPunch::new(1, "2024-08-30 09:00:00"),
            RawPunch::new(1, "2024-10-01 18:00:00"),
            RawPunch::new(1, "not a timestamp"),
        ];

        let outcome = process_attendance(
            &punches,
            september_2024(),
            &HashMap::new(),
            &AttendancePolicy::default(),
        );

        assert_eq!(outcome, ReportOutcome::NoDataForPeriod(september_2024()));
    }

    #[test]
    fn test_device_log_to_report() {
        let log = "101\t2024-09-02 09:00:00\t1\t0\t1\t0\n\
                   101\t2024-09-02 18:00:00\t1\t0\t1\t0\n\
                   101\t2024-08-31 09:00:00\t1\t0\t1\t0\n\
                   102\t2024-09-03 11:00:00\t1\t0\t1\t0\n\
                   102\t2024-09-03 19:15:00\t1\t0\t1\t0\n\
                   102\tbroken\t1\t0\t1\t0\n";
        let punches = read_raw_device_log(log.as_bytes()).unwrap();

        let report = match process_attendance(
            &punches,
            september_2024(),
            &names(),
            &AttendancePolicy::default(),
        ) {
            ReportOutcome::Report(report) => report,
            other => panic!("expected a report, got {:?}", other),
        };

        assert_eq!(report.period, september_2024());
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].name, "Asha Rao");
        assert_eq!(report.records[0].status, AttendanceStatus::FullDay);
        assert!(report.records[1].short_leave.is_yes());
        assert_eq!(report.summaries.len(), 2);
        // 1 + 0 - (0 - 2)/4
        assert_eq!(report.summaries[0].total_working_days, dec!(1.5));
        // 1 + 0 - (1 - 2)/4
        assert_eq!(report.summaries[1].total_working_days, dec!(1.25));
    }

    // --- Export ---

    #[test]
    fn test_records_csv_has_stable_headers() {
        let report = sample_report();
        let mut buffer = Vec::new();
        write_records_csv(&mut buffer, &report.records).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Serial No,User ID,Name,Date,Day,In Time,Out Time,Working Hours,Attendance Status,Short Leave,Remarks"
        );
        assert_eq!(
            lines[1],
            "1,101,Asha Rao,2024-09-02,Monday,09:00:00,18:00:00,9.00,Full Day,No,"
        );
        assert_eq!(
            lines[2],
            "2,102,,2024-09-02,Monday,10:30:00,10:30:00,0.00,Leave,No,Supervision Required - Single Entry"
        );
    }

    #[test]
    fn test_summary_csv_has_stable_headers() {
        let report = sample_report();
        let mut buffer = Vec::new();
        write_summaries_csv(&mut buffer, &report.summaries).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "Serial No,User ID,Name,Full Days,Half Days,Short Leaves,Total Working Days,Remarks"
        );
        assert_eq!(lines[1], "1,101,Asha Rao,1,0,0,1.50,");
        assert_eq!(
            lines[2],
            "2,102,,0,0,0,0.50,Supervision Required - Single Entry"
        );
    }

    #[test]
    fn test_write_report_csv_creates_both_files() {
        let out_dir = test_output_dir("write_report");
        let _ = fs::remove_dir_all(&out_dir);

        let files = write_report_csv(&sample_report(), &out_dir).unwrap();

        assert_eq!(files.records, out_dir.join(RECORDS_FILE_NAME));
        assert_eq!(files.summary, out_dir.join(SUMMARY_FILE_NAME));
        let records = fs::read_to_string(&files.records).unwrap();
        let summary = fs::read_to_string(&files.summary).unwrap();
        assert_eq!(records.lines().count(), 3);
        assert_eq!(summary.lines().count(), 3);

        let _ = fs::remove_dir_all(&out_dir);
    }

    #[test]
    fn test_report_json_uses_export_field_names() {
        let json = report_to_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["period"]["year"], 2024);
        assert_eq!(value["period"]["month"], 9);
        assert_eq!(value["records"][0]["Attendance Status"], "Full Day");
        assert_eq!(value["records"][0]["Working Hours"], "9.00");
        assert_eq!(value["summaries"][1]["Remarks"], "Supervision Required - Single Entry");
    }
}

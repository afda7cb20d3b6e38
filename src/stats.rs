//! 통계 및 유틸리티 모듈
//!
//! 수집된 파일별 결과에서 배치 통계를 집계하고 포맷팅합니다.
//! 집계는 모든 워커가 끝난 뒤 결과 목록 위에서만 수행되며
//! 처리 중 공유 카운터는 사용하지 않습니다.

use colored::Colorize;
use std::time::Duration;

use crate::processor::FileReport;

/// 배치 전체 통계
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// 전체 파일 수
    pub files: usize,
    /// 읽을 수 없었던 파일 수
    pub unreadable_files: usize,
    /// 확인한 전체 레코드 수
    pub total_records: usize,
    /// 변환하여 기록한 레코드 수
    pub valid_records: usize,
    /// 거부된 레코드 수
    pub failed_records: usize,
    /// 읽은 총 바이트
    pub bytes_read: u64,
    /// 쓴 총 바이트
    pub bytes_written: u64,
}

impl BatchSummary {
    /// 파일별 결과 목록에서 집계
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = BatchSummary {
            files: reports.len(),
            ..Default::default()
        };

        for report in reports {
            if report.io_error.is_some() && report.output.is_none() {
                summary.unreadable_files += 1;
            }
            summary.total_records += report.total;
            summary.valid_records += report.valid;
            summary.failed_records += report.failed();
            summary.bytes_read += report.bytes_read;
            summary.bytes_written += report.bytes_written;
        }

        summary
    }

    /// 배치 통계 요약 출력
    pub fn print_summary(&self, elapsed: Duration) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!("  {} 전체 파일:    {}", "📁".bright_cyan(), self.files);

        if self.unreadable_files > 0 {
            println!(
                "  {} 읽기 실패:    {}",
                "❌".bright_red(),
                self.unreadable_files.to_string().red()
            );
        }

        println!(
            "  {} 전체 레코드:  {}",
            "📋".bright_white(),
            self.total_records
        );
        println!(
            "  {} 변환 성공:    {}",
            "✅".bright_green(),
            self.valid_records.to_string().green()
        );

        if self.failed_records > 0 {
            println!(
                "  {} 변환 실패:    {}",
                "❌".bright_red(),
                self.failed_records.to_string().red()
            );
        } else {
            println!("  {} 변환 실패:    {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.bytes_written)
        );

        if self.total_records > 0 {
            let valid_rate = (self.valid_records as f64 / self.total_records as f64) * 100.0;
            println!("  {} 변환율:       {:.1}%", "📈".bright_white(), valid_rate);
        }

        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(elapsed)
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Arguments
/// * `bytes` - 바이트 수
///
/// # Returns
/// 형식화된 문자열 (예: "1.25 MB")
///
/// # Examples
/// ```
/// use sconvert::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(total: usize, valid: usize, bytes_read: u64) -> FileReport {
        let mut report = FileReport::unreadable(PathBuf::from("x"), String::new());
        report.io_error = None;
        report.output = Some(PathBuf::from("y"));
        report.total = total;
        report.valid = valid;
        report.bytes_read = bytes_read;
        report
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1시간 1분");
    }

    #[test]
    fn test_summary_aggregates_reports() {
        let reports = vec![
            report(10, 8, 2048),
            report(5, 5, 1024),
            FileReport::unreadable(PathBuf::from("bad"), "열기 실패".to_string()),
        ];

        let summary = BatchSummary::from_reports(&reports);

        assert_eq!(summary.files, 3);
        assert_eq!(summary.unreadable_files, 1);
        assert_eq!(summary.total_records, 15);
        assert_eq!(summary.valid_records, 13);
        assert_eq!(summary.failed_records, 0);
        assert_eq!(summary.bytes_read, 3072);
    }

    #[test]
    fn test_summary_empty_batch() {
        let summary = BatchSummary::from_reports(&[]);
        assert_eq!(summary, BatchSummary::default());
    }
}

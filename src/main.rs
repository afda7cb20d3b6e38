//! sconvert - JSON/JSONL TO SERVING FORMAT CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use sconvert::{
    batch::run_batch,
    cli::Args,
    config::Config,
    discovery::collect_input_files,
    processor::{FileReport, ProcessOptions},
    stats::BatchSummary,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("스레드 풀 초기화 실패")?;
    }

    // 설정 파일 로드 및 인자 병합
    let config = Config::load(&args.config)?;
    let input = config.resolve_input_dir(args.input.clone());
    let output_dir = config.resolve_output_dir(args.output.clone());
    let max_records = config.resolve_max_records(args.max_records);
    let max_files = config.resolve_max_files(args.max_files);

    // 헤더 출력
    print_header(&args, &input, &output_dir);

    // 입력 파일 수집
    let mut files = collect_input_files(&input, args.pattern.as_deref(), args.max_depth)?;

    if files.is_empty() {
        anyhow::bail!("처리할 JSON/JSONL 파일이 없습니다: {:?}", input);
    }

    // 파일 수 상한 적용
    if let Some(max) = max_files {
        if files.len() > max {
            println!(
                "  {} 파일 수 상한 적용: {} → {}",
                "✂️".bright_yellow(),
                files.len(),
                max
            );
            files.truncate(max);
        }
    }

    println!(
        "  {} 발견된 파일 수: {}",
        "📋".bright_white(),
        files.len().to_string().bright_green()
    );

    // 드라이런 모드
    if args.dry_run {
        print_dry_run(&files);
        return Ok(());
    }

    // 변환 실행
    run_conversion(&args, files, &output_dir, max_records)
}

/// 헤더 출력
fn print_header(args: &Args, input: &Path, output_dir: &Path) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🚀 JSON/JSONL TO SERVING FORMAT CONVERTER"
            .bright_white()
            .bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 경로: {:?}", "📂".bright_cyan(), input);
    println!("  {} 출력 폴더: {:?}", "📄".bright_green(), output_dir);
    println!("  {} 스키마: {}", "⚙️".bright_yellow(), args.schema);

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if let Some(max) = args.max_records {
        println!("  {} 파일당 레코드 상한: {}", "📏".bright_white(), max);
    }

    if let Some(depth) = args.max_depth {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 드라이런 출력
fn print_dry_run(files: &[PathBuf]) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, path) in files.iter().enumerate() {
        println!("  {}. {:?}", i + 1, path.file_name().unwrap_or_default());
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 변환 모드 실행
fn run_conversion(
    args: &Args,
    files: Vec<PathBuf>,
    output_dir: &Path,
    max_records: Option<usize>,
) -> Result<()> {
    let start = Instant::now();

    let options = ProcessOptions::new()
        .with_max_records(max_records)
        .with_schema(args.schema);

    // 진행률 바 설정
    let pb = create_progress_bar(files.len());

    println!("\n{}", "⚡ 병렬 변환 중...".bright_cyan());

    let reports = run_batch(&files, output_dir, &options, |_| pb.inc(1))?;

    pb.finish_with_message("완료!");

    // 파일별 결과 출력
    print_file_results(&reports, args.verbose);

    // 에러 출력
    print_errors(&reports, args.verbose);

    // 로그 파일 작성
    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &reports)?;
    }

    // 통계 출력
    let summary = BatchSummary::from_reports(&reports);
    summary.print_summary(start.elapsed());

    println!("\n{} 변환 완료: {:?}\n", "✅".bright_green(), output_dir);

    Ok(())
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("█▓▒░"),
    );
    pb
}

/// 파일별 결과 출력
fn print_file_results(reports: &[FileReport], verbose: bool) {
    println!("\n{}", "📄 파일별 결과:".bright_cyan());

    for report in reports {
        let name = report.path.file_name().unwrap_or_default();

        if report.output.is_none() {
            println!("  {} {:?}: 읽기 실패", "✗".red(), name);
            continue;
        }

        println!(
            "  {} {:?}: {} / {} 레코드 변환",
            "✓".green(),
            name,
            report.valid.to_string().green(),
            report.total
        );

        if verbose {
            if let Some(ref output) = report.output {
                println!("    → {:?}", output);
            }
        }
    }
}

/// 에러 목록 출력
fn print_errors(reports: &[FileReport], verbose: bool) {
    let failing: Vec<&FileReport> = reports
        .iter()
        .filter(|r| r.io_error.is_some() || !r.failures.is_empty())
        .collect();

    if failing.is_empty() {
        return;
    }

    println!("\n{}", "❌ 오류 발생 파일:".bright_red());
    for report in failing {
        println!(
            "  {} {:?}",
            "•".red(),
            report.path.file_name().unwrap_or_default()
        );

        if let Some(ref io_error) = report.io_error {
            println!("    {}", io_error.red());
        }

        if verbose {
            for failure in &report.failures {
                println!(
                    "    {} {}: {}",
                    "-".dimmed(),
                    failure.position,
                    failure.reason.to_string().dimmed()
                );
            }
        } else if !report.failures.is_empty() {
            println!(
                "    {}",
                format!(
                    "{}개 레코드 거부 (상세: --verbose 또는 --log)",
                    report.failures.len()
                )
                .dimmed()
            );
        }
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &PathBuf, reports: &[FileReport]) -> Result<()> {
    let mut log_file = File::create(log_path)?;

    let total_errors: usize = reports
        .iter()
        .map(|r| r.failed() + usize::from(r.io_error.is_some()))
        .sum();

    writeln!(log_file, "sconvert 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", chrono_now())?;
    writeln!(log_file, "총 에러 수: {}", total_errors)?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for report in reports {
        if report.io_error.is_none() && report.failures.is_empty() {
            continue;
        }

        writeln!(log_file, "\n파일: {:?}", report.path)?;
        if let Some(ref io_error) = report.io_error {
            writeln!(log_file, "에러: {}", io_error)?;
        }
        for failure in &report.failures {
            writeln!(log_file, "{}: {}", failure.position, failure.reason)?;
        }
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn chrono_now() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now();
    let duration = now
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}

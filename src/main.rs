//! shpconvert - SHAPEFILE CRS/ENCODING CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use shpconvert::{
    batch::{mirrored_output_path, prepare_output_dir, run_batch},
    cli::Args,
    config::ConvertConfig,
    pattern::PatternMatcher,
    processor::ConvertContext,
    projection::ProjectionResolver,
    selector::{select_files, SHAPEFILE_EXTENSION},
    stats::{RunReport, Statistics},
    ShpConvertError,
};

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.verbose);

    // 입력 폴더 확인
    validate_input(&args)?;

    // 설정 로드
    let config = load_config(&args)?;

    // 헤더 출력
    print_header(&args, &config);

    // 좌표계 핸들은 파일을 건드리기 전에 모두 만든다
    let resolver = ProjectionResolver::for_run(&args.crs, &config)
        .with_context(|| format!("좌표계 초기화 실패: {}", args.crs))?;

    let matcher = PatternMatcher::new(args.get_substrings(), args.pattern.clone())
        .context("파일 필터 초기화 실패")?;

    // 드라이런 모드
    if args.dry_run {
        let files = select_files(&args.input, SHAPEFILE_EXTENSION, &matcher)
            .context("입력 파일 탐색 실패")?;
        print_dry_run(&files, &args.output);
        return Ok(());
    }

    prepare_output_dir(&args.input, &args.output).context("출력 폴더 초기화 실패")?;

    let files =
        select_files(&args.input, SHAPEFILE_EXTENSION, &matcher).context("입력 파일 탐색 실패")?;

    if files.is_empty() {
        println!("{}", "⚠️ 처리할 Shapefile이 없습니다.".yellow());
        return Ok(());
    }

    println!(
        "  {} 발견된 파일 수: {}",
        "📋".bright_white(),
        files.len().to_string().bright_green()
    );

    run_conversion(&args, &config, &resolver, &files)
}

/// tracing 구독자 초기화 (RUST_LOG 우선)
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// 입력 경로 유효성 검사
fn validate_input(args: &Args) -> Result<()> {
    if !args.input.exists() {
        return Err(ShpConvertError::InputNotFound {
            path: args.input.clone(),
        }
        .into());
    }

    if !args.input.is_dir() {
        return Err(ShpConvertError::NotADirectory {
            path: args.input.clone(),
        }
        .into());
    }

    Ok(())
}

/// 설정 파일 로드 (없으면 기본값)
fn load_config(args: &Args) -> Result<ConvertConfig> {
    match args.config {
        Some(ref path) => ConvertConfig::load(path).context("설정 파일 로드 실패"),
        None => Ok(ConvertConfig::default()),
    }
}

/// 헤더 출력
fn print_header(args: &Args, config: &ConvertConfig) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🚀 SHAPEFILE CRS/ENCODING CONVERTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);
    println!("  {} 출력 폴더: {:?}", "📄".bright_green(), args.output);
    println!("  {} 입력 좌표계: {}", "🗺️".bright_yellow(), args.crs);
    println!("  {} 입력 인코딩: {}", "🔤".bright_yellow(), args.encoding);

    for rule in &config.crs_rules {
        println!(
            "  {} 좌표계 규칙: *{}* → {}",
            "📌".bright_white(),
            rule.pattern,
            rule.crs
        );
    }

    println!("  {} 파일 필터: {}", "🔍".bright_magenta(), args.substrings);

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if let Some(ref path) = args.config {
        println!("  {} 설정 파일: {:?}", "⚙️".bright_yellow(), path);
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
fn print_dry_run(files: &[PathBuf], output_root: &Path) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, path) in files.iter().enumerate() {
        println!(
            "  {}. {:?} → {:?}",
            i + 1,
            path,
            mirrored_output_path(path, output_root)
        );
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 변환 실행
fn run_conversion(
    args: &Args,
    config: &ConvertConfig,
    resolver: &ProjectionResolver,
    files: &[PathBuf],
) -> Result<()> {
    let pb = create_progress_bar(files.len());
    let mut stats = Statistics::new(files.len());
    let ctx = ConvertContext::new(resolver, config, &args.crs, args.encoding);

    println!("\n{}", "⚡ 변환 중...".bright_cyan());

    let result = run_batch(files, &args.output, &ctx, |report| {
        pb.inc(1);
        stats.record(report);

        if args.verbose {
            pb.println(format!(
                "  {} {:?} ({} 피처, {} 파티션)",
                "✓".green(),
                report.input.file_name().unwrap_or_default(),
                report.features,
                report.outputs.len()
            ));
        }
    });

    let reports = match result {
        Ok(reports) => {
            pb.finish_with_message("완료!");
            reports
        }
        Err(e) => {
            pb.abandon_with_message("중단됨");
            println!("\n{} {}", "❌ 변환 실패:".bright_red(), e.to_string().red());
            return Err(e).context("일괄 변환 중단");
        }
    };

    // 리포트 작성
    if let Some(ref report_path) = args.report {
        RunReport {
            input: &args.input,
            output: &args.output,
            crs: &args.crs,
            encoding: args.encoding.to_string(),
            elapsed_secs: stats.elapsed().as_secs_f64(),
            files: &reports,
        }
        .write_to(report_path)
        .context("리포트 저장 실패")?;

        println!("\n{} 리포트 저장: {:?}", "📝".bright_cyan(), report_path);
    }

    // 통계 출력
    stats.print_summary();

    println!("\n{} 저장 완료: {:?}\n", "✅".bright_green(), args.output);

    Ok(())
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_input() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("TL_SCCO_SIG.shp");
        fs::write(&file, b"").unwrap();

        let ok = Args::parse_from(["shpconvert", "-i", temp_dir.path().to_str().unwrap()]);
        let missing = Args::parse_from(["shpconvert", "-i", "/nonexistent/shpconvert"]);
        let not_dir = Args::parse_from(["shpconvert", "-i", file.to_str().unwrap()]);

        assert!(validate_input(&ok).is_ok());
        assert!(validate_input(&missing).is_err());
        assert!(validate_input(&not_dir).is_err());
    }

    #[test]
    fn test_load_config_default() {
        let args = Args::parse_from(["shpconvert"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config, ConvertConfig::default());
    }
}

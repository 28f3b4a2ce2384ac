//! 통계 및 유틸리티 모듈
//!
//! 처리 통계 수집, 실행 리포트 작성, 포맷팅을 담당합니다.

use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::processor::FileReport;

/// 처리 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 파일 수
    pub total_files: usize,
    /// 변환 완료 파일 수
    pub converted_files: usize,
    /// 분할 대상이었던 파일 수
    pub partitioned_files: usize,
    /// 생성된 출력 Shapefile 수
    pub output_files: usize,
    /// 변환한 피처 수
    pub features: usize,
    /// 변환한 정점 수
    pub vertices: usize,
    /// 읽은 총 바이트
    pub total_bytes_read: u64,
    /// 쓴 총 바이트
    pub total_bytes_written: u64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 파일 하나의 변환 결과 반영
    pub fn record(&mut self, report: &FileReport) {
        self.converted_files += 1;
        if report.partitioned {
            self.partitioned_files += 1;
        }
        self.output_files += report.outputs.len();
        self.features += report.features;
        self.vertices += report.vertices;
        self.total_bytes_read += report.bytes_read;
        self.total_bytes_written += report.bytes_written;
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 파일:    {}",
            "📁".bright_cyan(),
            self.total_files
        );
        println!(
            "  {} 변환 완료:    {}",
            "✅".bright_green(),
            self.converted_files.to_string().green()
        );
        println!(
            "  {} 출력 파일:    {} (분할 대상 {})",
            "🧩".bright_magenta(),
            self.output_files,
            self.partitioned_files
        );
        println!(
            "  {} 피처 / 정점:  {} / {}",
            "📐".bright_white(),
            self.features,
            self.vertices
        );
        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.total_bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.total_bytes_written)
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// JSON 실행 리포트
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// 입력 폴더
    pub input: &'a Path,
    /// 출력 폴더
    pub output: &'a Path,
    /// 기본 입력 좌표계
    pub crs: &'a str,
    /// 입력 속성 인코딩
    pub encoding: String,
    /// 처리 시간 (초)
    pub elapsed_secs: f64,
    /// 파일별 결과
    pub files: &'a [FileReport],
}

impl RunReport<'_> {
    /// 리포트를 JSON 파일로 저장
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self).map_err(std::io::Error::from)?;
        Ok(())
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
/// use shpconvert::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(12 * 1024 * 1024), "12.00 MB");
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

//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

use crate::encoding::TextEncoding;

/// 기본 파일 이름 필터 (데이터셋 계열 태그)
pub const DEFAULT_SUBSTRINGS: &str = "TL_SCCO_CTPRVN,TL_SCCO_SIG,TL_SCCO_EMD,TL_SCCO_LI,AL_D002";

/// shpconvert CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "shpconvert",
    author = "YourName <your@email.com>",
    version,
    about = "SHAPEFILE CRS/ENCODING CONVERTER - 폴더 내 Shapefile을 WGS84/UTF-8로 일괄 변환하는 CLI 도구",
    long_about = r#"
SHAPEFILE CRS/ENCODING CONVERTER
================================

입력 폴더의 Shapefile을 재귀 탐색하여
좌표는 WGS84 경위도(EPSG:4326)로, 문자 속성은 UTF-8로 변환합니다.

특징:
  • 파일 이름 규칙별 입력 좌표계 선택 (기본: AL_D002 → EPSG:5186)
  • EUC-KR 속성 자동 정규화 (이미 UTF-8이면 그대로 유지)
  • 대용량 AL_D002 파일은 60만 정점 단위로 분할 (_part1, _part2, ...)
  • 입력 폴더 구조를 반영한 출력 폴더 생성

주의: 출력 폴더는 실행할 때마다 삭제 후 다시 만들어집니다.

예제:
  shpconvert -i ./source -o ./converted
  shpconvert -i ./source -o ./converted --crs EPSG:5186 --encoding utf-8
  shpconvert -i ./source -o ./converted -s "TL_SCCO_SIG,TL_SCCO_EMD" --dry-run
  shpconvert -i ./source -o ./converted --config shpconvert.yaml --report report.json
"#
)]
pub struct Args {
    /// Shapefile들이 있는 입력 폴더 경로
    #[arg(short, long, default_value = "../data/source")]
    pub input: PathBuf,

    /// 변환 결과를 저장할 출력 폴더 경로 (실행 시 초기화됨)
    #[arg(short, long, default_value = "../data/converted")]
    pub output: PathBuf,

    /// 입력 속성 인코딩
    #[arg(short, long, value_enum, default_value_t = TextEncoding::EucKr)]
    pub encoding: TextEncoding,

    /// 기본 입력 좌표계 (EPSG:4326이면 좌표 변환 없음)
    #[arg(short, long, default_value = "EPSG:5179")]
    pub crs: String,

    /// 파일 이름 필터 (쉼표로 구분, 하나라도 포함되면 선택)
    #[arg(short, long, default_value = DEFAULT_SUBSTRINGS)]
    pub substrings: String,

    /// 추가 파일 이름 패턴 필터 (glob 형식, 예: "*_11_*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 좌표계 규칙 및 분할 정책 설정 파일 (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 실행 결과 JSON 리포트 경로
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Args {
    /// 파일 이름 필터를 파싱하여 벡터로 반환
    pub fn get_substrings(&self) -> Vec<String> {
        self.substrings
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

//! 에러 타입 정의 모듈
//!
//! shpconvert에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// shpconvert에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ShpConvertError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 출력 폴더 초기화가 입력 폴더를 지우게 됨
    #[error("출력 폴더가 입력 폴더를 포함합니다 (입력: {input}, 출력: {output})")]
    OutputOverlapsInput { input: PathBuf, output: PathBuf },

    /// 좌표계 테이블에 없는 식별자
    #[error("알 수 없는 좌표계: {name}")]
    UnknownCrs { name: String },

    /// 좌표계 정의 문자열 생성 실패
    #[error("좌표계 정의가 유효하지 않습니다 ({name}): {reason}")]
    InvalidCrs { name: String, reason: String },

    /// 설정 파일 로드 실패
    #[error("설정 파일을 읽을 수 없습니다 ({path}): {reason}")]
    ConfigError { path: PathBuf, reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 폴더 탐색 실패
    #[error("폴더 탐색 실패 ({path}): {reason}")]
    WalkError { path: PathBuf, reason: String },

    /// Shapefile 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpenError { file: PathBuf, reason: String },

    /// 출력 파일 생성 실패
    #[error("출력 파일을 만들 수 없습니다 ({file}): {reason}")]
    FileCreateError { file: PathBuf, reason: String },

    /// Shapefile 읽기/쓰기 실패
    #[error("Shapefile 처리 실패 ({file}): {reason}")]
    ShapefileError { file: PathBuf, reason: String },

    /// 지원하지 않는 도형 타입
    #[error("지원하지 않는 도형 타입입니다 ({file}): {kind}")]
    UnsupportedGeometry { file: PathBuf, kind: String },

    /// 도형 구조 오류
    #[error("잘못된 도형입니다 ({file}): {reason}")]
    InvalidGeometry { file: PathBuf, reason: String },

    /// 좌표 변환 실패
    #[error("좌표 변환 실패 ({file}, 좌표 {x}, {y}): {reason}")]
    ProjectionError {
        file: PathBuf,
        x: f64,
        y: f64,
        reason: String,
    },

    /// 속성 문자열 디코딩 실패
    #[error("속성 인코딩 변환 실패 ({file}, 필드 {field}): {encoding}로 해석할 수 없는 값")]
    EncodingError {
        file: PathBuf,
        field: String,
        encoding: String,
    },

    /// 일반 I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// shpconvert 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ShpConvertError>;

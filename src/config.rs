//! 변환 설정 모듈
//!
//! 파일 이름 규칙별 입력 좌표계, 추가 좌표계 정의, 분할 정책을 YAML 설정으로 읽습니다.
//! 설정 파일이 없으면 기본값(AL_D002 → EPSG:5186, 12 MiB / 600,000 정점)을 사용합니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, ShpConvertError};
use crate::projection::builtin_definition;

/// 분할 대상 데이터셋 기본 표식
pub const DEFAULT_MARKER: &str = "AL_D002";

/// 분할 대상 최소 파일 크기 (이 값을 초과해야 분할)
pub const DEFAULT_SIZE_THRESHOLD_BYTES: u64 = 12 * 1024 * 1024;

/// 분할 단위 정점 수 (이 값을 초과하면 다음 파티션으로 넘어감)
pub const DEFAULT_VERTEX_THRESHOLD: usize = 600_000;

/// 파일 이름 부분 문자열 → 입력 좌표계 규칙
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CrsRule {
    /// 파일 이름에 포함되어야 할 문자열
    pub pattern: String,
    /// 적용할 좌표계 식별자 (예: "EPSG:5186")
    pub crs: String,
}

/// 출력 분할 정책
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PartitionPolicy {
    /// 분할 대상 데이터셋 표식
    pub marker: String,
    /// 분할 대상 최소 파일 크기 (바이트)
    pub size_threshold_bytes: u64,
    /// 파티션당 정점 수 임계값
    pub vertex_threshold: usize,
}

impl Default for PartitionPolicy {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            size_threshold_bytes: DEFAULT_SIZE_THRESHOLD_BYTES,
            vertex_threshold: DEFAULT_VERTEX_THRESHOLD,
        }
    }
}

impl PartitionPolicy {
    /// 파일 이름과 크기로 분할 대상 여부 판단
    ///
    /// # Arguments
    /// * `file_name` - 입력 파일 이름
    /// * `file_size` - 입력 `.shp` 파일 크기 (바이트)
    ///
    /// # Returns
    /// 표식을 포함하고 크기가 임계값을 초과하면 `true`
    pub fn is_eligible(&self, file_name: &str, file_size: u64) -> bool {
        file_name.contains(&self.marker) && file_size > self.size_threshold_bytes
    }
}

/// 변환 설정
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// 파일별 입력 좌표계 규칙 (앞에서부터 첫 번째 일치 규칙 적용)
    pub crs_rules: Vec<CrsRule>,
    /// 내장 테이블에 더하거나 덮어쓸 좌표계 정의
    pub crs_definitions: BTreeMap<String, String>,
    /// 출력 분할 정책
    pub partition: PartitionPolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            crs_rules: vec![CrsRule {
                pattern: DEFAULT_MARKER.to_string(),
                crs: "EPSG:5186".to_string(),
            }],
            crs_definitions: BTreeMap::new(),
            partition: PartitionPolicy::default(),
        }
    }
}

impl ConvertConfig {
    /// YAML 설정 파일 로드
    pub fn load(path: &Path) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()
            .map_err(|e| ShpConvertError::ConfigError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        settings
            .try_deserialize()
            .map_err(|e| ShpConvertError::ConfigError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// 파일 이름에 적용할 입력 좌표계 결정
    ///
    /// # Arguments
    /// * `file_name` - 입력 파일 이름
    /// * `primary` - 규칙에 걸리지 않을 때 쓰는 기본 입력 좌표계
    pub fn crs_for<'a>(&'a self, file_name: &str, primary: &'a str) -> &'a str {
        self.crs_rules
            .iter()
            .find(|rule| file_name.contains(&rule.pattern))
            .map(|rule| rule.crs.as_str())
            .unwrap_or(primary)
    }

    /// 좌표계 식별자에 해당하는 PROJ 정의 문자열 조회
    ///
    /// 설정 파일의 정의가 내장 테이블보다 우선합니다. 식별자는 대소문자를 구분하지 않습니다.
    pub fn definition(&self, name: &str) -> Option<&str> {
        self.crs_definitions
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, definition)| definition.as_str())
            .or_else(|| builtin_definition(name))
    }
}

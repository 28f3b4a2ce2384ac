//! shpconvert - SHAPEFILE CRS/ENCODING CONVERTER
//!
//! 한국 투영 좌표계와 EUC-KR 속성으로 만들어진 Shapefile 폴더를
//! WGS84 경위도 좌표와 UTF-8 속성으로 일괄 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🗺️ **좌표 변환**: PROJ를 이용한 역투영 → WGS84 정투영 (도 단위 출력)
//! - 🔤 **인코딩 정규화**: EUC-KR 문자 속성을 UTF-8로 변환 (이미 UTF-8이면 그대로)
//! - 🧩 **파티션 분할**: 대용량 데이터셋을 정점 수 기준으로 `_partN` 파일로 분할
//! - 📁 **폴더 구조 반영**: 입력 파일의 상위 폴더 이름으로 출력 하위 폴더 생성
//! - 🔍 **파일 필터링**: 부분 문자열 필터와 glob 패턴 필터
//! - ⚙️ **설정 파일**: 파일 이름별 좌표계 규칙, 추가 좌표계 정의, 분할 정책 (YAML)
//! - 🧪 **드라이런 모드**: 실제 변환 없이 처리될 파일과 출력 경로 미리 확인
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법 (EPSG:5179, EUC-KR 입력)
//! shpconvert -i ./source -o ./converted
//!
//! # 이미 UTF-8인 중부원점 데이터
//! shpconvert -i ./source -o ./converted --crs EPSG:5186 --encoding utf-8
//!
//! # 시군구 경계만 미리 보기
//! shpconvert -i ./source -s TL_SCCO_SIG --dry-run
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod encoding;
pub mod error;
pub mod pattern;
pub mod processor;
pub mod projection;
pub mod selector;
pub mod stats;

// Re-exports for convenient access
pub use batch::{mirrored_output_path, prepare_output_dir, run_batch};
pub use cli::Args;
pub use config::{ConvertConfig, CrsRule, PartitionPolicy};
pub use encoding::{normalize, TextEncoding};
pub use error::{Result, ShpConvertError};
pub use pattern::PatternMatcher;
pub use processor::{convert_file, sanitize_file_name, ConvertContext, FileReport, Geometry};
pub use projection::ProjectionResolver;
pub use selector::{select_files, SHAPEFILE_EXTENSION};
pub use stats::{format_bytes, RunReport, Statistics};

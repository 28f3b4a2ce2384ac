//! 입력 파일 선택 모듈
//!
//! 입력 폴더를 재귀 탐색하여 확장자와 파일 이름 조건에 맞는 파일을 수집합니다.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, ShpConvertError};
use crate::pattern::PatternMatcher;

/// 변환 대상 확장자
pub const SHAPEFILE_EXTENSION: &str = "shp";

/// 경로 목록에서 조건에 맞는 파일만 고름 (파일 시스템 접근 없음)
///
/// # Arguments
/// * `paths` - 후보 파일 경로
/// * `extension` - 대상 확장자 (앞의 `.`은 무시, 대소문자 구분)
/// * `matcher` - 파일 이름 매처
pub fn filter_paths<I>(paths: I, extension: &str, matcher: &PatternMatcher) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let extension = extension.trim_start_matches('.');

    paths
        .into_iter()
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(extension))
        .filter(|p| {
            p.file_name()
                .and_then(|s| s.to_str())
                .map(|s| matcher.matches(s))
                .unwrap_or(false)
        })
        .collect()
}

/// 입력 폴더에서 변환할 파일 수집
///
/// 파일 이름 순으로 정렬하며 탐색하므로 결과 순서는 플랫폼과 무관하게 일정합니다.
/// 탐색 중 에러가 하나라도 나면 부분 결과 없이 에러를 반환합니다.
///
/// # Arguments
/// * `root` - 탐색할 입력 폴더
/// * `extension` - 대상 확장자
/// * `matcher` - 파일 이름 매처
pub fn select_files(root: &Path, extension: &str, matcher: &PatternMatcher) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ShpConvertError::WalkError {
            path: e.path().unwrap_or(root).to_path_buf(),
            reason: e.to_string(),
        })?;

        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(filter_paths(files, extension, matcher))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn matcher(values: &[&str]) -> PatternMatcher {
        PatternMatcher::new(values.iter().map(|s| s.to_string()).collect(), None).unwrap()
    }

    #[test]
    fn test_filter_paths_example() {
        let paths = vec![
            PathBuf::from("data/A_TL_SCCO_CTPRVN.shp"),
            PathBuf::from("data/B_other.shp"),
            PathBuf::from("data/C_TL_SCCO_SIG.dbf"),
        ];

        let selected = filter_paths(paths, ".shp", &matcher(&["TL_SCCO_CTPRVN", "TL_SCCO_SIG"]));

        assert_eq!(selected, vec![PathBuf::from("data/A_TL_SCCO_CTPRVN.shp")]);
    }

    #[test]
    fn test_filter_paths_extension_exact() {
        let paths = vec![
            PathBuf::from("TL_SCCO_SIG.SHP"),
            PathBuf::from("TL_SCCO_SIG.shp.xml"),
            PathBuf::from("TL_SCCO_SIG"),
        ];

        assert!(filter_paths(paths, "shp", &matcher(&["TL_SCCO_SIG"])).is_empty());
    }

    #[test]
    fn test_select_files_recursive_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let seoul = temp_dir.path().join("11");
        let busan = temp_dir.path().join("26");
        fs::create_dir_all(&seoul).unwrap();
        fs::create_dir_all(&busan).unwrap();

        fs::write(busan.join("TL_SCCO_SIG.shp"), b"").unwrap();
        fs::write(seoul.join("TL_SCCO_SIG.shp"), b"").unwrap();
        fs::write(seoul.join("TL_SCCO_EMD.shp"), b"").unwrap();
        fs::write(seoul.join("TL_SCCO_EMD.dbf"), b"").unwrap();
        fs::write(temp_dir.path().join("README.shp"), b"").unwrap();

        let files = select_files(
            temp_dir.path(),
            SHAPEFILE_EXTENSION,
            &matcher(&["TL_SCCO_SIG", "TL_SCCO_EMD"]),
        )
        .unwrap();

        assert_eq!(
            files,
            vec![
                seoul.join("TL_SCCO_EMD.shp"),
                seoul.join("TL_SCCO_SIG.shp"),
                busan.join("TL_SCCO_SIG.shp"),
            ]
        );
    }

    #[test]
    fn test_select_files_missing_root() {
        let result = select_files(
            Path::new("/nonexistent/shpconvert/input"),
            SHAPEFILE_EXTENSION,
            &matcher(&["TL"]),
        );
        assert!(matches!(result, Err(ShpConvertError::WalkError { .. })));
    }
}

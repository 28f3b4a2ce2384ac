//! 일괄 변환 모듈
//!
//! 출력 폴더 초기화, 입력 폴더 구조를 반영한 출력 경로 계산, 파일별 변환 호출을 담당합니다.
//! 첫 번째 에러에서 전체 실행을 중단합니다.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, ShpConvertError};
use crate::processor::{convert_file, sanitize_file_name, ConvertContext, FileReport};

/// 출력 폴더 초기화
///
/// 출력 폴더를 통째로 지우고 다시 만듭니다. 출력 폴더가 입력 폴더와 같거나 입력 폴더를
/// 포함하면 입력을 지우게 되므로 에러를 반환합니다.
///
/// # Arguments
/// * `input` - 입력 폴더
/// * `output` - 출력 폴더
pub fn prepare_output_dir(input: &Path, output: &Path) -> Result<()> {
    check_overlap(input, output)?;

    if output.exists() {
        info!(output = %output.display(), "기존 출력 폴더 삭제");
        fs::remove_dir_all(output)?;
    }

    fs::create_dir_all(output).map_err(|e| ShpConvertError::FileCreateError {
        file: output.to_path_buf(),
        reason: e.to_string(),
    })
}

fn check_overlap(input: &Path, output: &Path) -> Result<()> {
    if !output.exists() {
        return Ok(());
    }

    let input_abs = input.canonicalize()?;
    let output_abs = output.canonicalize()?;

    if input_abs.starts_with(&output_abs) {
        return Err(ShpConvertError::OutputOverlapsInput {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
    }

    Ok(())
}

/// 입력 파일의 출력 경로 계산
///
/// 입력 파일의 바로 위 폴더 이름을 출력 루트 아래 하위 폴더로 사용합니다.
/// 폴더 이름과 파일 이름의 괄호는 정리됩니다.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use shpconvert::batch::mirrored_output_path;
///
/// let path = mirrored_output_path(Path::new("source/11/TL_SCCO_SIG.shp"), Path::new("converted"));
/// assert_eq!(path, PathBuf::from("converted/11/TL_SCCO_SIG.shp"));
/// ```
pub fn mirrored_output_path(input: &Path, output_root: &Path) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|s| sanitize_file_name(&s.to_string_lossy()))
        .unwrap_or_default();

    let parent_name = input
        .parent()
        .and_then(|p| p.file_name())
        .map(|s| sanitize_file_name(&s.to_string_lossy()));

    match parent_name {
        Some(dir) => output_root.join(dir).join(file_name),
        None => output_root.join(file_name),
    }
}

/// 선택된 파일을 순서대로 변환
///
/// # Arguments
/// * `files` - 변환할 `.shp` 목록
/// * `output_root` - 출력 폴더 (이미 초기화되어 있어야 함)
/// * `ctx` - 실행 문맥
/// * `on_file` - 파일 하나를 마칠 때마다 호출되는 콜백
///
/// # Returns
/// 파일별 결과, 또는 첫 번째 에러 (이후 파일은 처리하지 않음)
pub fn run_batch<F>(
    files: &[PathBuf],
    output_root: &Path,
    ctx: &ConvertContext<'_>,
    mut on_file: F,
) -> Result<Vec<FileReport>>
where
    F: FnMut(&FileReport),
{
    let mut reports = Vec::with_capacity(files.len());

    for input in files {
        let output = mirrored_output_path(input, output_root);
        let report = convert_file(input, &output, ctx)?;
        on_file(&report);
        reports.push(report);
    }

    Ok(reports)
}

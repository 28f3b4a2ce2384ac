//! 문자 인코딩 정규화 모듈
//!
//! dBASE 문자 필드의 원본 바이트를 UTF-8 문자열로 정규화합니다.

use clap::ValueEnum;
use encoding_rs::EUC_KR;
use std::borrow::Cow;

/// 입력 속성 인코딩
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// 레거시 한글 인코딩 (EUC-KR / CP949)
    #[default]
    #[value(name = "euc-kr", alias = "cp949")]
    EucKr,
    /// 이미 UTF-8로 저장된 입력
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
}

impl TextEncoding {
    /// 정규화(EUC-KR 디코딩)가 필요한 레거시 인코딩인지 확인
    pub fn is_legacy(self) -> bool {
        matches!(self, TextEncoding::EucKr)
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextEncoding::EucKr => write!(f, "EUC-KR"),
            TextEncoding::Utf8 => write!(f, "UTF-8"),
        }
    }
}

/// 바이트열을 UTF-8 문자열로 정규화
///
/// 이미 올바른 UTF-8이면 그대로 빌려 반환하고, 아니면 EUC-KR로 디코딩합니다.
/// 같은 입력을 두 번 정규화해도 결과는 같습니다.
///
/// # Arguments
/// * `bytes` - 원본 필드 바이트
///
/// # Returns
/// 정규화된 문자열, EUC-KR로도 해석할 수 없으면 `None`
///
/// # Examples
/// ```
/// use shpconvert::encoding::normalize;
///
/// assert_eq!(normalize("서울".as_bytes()).unwrap(), "서울");
/// let (legacy, _, _) = encoding_rs::EUC_KR.encode("서울");
/// assert_eq!(normalize(&legacy).unwrap(), "서울");
/// assert!(normalize(&[0xff]).is_none());
/// ```
pub fn normalize(bytes: &[u8]) -> Option<Cow<'_, str>> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(Cow::Borrowed(text));
    }

    EUC_KR.decode_without_bom_handling_and_without_replacement(bytes)
}

/// 문자열을 UTF-8 바이트 기준 `width` 이내로 자름 (문자 경계 유지)
///
/// dBASE 문자 필드는 바이트 길이가 고정이므로, EUC-KR에서 UTF-8로 바뀌며 늘어난 값은
/// 마지막 완전한 문자까지만 남깁니다.
pub fn fit_to_width(text: &str, width: usize) -> &str {
    if text.len() <= width {
        return text;
    }

    let mut end = width;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

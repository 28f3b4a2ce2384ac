//! 패턴 매칭 모듈
//!
//! 파일 이름 부분 문자열 필터와 선택적 glob 패턴 필터를 담당합니다.

use glob::Pattern;

use crate::error::{Result, ShpConvertError};

/// 파일 이름 매처
///
/// 부분 문자열 중 하나 이상을 포함하고(OR), glob 패턴이 있으면 그것과도 일치해야 합니다.
#[derive(Debug, Default)]
pub struct PatternMatcher {
    substrings: Vec<String>,
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `substrings` - 파일 이름에 포함되어야 할 문자열 목록 (대소문자 구분)
    /// * `pattern` - 글로브 패턴 문자열 (None이면 glob 조건 없음)
    ///
    /// # Returns
    /// 컴파일된 `PatternMatcher` 또는 에러
    ///
    /// # Examples
    /// ```
    /// use shpconvert::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(vec!["TL_SCCO_SIG".to_string()], None).unwrap();
    /// assert!(matcher.matches("TL_SCCO_SIG.shp"));
    /// assert!(!matcher.matches("TL_SCCO_EMD.shp"));
    /// ```
    pub fn new(substrings: Vec<String>, pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| ShpConvertError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self {
            substrings,
            pattern: compiled,
        })
    }

    /// 파일 이름에 포함된 부분 문자열 개수
    pub fn substring_hits(&self, file_name: &str) -> usize {
        self.substrings
            .iter()
            .filter(|s| file_name.contains(s.as_str()))
            .count()
    }

    /// 파일 이름이 조건과 일치하는지 확인
    ///
    /// # Arguments
    /// * `file_name` - 검사할 파일 이름
    ///
    /// # Returns
    /// 부분 문자열이 하나 이상 포함되고 glob 패턴(있다면)과 일치하면 true
    pub fn matches(&self, file_name: &str) -> bool {
        if self.substring_hits(file_name) == 0 {
            return false;
        }

        match &self.pattern {
            Some(p) => p.matches(file_name),
            None => true,
        }
    }
}

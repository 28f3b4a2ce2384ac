//! 좌표계 변환 모듈
//!
//! 입력 좌표계별 PROJ 핸들과 WGS84 출력 핸들을 실행 시작 시 한 번 만들어 두고,
//! 모든 파일 변환에서 읽기 전용으로 공유합니다.

use proj::{Proj, ProjError};
use std::collections::HashMap;

use crate::config::ConvertConfig;
use crate::error::{Result, ShpConvertError};

/// 출력 좌표계 (WGS84 경위도)
pub const TARGET_CRS: &str = "EPSG:4326";

/// 내장 좌표계 정의 테이블
pub const BUILTIN_CRS: [(&str, &str); 7] = [
    (
        "EPSG:5179",
        "+proj=tmerc +lat_0=38 +lon_0=127.5 +k=0.9996 +x_0=1000000 +y_0=2000000 +ellps=GRS80 +units=m +no_defs",
    ),
    (
        "EPSG:4326",
        "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs",
    ),
    (
        "EPSG:5181",
        "+proj=tmerc +lat_0=38 +lon_0=127 +k=1 +x_0=200000 +y_0=500000 +ellps=GRS80 +units=m +no_defs",
    ),
    (
        "EPSG:3857",
        "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 +lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +no_defs",
    ),
    (
        "EPSG:5186",
        "+proj=tmerc +lat_0=38 +lon_0=127 +k=1 +x_0=200000 +y_0=600000 +ellps=GRS80 +units=m +no_defs",
    ),
    (
        "EPSG:5178",
        "+proj=tmerc +lat_0=38 +lon_0=127.5 +k=0.9996 +x_0=1000000 +y_0=2000000 +ellps=bessel +units=m +no_defs +towgs84=-115.80,474.99,674.11,1.16,-2.31,-1.63,6.43",
    ),
    (
        "EPSG:5174",
        "+proj=tmerc +lat_0=38 +lon_0=127.0028902777778 +k=1 +x_0=200000 +y_0=500000 +ellps=bessel +units=m +no_defs +towgs84=-115.80,474.99,674.11,1.16,-2.31,-1.63,6.43",
    ),
];

/// 내장 테이블에서 좌표계 정의 조회 (대소문자 무시)
pub fn builtin_definition(name: &str) -> Option<&'static str> {
    BUILTIN_CRS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, definition)| *definition)
}

/// 출력 좌표계와 같은 식별자인지 확인
pub fn is_target_crs(name: &str) -> bool {
    name.eq_ignore_ascii_case(TARGET_CRS)
}

/// 좌표계 핸들 보관소
///
/// `target`이 없으면 패스스루 모드로, 모든 좌표를 그대로 돌려줍니다.
pub struct ProjectionResolver {
    sources: HashMap<String, Proj>,
    target: Option<Proj>,
}

impl std::fmt::Debug for ProjectionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.sources.keys().collect();
        names.sort();
        f.debug_struct("ProjectionResolver")
            .field("sources", &names)
            .field("passthrough", &self.is_passthrough())
            .finish()
    }
}

impl ProjectionResolver {
    /// 좌표 변환을 하지 않는 리졸버 생성
    pub fn passthrough() -> Self {
        Self {
            sources: HashMap::new(),
            target: None,
        }
    }

    /// 실행에 필요한 모든 핸들 생성
    ///
    /// 기본 입력 좌표계와 설정 규칙이 가리키는 좌표계마다 핸들을 하나씩 만들고,
    /// WGS84 출력 핸들을 추가합니다. 기본 입력 좌표계가 이미 EPSG:4326이면
    /// 핸들을 만들지 않습니다.
    ///
    /// # Arguments
    /// * `primary` - 기본 입력 좌표계 식별자
    /// * `config` - 규칙과 추가 정의를 담은 설정
    ///
    /// # Returns
    /// 생성된 리졸버, 정의가 없거나 잘못된 좌표계가 있으면 에러
    pub fn for_run(primary: &str, config: &ConvertConfig) -> Result<Self> {
        if is_target_crs(primary) {
            return Ok(Self::passthrough());
        }

        let target = create_handle(TARGET_CRS, config)?;

        let mut sources = HashMap::new();
        let candidates =
            std::iter::once(primary).chain(config.crs_rules.iter().map(|rule| rule.crs.as_str()));
        for name in candidates {
            if is_target_crs(name) || sources.contains_key(name) {
                continue;
            }
            let handle = create_handle(name, config)?;
            sources.insert(name.to_string(), handle);
        }

        Ok(Self {
            sources,
            target: Some(target),
        })
    }

    /// 패스스루 모드 여부
    pub fn is_passthrough(&self) -> bool {
        self.target.is_none()
    }

    /// 좌표계 식별자에 해당하는 입력 핸들 조회
    ///
    /// 패스스루 모드이거나 식별자가 출력 좌표계 자체이면 `None`을 돌려줍니다.
    pub fn resolve(&self, name: &str) -> Result<Option<&Proj>> {
        if self.is_passthrough() || is_target_crs(name) {
            return Ok(None);
        }

        self.sources
            .get(name)
            .map(Some)
            .ok_or_else(|| ShpConvertError::UnknownCrs {
                name: name.to_string(),
            })
    }

    /// 투영 좌표를 WGS84 경위도(도 단위)로 변환
    ///
    /// 입력 핸들의 역변환으로 라디안 경위도를 얻고, 출력 핸들의 정변환을 거친 뒤
    /// 도 단위로 바꿉니다. 두 핸들 중 하나라도 없으면 입력을 그대로 돌려줍니다.
    ///
    /// # Arguments
    /// * `x`, `y` - 입력 좌표
    /// * `source` - [`resolve`](Self::resolve)로 얻은 입력 핸들
    ///
    /// # Returns
    /// `(경도, 위도)` 또는 PROJ 에러 (파일 정보는 호출하는 쪽에서 붙임)
    pub fn to_geographic(
        &self,
        x: f64,
        y: f64,
        source: Option<&Proj>,
    ) -> std::result::Result<(f64, f64), ProjError> {
        let (source, target) = match (source, &self.target) {
            (Some(source), Some(target)) => (source, target),
            _ => return Ok((x, y)),
        };

        let radians = source.project((x, y), true)?;
        let (lon, lat) = target.project(radians, false)?;

        Ok((lon.to_degrees(), lat.to_degrees()))
    }
}

/// 좌표계 식별자로 PROJ 핸들 생성
fn create_handle(name: &str, config: &ConvertConfig) -> Result<Proj> {
    let definition = config
        .definition(name)
        .ok_or_else(|| ShpConvertError::UnknownCrs {
            name: name.to_string(),
        })?;

    Proj::new(definition).map_err(|e| ShpConvertError::InvalidCrs {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrsRule;

    const TOLERANCE: f64 = 1e-6;

    #[test]
    fn test_builtin_table() {
        assert_eq!(BUILTIN_CRS.len(), 7);
        assert!(builtin_definition("EPSG:5179").is_some());
        assert!(builtin_definition("epsg:5186").is_some());
        assert!(builtin_definition("EPSG:2097").is_none());
    }

    #[test]
    fn test_unified_cs_origin() {
        let resolver = ProjectionResolver::for_run("EPSG:5179", &ConvertConfig::default()).unwrap();
        let source = resolver.resolve("EPSG:5179").unwrap();
        assert!(source.is_some());

        let (lon, lat) = resolver
            .to_geographic(1_000_000.0, 2_000_000.0, source)
            .unwrap();
        assert!((lon - 127.5).abs() < TOLERANCE, "lon = {}", lon);
        assert!((lat - 38.0).abs() < TOLERANCE, "lat = {}", lat);
    }

    #[test]
    fn test_central_belt_origin() {
        let resolver = ProjectionResolver::for_run("EPSG:5179", &ConvertConfig::default()).unwrap();
        let source = resolver.resolve("EPSG:5186").unwrap();

        let (lon, lat) = resolver.to_geographic(200_000.0, 600_000.0, source).unwrap();
        assert!((lon - 127.0).abs() < TOLERANCE, "lon = {}", lon);
        assert!((lat - 38.0).abs() < TOLERANCE, "lat = {}", lat);
    }

    #[test]
    fn test_seoul_city_hall() {
        // 서울시청 부근 (EPSG:5179)
        let resolver = ProjectionResolver::for_run("EPSG:5179", &ConvertConfig::default()).unwrap();
        let source = resolver.resolve("EPSG:5179").unwrap();

        let (lon, lat) = resolver.to_geographic(953_900.0, 1_952_000.0, source).unwrap();
        assert!(lon > 126.9 && lon < 127.05, "lon = {}", lon);
        assert!(lat > 37.5 && lat < 37.6, "lat = {}", lat);
    }

    #[test]
    fn test_passthrough_mode() {
        let resolver = ProjectionResolver::for_run("EPSG:4326", &ConvertConfig::default()).unwrap();
        assert!(resolver.is_passthrough());
        assert!(resolver.resolve("EPSG:5186").unwrap().is_none());

        let (x, y) = resolver.to_geographic(127.123, 37.456, None).unwrap();
        assert_eq!((x, y), (127.123, 37.456));
    }

    #[test]
    fn test_target_crs_rule_resolves_to_none() {
        let resolver = ProjectionResolver::for_run("EPSG:5179", &ConvertConfig::default()).unwrap();
        assert!(resolver.resolve("EPSG:4326").unwrap().is_none());
    }

    #[test]
    fn test_unknown_crs() {
        let mut config = ConvertConfig::default();
        config.crs_rules.push(CrsRule {
            pattern: "AL_D010".to_string(),
            crs: "EPSG:9999".to_string(),
        });

        let result = ProjectionResolver::for_run("EPSG:5179", &config);
        assert!(matches!(result, Err(ShpConvertError::UnknownCrs { .. })));

        let resolver = ProjectionResolver::for_run("EPSG:5179", &ConvertConfig::default()).unwrap();
        assert!(matches!(
            resolver.resolve("EPSG:5181"),
            Err(ShpConvertError::UnknownCrs { .. })
        ));
    }

    #[test]
    fn test_invalid_definition() {
        let mut config = ConvertConfig::default();
        config
            .crs_definitions
            .insert("EPSG:5179".to_string(), "+proj=doesnotexist".to_string());

        let result = ProjectionResolver::for_run("EPSG:5179", &config);
        assert!(matches!(result, Err(ShpConvertError::InvalidCrs { .. })));
    }
}
